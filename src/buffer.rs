use byteorder::{BigEndian, ByteOrder};

use crate::{
    FontError,
    types::{Fixed, LongDateTime, Tag},
};

macro_rules! impl_read {
    ($fn_name:ident, $typ:ty, $decode:path) => {
        pub fn $fn_name(&mut self) -> Result<$typ, FontError> {
            let bytes = self.read_bytes(size_of::<$typ>())?;

            Ok($decode(bytes))
        }
    };
}

/// A bounds checked, big-endian cursor over an immutable byte slice.
///
/// Every read checks the remaining length before consuming anything, so
/// the first short read fails with [`FontError::TruncatedInput`] and leaves
/// the cursor where it was.
#[derive(Debug, Clone)]
pub struct FontReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FontReader<'a> {
    /// Returns a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns a reader over `data` positioned at `offset`
    ///
    /// # Examples
    ///
    /// ```
    /// use sfnt_meta::buffer::FontReader;
    ///
    /// let data = [0, 0, 0, 10, 0, 0, 0, 20]; // two u32 values: 10 and 20 in big-endian
    /// let mut reader = FontReader::at(&data, 4).unwrap();
    /// assert_eq!(reader.read_u32().unwrap(), 20);
    /// assert!(reader.read_u8().is_err());
    /// ```
    pub fn at(data: &'a [u8], offset: usize) -> Result<Self, FontError> {
        let mut reader = Self::new(data);
        reader.seek_to(offset)?;
        Ok(reader)
    }

    /// The current position, counted from the start of the underlying slice
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left between the cursor and the end of the slice
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Moves the cursor to an absolute position inside the slice.
    /// Seeking exactly to the end is allowed, seeking past it is not.
    pub fn seek_to(&mut self, pos: usize) -> Result<(), FontError> {
        if pos > self.data.len() {
            return Err(FontError::TruncatedInput {
                offset: pos,
                needed: 0,
                available: 0,
            });
        }

        self.pos = pos;
        Ok(())
    }

    /// Skips n bytes from the CURRENT cursor position
    pub fn skip(&mut self, n: usize) -> Result<(), FontError> {
        self.read_bytes(n).map(|_| ())
    }

    /// Consumes exactly `n` bytes and returns them as a borrowed slice
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FontError> {
        if n > self.remaining() {
            return Err(FontError::TruncatedInput {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }

        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, FontError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, FontError> {
        Ok(self.read_u8()? as i8)
    }

    impl_read!(read_u16, u16, BigEndian::read_u16);
    impl_read!(read_i16, i16, BigEndian::read_i16);
    impl_read!(read_u32, u32, BigEndian::read_u32);
    impl_read!(read_i32, i32, BigEndian::read_i32);
    impl_read!(read_u64, u64, BigEndian::read_u64);
    impl_read!(read_i64, i64, BigEndian::read_i64);

    /// Reads a 24-bit unsigned integer, used for code points in cmap format 14
    pub fn read_u24(&mut self) -> Result<u32, FontError> {
        let bytes = self.read_bytes(3)?;
        Ok(BigEndian::read_u24(bytes))
    }

    /// Reads `count` consecutive u16 values
    pub fn read_u16_array(&mut self, count: usize) -> Result<Vec<u16>, FontError> {
        let bytes = self.read_bytes(self.array_len(count, 2)?)?;
        let mut values = vec![0; count];
        BigEndian::read_u16_into(bytes, &mut values);
        Ok(values)
    }

    /// Reads `count` consecutive i16 values
    pub fn read_i16_array(&mut self, count: usize) -> Result<Vec<i16>, FontError> {
        let bytes = self.read_bytes(self.array_len(count, 2)?)?;
        let mut values = vec![0; count];
        BigEndian::read_i16_into(bytes, &mut values);
        Ok(values)
    }

    /// Reads a 16.16 fixed point number
    pub fn read_fixed(&mut self) -> Result<Fixed, FontError> {
        Ok(Fixed(self.read_u32()?))
    }

    /// Reads a signed distance in font design units
    pub fn read_fword(&mut self) -> Result<i16, FontError> {
        self.read_i16()
    }

    /// Reads an unsigned distance in font design units
    pub fn read_ufword(&mut self) -> Result<u16, FontError> {
        self.read_u16()
    }

    /// Reads a date as seconds since 1904-01-01T00:00:00 UTC
    pub fn read_long_date_time(&mut self) -> Result<LongDateTime, FontError> {
        Ok(LongDateTime(self.read_i64()?))
    }

    pub fn read_tag(&mut self) -> Result<Tag, FontError> {
        let bytes = self.read_bytes(4)?;
        Ok(Tag([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    // a count that overflows usize can never fit in the slice anyway
    fn array_len(&self, count: usize, item_size: usize) -> Result<usize, FontError> {
        count
            .checked_mul(item_size)
            .ok_or(FontError::TruncatedInput {
                offset: self.pos,
                needed: usize::MAX,
                available: self.remaining(),
            })
    }
}
