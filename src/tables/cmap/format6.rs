use crate::{FontError, buffer::FontReader};

use super::ensure_fits;

/// Trimmed table mapping, a dense run of 16-bit codes starting at `first_code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format6 {
    pub language: u16,
    pub first_code: u16,
    pub glyph_ids: Vec<u16>,
}

impl Format6 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 4)?;
        let language = reader.read_u16()?;
        let first_code = reader.read_u16()?;
        let entry_count = usize::from(reader.read_u16()?);
        ensure_fits(&reader, entry_count, 2, "glyph ids")?;
        let glyph_ids = reader.read_u16_array(entry_count)?;

        Ok(Self {
            language,
            first_code,
            glyph_ids,
        })
    }

    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        let index = code.checked_sub(u32::from(self.first_code))?;
        self.glyph_ids
            .get(usize::try_from(index).ok()?)
            .copied()
            .filter(|&glyph| glyph != 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use byteorder::{BigEndian, WriteBytesExt};

    fn format6_bytes(first_code: u16, glyph_ids: &[u16]) -> Vec<u8> {
        let mut data = Vec::new();
        data.write_u16::<BigEndian>(6).unwrap();
        data.write_u16::<BigEndian>(10 + 2 * glyph_ids.len() as u16).unwrap();
        data.write_u16::<BigEndian>(0).unwrap();
        data.write_u16::<BigEndian>(first_code).unwrap();
        data.write_u16::<BigEndian>(glyph_ids.len() as u16).unwrap();
        for glyph in glyph_ids {
            data.write_u16::<BigEndian>(*glyph).unwrap();
        }
        data
    }

    #[test]
    fn lookup_inside_range_only() {
        let subtable = Format6::decode(&format6_bytes(0x20, &[3, 0, 5])).unwrap();

        assert_eq!(subtable.glyph_index(0x1F), None);
        assert_eq!(subtable.glyph_index(0x20), Some(3));
        assert_eq!(subtable.glyph_index(0x21), None);
        assert_eq!(subtable.glyph_index(0x22), Some(5));
        assert_eq!(subtable.glyph_index(0x23), None);
    }

    #[test]
    fn entry_count_beyond_length_is_malformed() {
        let mut data = format6_bytes(0x20, &[3, 4]);
        data[9] = 3;

        assert!(matches!(
            Format6::decode(&data),
            Err(FontError::MalformedSubtable(_))
        ));
    }
}
