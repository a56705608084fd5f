use crate::{FontError, buffer::FontReader};

use super::ensure_fits;

/// Trimmed array, a dense run of 32-bit codes starting at `start_char_code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format10 {
    pub language: u32,
    pub start_char_code: u32,
    pub glyph_ids: Vec<u16>,
}

impl Format10 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 8)?;
        let language = reader.read_u32()?;
        let start_char_code = reader.read_u32()?;
        let num_chars = reader.read_u32()? as usize;
        ensure_fits(&reader, num_chars, 2, "glyph ids")?;
        let glyph_ids = reader.read_u16_array(num_chars)?;

        Ok(Self {
            language,
            start_char_code,
            glyph_ids,
        })
    }

    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        let index = code.checked_sub(self.start_char_code)?;
        self.glyph_ids
            .get(usize::try_from(index).ok()?)
            .copied()
            .filter(|&glyph| glyph != 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tables::cmap::CmapSubtable;
    use byteorder::{BigEndian, WriteBytesExt};

    fn format10_bytes(start_char_code: u32, num_chars: u32, glyph_ids: &[u16]) -> Vec<u8> {
        let mut data = Vec::new();
        data.write_u16::<BigEndian>(10).unwrap();
        data.write_u16::<BigEndian>(0).unwrap();
        data.write_u32::<BigEndian>(20 + 2 * glyph_ids.len() as u32).unwrap();
        data.write_u32::<BigEndian>(0).unwrap();
        data.write_u32::<BigEndian>(start_char_code).unwrap();
        data.write_u32::<BigEndian>(num_chars).unwrap();
        for glyph in glyph_ids {
            data.write_u16::<BigEndian>(*glyph).unwrap();
        }
        data
    }

    #[test]
    fn lookup_supplementary_plane() {
        let data = format10_bytes(0x1_0000, 3, &[11, 12, 13]);
        let subtable = CmapSubtable::decode(&data).unwrap();

        assert_eq!(subtable.format(), 10);
        assert_eq!(subtable.glyph_index(0xFFFF), None);
        assert_eq!(subtable.glyph_index(0x1_0000), Some(11));
        assert_eq!(subtable.glyph_index(0x1_0002), Some(13));
        assert_eq!(subtable.glyph_index(0x1_0003), None);
    }

    #[test]
    fn huge_char_count_is_malformed() {
        let data = format10_bytes(0, u32::MAX, &[1]);

        assert!(matches!(
            CmapSubtable::decode(&data),
            Err(FontError::MalformedSubtable(_))
        ));
    }
}
