use crate::{FontError, buffer::FontReader};

use super::ensure_fits;

/// Byte encoding table, one glyph index per code 0-255
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format0 {
    pub language: u16,
    pub glyph_ids: Vec<u8>,
}

impl Format0 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 4)?;
        let language = reader.read_u16()?;
        ensure_fits(&reader, 256, 1, "glyph ids")?;
        let glyph_ids = reader.read_bytes(256)?.to_vec();

        Ok(Self {
            language,
            glyph_ids,
        })
    }

    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        let index = usize::try_from(code).ok()?;
        self.glyph_ids
            .get(index)
            .map(|&glyph| u16::from(glyph))
            .filter(|&glyph| glyph != 0)
    }
}
