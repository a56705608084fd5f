use crate::{FontError, buffer::FontReader};

use super::{MapGroup, ensure_fits};

const IS32_SIZE: usize = 8192;

/// Mixed 16-bit and 32-bit coverage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format8 {
    pub language: u32,
    /// One bit per 16-bit value, set when that value starts a 32-bit code
    pub is32: Vec<u8>,
    pub groups: Vec<MapGroup>,
}

impl Format8 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 8)?;
        let language = reader.read_u32()?;
        ensure_fits(&reader, IS32_SIZE, 1, "is32 bytes")?;
        let is32 = reader.read_bytes(IS32_SIZE)?.to_vec();
        let num_groups = reader.read_u32()? as usize;
        let groups = MapGroup::read_groups(&mut reader, num_groups)?;

        Ok(Self {
            language,
            is32,
            groups,
        })
    }

    /// Whether the 16-bit value is the high half of a 32-bit code
    pub fn is_32bit_lead(&self, value: u16) -> bool {
        self.is32
            .get(usize::from(value / 8))
            .is_some_and(|&byte| byte & (0x80u8 >> (value % 8)) != 0)
    }

    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        MapGroup::find(&self.groups, code)?.sequential_glyph(code)
    }
}
