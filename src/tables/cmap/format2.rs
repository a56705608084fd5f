use crate::{FontError, buffer::FontReader};

use super::{apply_delta, ensure_fits};

const SUB_HEADER_SIZE: usize = 8;

/// One contiguous run of low bytes sharing a delta, selected by a high byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubHeader {
    pub first_code: u16,
    pub entry_count: u16,
    pub id_delta: i16,
    pub id_range_offset: u16,
}

/// High-byte mapping through table, for mixed 8/16-bit encodings such as
/// Shift-JIS or Big5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format2 {
    pub language: u16,
    /// Sub-header index x 8, one per high byte
    pub sub_header_keys: Vec<u16>,
    pub sub_headers: Vec<SubHeader>,
    pub glyph_index_array: Vec<u16>,
}

impl Format2 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 4)?;
        let language = reader.read_u16()?;
        ensure_fits(&reader, 256, 2, "sub-header keys")?;
        let sub_header_keys = reader.read_u16_array(256)?;

        let num_sub_headers = sub_header_keys
            .iter()
            .map(|key| usize::from(key / 8))
            .max()
            .unwrap_or(0)
            + 1;
        ensure_fits(&reader, num_sub_headers, SUB_HEADER_SIZE, "sub-headers")?;

        let mut sub_headers = Vec::with_capacity(num_sub_headers);
        for _ in 0..num_sub_headers {
            sub_headers.push(SubHeader {
                first_code: reader.read_u16()?,
                entry_count: reader.read_u16()?,
                id_delta: reader.read_i16()?,
                id_range_offset: reader.read_u16()?,
            });
        }
        let glyph_index_array = reader.read_u16_array(reader.remaining() / 2)?;

        Ok(Self {
            language,
            sub_header_keys,
            sub_headers,
            glyph_index_array,
        })
    }

    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        let code = u16::try_from(code).ok()?;
        let high_byte = usize::from(code >> 8);
        let low_byte = code & 0xFF;

        let sub_header_index = if high_byte == 0 {
            // a single byte code is only valid if it is not a lead byte
            if *self.sub_header_keys.get(usize::from(low_byte))? != 0 {
                return None;
            }
            0
        } else {
            match usize::from(*self.sub_header_keys.get(high_byte)? / 8) {
                0 => return None,
                index => index,
            }
        };
        let sub_header = self.sub_headers.get(sub_header_index)?;

        let entry = low_byte.checked_sub(sub_header.first_code)?;
        if entry >= sub_header.entry_count {
            return None;
        }

        // idRangeOffset counts bytes from its own field, which sits in the
        // last two bytes of the sub-header
        let target = sub_header_index * SUB_HEADER_SIZE
            + (SUB_HEADER_SIZE - 2)
            + usize::from(sub_header.id_range_offset)
            + usize::from(entry) * 2;
        let index = target.checked_sub(self.sub_headers.len() * SUB_HEADER_SIZE)? / 2;

        let glyph = *self.glyph_index_array.get(index)?;
        if glyph == 0 {
            return None;
        }
        Some(apply_delta(glyph, sub_header.id_delta)).filter(|&glyph| glyph != 0)
    }
}
