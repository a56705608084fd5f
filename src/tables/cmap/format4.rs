use crate::{FontError, buffer::FontReader};

use super::{apply_delta, ensure_fits};

/// Segment mapping to delta values, the usual subtable for the Unicode BMP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format4 {
    pub language: u16,
    /// End character code for each segment, sorted ascending, last = 0xFFFF
    pub end_codes: Vec<u16>,
    /// Start character code for each segment
    pub start_codes: Vec<u16>,
    /// Delta for all character codes in segment
    pub id_deltas: Vec<i16>,
    /// Offsets in bytes into `glyph_id_array`, or 0
    pub id_range_offsets: Vec<u16>,
    pub glyph_id_array: Vec<u16>,
}

impl Format4 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 4)?;
        let language = reader.read_u16()?;
        let seg_count_x2 = usize::from(reader.read_u16()?);
        if seg_count_x2 % 2 != 0 {
            return Err(FontError::MalformedSubtable(format!(
                "odd segCountX2 {seg_count_x2}"
            )));
        }
        let seg_count = seg_count_x2 / 2;

        // searchRange, entrySelector, rangeShift
        reader.skip(6)?;

        // four parallel arrays plus the reserved pad
        ensure_fits(&reader, seg_count * 4 + 1, 2, "segment array entries")?;
        let end_codes = reader.read_u16_array(seg_count)?;
        let _reserved_pad = reader.read_u16()?;
        let start_codes = reader.read_u16_array(seg_count)?;
        let id_deltas = reader.read_i16_array(seg_count)?;
        let id_range_offsets = reader.read_u16_array(seg_count)?;
        let glyph_id_array = reader.read_u16_array(reader.remaining() / 2)?;

        if !end_codes.is_sorted() {
            return Err(FontError::MalformedSubtable(
                "segment end codes are not sorted".to_string(),
            ));
        }

        Ok(Self {
            language,
            end_codes,
            start_codes,
            id_deltas,
            id_range_offsets,
            glyph_id_array,
        })
    }

    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        let code = u16::try_from(code).ok()?;

        // first segment whose end code is >= code
        let segment = self.end_codes.partition_point(|&end| end < code);
        let start = *self.start_codes.get(segment)?;
        if code < start {
            return None;
        }

        let id_delta = *self.id_deltas.get(segment)?;
        let id_range_offset = *self.id_range_offsets.get(segment)?;

        let glyph = if id_range_offset == 0 {
            apply_delta(code, id_delta)
        } else {
            // idRangeOffset counts bytes from its own slot in the id_range_offsets array
            let index = usize::from(id_range_offset / 2) + usize::from(code - start) + segment;
            let index = index.checked_sub(self.id_range_offsets.len())?;
            let glyph = *self.glyph_id_array.get(index)?;
            if glyph == 0 {
                return None;
            }
            apply_delta(glyph, id_delta)
        };

        Some(glyph).filter(|&glyph| glyph != 0)
    }
}
