use std::cmp::Ordering;

use crate::{FontError, buffer::FontReader};

use super::ensure_fits;

const MAP_GROUP_SIZE: usize = 12;

/// A run of character codes, shared by formats 8, 12 and 13
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapGroup {
    pub start_char_code: u32,
    pub end_char_code: u32,
    /// First glyph of the run for formats 8 and 12, the glyph of the whole run for 13
    pub glyph_id: u32,
}

impl MapGroup {
    /// Reads `count` groups and checks that they are well formed and sorted
    pub(super) fn read_groups(
        reader: &mut FontReader<'_>,
        count: usize,
    ) -> Result<Vec<Self>, FontError> {
        ensure_fits(reader, count, MAP_GROUP_SIZE, "map groups")?;

        let mut groups: Vec<MapGroup> = Vec::with_capacity(count);
        for _ in 0..count {
            let group = MapGroup {
                start_char_code: reader.read_u32()?,
                end_char_code: reader.read_u32()?,
                glyph_id: reader.read_u32()?,
            };
            if group.start_char_code > group.end_char_code {
                return Err(FontError::MalformedSubtable(format!(
                    "map group starts at {:#x} after its end {:#x}",
                    group.start_char_code, group.end_char_code
                )));
            }
            if let Some(previous) = groups.last() {
                if previous.end_char_code >= group.start_char_code {
                    return Err(FontError::MalformedSubtable(format!(
                        "map group at {:#x} overlaps or precedes the previous group",
                        group.start_char_code
                    )));
                }
            }
            groups.push(group);
        }

        Ok(groups)
    }

    /// Binary search over sorted, non-overlapping groups
    pub(super) fn find(groups: &[Self], code: u32) -> Option<&Self> {
        groups
            .binary_search_by(|group| {
                if group.end_char_code < code {
                    Ordering::Less
                } else if group.start_char_code > code {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .ok()
            .map(|index| &groups[index])
    }

    /// Glyph for `code` when the run maps to consecutive glyphs
    pub(super) fn sequential_glyph(&self, code: u32) -> Option<u16> {
        let glyph = self
            .glyph_id
            .checked_add(code.checked_sub(self.start_char_code)?)?;
        u16::try_from(glyph).ok().filter(|&glyph| glyph != 0)
    }
}

/// Segmented coverage, the usual subtable for full Unicode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format12 {
    pub language: u32,
    pub groups: Vec<MapGroup>,
}

impl Format12 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 8)?;
        let language = reader.read_u32()?;
        let num_groups = reader.read_u32()? as usize;
        let groups = MapGroup::read_groups(&mut reader, num_groups)?;

        Ok(Self { language, groups })
    }

    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        MapGroup::find(&self.groups, code)?.sequential_glyph(code)
    }
}
