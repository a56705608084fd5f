use crate::{FontError, buffer::FontReader};

use super::MapGroup;

/// Many-to-one range mappings, every code of a group maps to the same glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format13 {
    pub language: u32,
    pub groups: Vec<MapGroup>,
}

impl Format13 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 8)?;
        let language = reader.read_u32()?;
        let num_groups = reader.read_u32()? as usize;
        let groups = MapGroup::read_groups(&mut reader, num_groups)?;

        Ok(Self { language, groups })
    }

    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        let group = MapGroup::find(&self.groups, code)?;
        u16::try_from(group.glyph_id)
            .ok()
            .filter(|&glyph| glyph != 0)
    }
}

#[cfg(test)]
mod test {
    use crate::tables::cmap::{CmapSubtable, format12::test::groups_bytes};

    #[test]
    fn whole_range_maps_to_one_glyph() {
        let data = groups_bytes(13, &[(0x0, 0xFFFF, 3), (0x1_0000, 0x10_FFFF, 0)]);
        let subtable = CmapSubtable::decode(&data).unwrap();

        assert_eq!(subtable.format(), 13);
        assert_eq!(subtable.glyph_index(0x41), Some(3));
        assert_eq!(subtable.glyph_index(0xFFFF), Some(3));
        assert_eq!(subtable.glyph_index(0x1_0000), None);
        assert_eq!(subtable.glyph_index(0x11_0000), None);
    }
}
