use crate::{FontError, buffer::FontReader};

use super::ensure_fits;

const SELECTOR_RECORD_SIZE: usize = 11;
const DEFAULT_RANGE_SIZE: usize = 4;
const UVS_MAPPING_SIZE: usize = 5;

/// A run of base characters whose variation sequence uses the default glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRange {
    pub start_unicode_value: u32,
    /// Number of code points in the run after the first
    pub additional_count: u8,
}

impl DefaultRange {
    fn contains(&self, code: u32) -> bool {
        code >= self.start_unicode_value
            && code - self.start_unicode_value <= u32::from(self.additional_count)
    }
}

/// A base character whose variation sequence maps to a specific glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvsMapping {
    pub unicode_value: u32,
    pub glyph_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationSelector {
    pub var_selector: u32,
    /// Sorted by start value, empty when the record has no default table
    pub default_ranges: Vec<DefaultRange>,
    /// Sorted by unicode value, empty when the record has no non-default table
    pub mappings: Vec<UvsMapping>,
}

/// The outcome of a variation sequence lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationGlyph {
    /// Use the glyph the base character maps to in a regular subtable
    UseDefault,
    Glyph(u16),
}

/// Unicode variation sequences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format14 {
    /// Sorted by selector
    pub selectors: Vec<VariationSelector>,
}

impl Format14 {
    pub(super) fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::at(data, 6)?;
        let num_records = reader.read_u32()? as usize;
        ensure_fits(&reader, num_records, SELECTOR_RECORD_SIZE, "variation selector records")?;

        let mut selectors: Vec<VariationSelector> = Vec::with_capacity(num_records);
        for _ in 0..num_records {
            let var_selector = reader.read_u24()?;
            let default_offset = reader.read_u32()?;
            let non_default_offset = reader.read_u32()?;

            if selectors
                .last()
                .is_some_and(|previous| previous.var_selector >= var_selector)
            {
                return Err(FontError::MalformedSubtable(format!(
                    "variation selector {var_selector:#x} is out of order"
                )));
            }

            selectors.push(VariationSelector {
                var_selector,
                default_ranges: read_default_ranges(data, default_offset)?,
                mappings: read_mappings(data, non_default_offset)?,
            });
        }

        Ok(Self { selectors })
    }

    /// Looks up the glyph for `code` followed by variation selector `selector`
    pub fn variation_glyph(&self, code: u32, selector: u32) -> Option<VariationGlyph> {
        let index = self
            .selectors
            .binary_search_by_key(&selector, |record| record.var_selector)
            .ok()?;
        let record = &self.selectors[index];

        let range = record
            .default_ranges
            .partition_point(|range| range.start_unicode_value <= code);
        if range > 0 && record.default_ranges[range - 1].contains(code) {
            return Some(VariationGlyph::UseDefault);
        }

        let mapping = record
            .mappings
            .binary_search_by_key(&code, |mapping| mapping.unicode_value)
            .ok()?;
        match record.mappings[mapping].glyph_id {
            0 => None,
            glyph => Some(VariationGlyph::Glyph(glyph)),
        }
    }
}

/// Positions a reader at an offset from the start of the format 14 subtable
fn table_at(data: &[u8], offset: u32) -> Result<FontReader<'_>, FontError> {
    FontReader::at(data, offset as usize).map_err(|_| {
        FontError::MalformedSubtable(format!(
            "offset {} is outside the {} byte subtable",
            offset,
            data.len()
        ))
    })
}

fn read_default_ranges(data: &[u8], offset: u32) -> Result<Vec<DefaultRange>, FontError> {
    if offset == 0 {
        return Ok(Vec::new());
    }

    let mut reader = table_at(data, offset)?;
    let count = reader.read_u32()? as usize;
    ensure_fits(&reader, count, DEFAULT_RANGE_SIZE, "default UVS ranges")?;

    let mut ranges = Vec::with_capacity(count);
    for _ in 0..count {
        ranges.push(DefaultRange {
            start_unicode_value: reader.read_u24()?,
            additional_count: reader.read_u8()?,
        });
    }

    if !ranges.is_sorted_by_key(|range| range.start_unicode_value) {
        return Err(FontError::MalformedSubtable(
            "default UVS ranges are not sorted".to_string(),
        ));
    }
    Ok(ranges)
}

fn read_mappings(data: &[u8], offset: u32) -> Result<Vec<UvsMapping>, FontError> {
    if offset == 0 {
        return Ok(Vec::new());
    }

    let mut reader = table_at(data, offset)?;
    let count = reader.read_u32()? as usize;
    ensure_fits(&reader, count, UVS_MAPPING_SIZE, "UVS mappings")?;

    let mut mappings = Vec::with_capacity(count);
    for _ in 0..count {
        mappings.push(UvsMapping {
            unicode_value: reader.read_u24()?,
            glyph_id: reader.read_u16()?,
        });
    }

    if !mappings.is_sorted_by_key(|mapping| mapping.unicode_value) {
        return Err(FontError::MalformedSubtable(
            "UVS mappings are not sorted".to_string(),
        ));
    }
    Ok(mappings)
}
