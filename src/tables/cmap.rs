//! The [cmap table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html),
//! mapping character codes to glyph indices.
//!
//! [`CmapTable`] only decodes the header and the encoding records. Each
//! record's format body is decoded on demand into a [`CmapSubtable`], so a
//! broken or unsupported subtable never keeps its siblings from being used.

mod format0;
mod format10;
mod format12;
mod format13;
mod format14;
mod format2;
mod format4;
mod format6;
mod format8;

use log::{debug, warn};

use crate::{FontError, buffer::FontReader};

pub use format0::Format0;
pub use format2::{Format2, SubHeader};
pub use format4::Format4;
pub use format6::Format6;
pub use format8::Format8;
pub use format10::Format10;
pub use format12::{Format12, MapGroup};
pub use format13::Format13;
pub use format14::{DefaultRange, Format14, UvsMapping, VariationGlyph, VariationSelector};

/// Size of the `version` and `numberSubtables` header
pub const CMAP_HEADER_SIZE: usize = 4;

/// Size of a single encoding record
pub const ENCODING_RECORD_SIZE: usize = 8;

/// Represents the platform identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformId {
    Unicode,
    Macintosh,
    Reserved,
    Microsoft,
    Unknown(u16),
}

impl From<u16> for PlatformId {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Unicode,
            1 => Self::Macintosh,
            2 => Self::Reserved,
            3 => Self::Microsoft,
            other => Self::Unknown(other),
        }
    }
}

/// Identifies an encoding and where its format body lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmapSubtableRecord {
    /// The platform identifier
    pub platform_id: u16,

    /// The platform specific encoding identifier
    pub platform_specific_id: u16,

    /// Byte offset of the format body from the start of the cmap table
    pub offset: u32,
}

impl CmapSubtableRecord {
    fn from_reader(reader: &mut FontReader<'_>) -> Result<Self, FontError> {
        Ok(Self {
            platform_id: reader.read_u16()?,
            platform_specific_id: reader.read_u16()?,
            offset: reader.read_u32()?,
        })
    }

    pub fn platform(&self) -> PlatformId {
        PlatformId::from(self.platform_id)
    }

    /// Rank of this encoding as a Unicode character map, lower is preferred.
    /// `None` for encodings that are not Unicode character maps, including
    /// the Unicode variation sequence encoding 0/5.
    fn unicode_preference(&self) -> Option<u8> {
        match (self.platform(), self.platform_specific_id) {
            (PlatformId::Unicode, 5) => None,
            (PlatformId::Unicode, _) => Some(0),
            (PlatformId::Microsoft, 10) => Some(1),
            (PlatformId::Microsoft, 1) => Some(2),
            _ => None,
        }
    }
}

/// The cmap header and its encoding records, in file order.
///
/// Borrows the cmap bytes so format bodies can be decoded later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmapTable<'a> {
    /// Almost always 0
    pub version: u16,

    /// The number of encoding subtables
    pub num_subtables: u16,

    pub records: Vec<CmapSubtableRecord>,

    data: &'a [u8],
}

impl<'a> CmapTable<'a> {
    /// Decodes the header and encoding records of the cmap table held in `data`.
    ///
    /// # Errors
    ///
    /// * [`FontError::TruncatedInput`] if the 4 byte header itself is cut short.
    /// * [`FontError::MalformedCmap`] if the declared records do not fit in the table.
    pub fn decode(data: &'a [u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::new(data);
        let version = reader.read_u16()?;
        let num_subtables = reader.read_u16()?;

        let records_len = usize::from(num_subtables) * ENCODING_RECORD_SIZE;
        if records_len > reader.remaining() {
            return Err(FontError::MalformedCmap(format!(
                "{} encoding records need {} bytes but the table has {} left",
                num_subtables,
                records_len,
                reader.remaining()
            )));
        }

        let records = (0..num_subtables)
            .map(|_| CmapSubtableRecord::from_reader(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;

        if version != 0 {
            warn!("unexpected cmap version {version}");
        }
        debug!("decoded cmap table: {num_subtables} encoding records");

        Ok(Self {
            version,
            num_subtables,
            records,
            data,
        })
    }

    /// Finds the first record with exactly this platform and encoding
    pub fn find_record(
        &self,
        platform_id: u16,
        platform_specific_id: u16,
    ) -> Option<&CmapSubtableRecord> {
        self.records.iter().find(|record| {
            record.platform_id == platform_id && record.platform_specific_id == platform_specific_id
        })
    }

    /// The preferred Unicode encoding record: any Unicode platform record
    /// first, then Windows full repertoire (3/10), then Windows BMP (3/1).
    /// Ties keep file order.
    pub fn find_unicode_record(&self) -> Option<&CmapSubtableRecord> {
        self.unicode_records().into_iter().next()
    }

    /// Maps a Unicode code point through the most preferred Unicode subtable
    /// that decodes. Subtables that fail to decode are skipped.
    ///
    /// Returns `None` when no Unicode subtable decodes, or when the code
    /// point is not covered or maps to glyph 0.
    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        self.unicode_records()
            .into_iter()
            .find_map(|record| self.subtable(record).ok())
            .and_then(|subtable| subtable.glyph_index(code))
    }

    fn unicode_records(&self) -> Vec<&CmapSubtableRecord> {
        let mut records = self
            .records
            .iter()
            .filter(|record| record.unicode_preference().is_some())
            .collect::<Vec<_>>();
        records.sort_by_key(|record| record.unicode_preference());
        records
    }

    /// Decodes the format body a record points at
    pub fn subtable(&self, record: &CmapSubtableRecord) -> Result<CmapSubtable, FontError> {
        let result = self
            .data
            .get(record.offset as usize..)
            .ok_or_else(|| {
                FontError::MalformedSubtable(format!(
                    "offset {} is outside the {} byte cmap table",
                    record.offset,
                    self.data.len()
                ))
            })
            .and_then(CmapSubtable::decode);

        if let Err(err) = &result {
            debug!(
                "cmap subtable {}/{} at offset {}: {}",
                record.platform_id, record.platform_specific_id, record.offset, err
            );
        }
        result
    }

    /// Decodes every subtable independently, in record order
    pub fn subtables(
        &self,
    ) -> impl Iterator<Item = (&CmapSubtableRecord, Result<CmapSubtable, FontError>)> + '_ {
        self.records
            .iter()
            .map(|record| (record, self.subtable(record)))
    }
}

/// A decoded cmap format body, one variant per supported format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmapSubtable {
    Format0(Format0),
    Format2(Format2),
    Format4(Format4),
    Format6(Format6),
    Format8(Format8),
    Format10(Format10),
    Format12(Format12),
    Format13(Format13),
    Format14(Format14),
}

impl CmapSubtable {
    /// Decodes a subtable from `data`, which starts at its format field and
    /// runs to the end of the enclosing cmap table.
    ///
    /// The subtable's own length field must fit inside `data`; the format
    /// decoders only ever see the bytes that length declares.
    pub fn decode(data: &[u8]) -> Result<Self, FontError> {
        let format = FontReader::new(data).read_u16()?;

        // the last argument is each format's fixed part, up to its first counted array
        match format {
            0 => Format0::decode(span(data, LengthField::U16, 262)?).map(Self::Format0),
            2 => Format2::decode(span(data, LengthField::U16, 518)?).map(Self::Format2),
            4 => Format4::decode(span(data, LengthField::U16, 14)?).map(Self::Format4),
            6 => Format6::decode(span(data, LengthField::U16, 10)?).map(Self::Format6),
            8 => Format8::decode(span(data, LengthField::U32Reserved, 8208)?).map(Self::Format8),
            10 => Format10::decode(span(data, LengthField::U32Reserved, 20)?).map(Self::Format10),
            12 => Format12::decode(span(data, LengthField::U32Reserved, 16)?).map(Self::Format12),
            13 => Format13::decode(span(data, LengthField::U32Reserved, 16)?).map(Self::Format13),
            14 => Format14::decode(span(data, LengthField::U32, 10)?).map(Self::Format14),
            other => Err(FontError::UnsupportedFormat(other)),
        }
    }

    pub fn format(&self) -> u16 {
        match self {
            Self::Format0(_) => 0,
            Self::Format2(_) => 2,
            Self::Format4(_) => 4,
            Self::Format6(_) => 6,
            Self::Format8(_) => 8,
            Self::Format10(_) => 10,
            Self::Format12(_) => 12,
            Self::Format13(_) => 13,
            Self::Format14(_) => 14,
        }
    }

    /// The Macintosh language code, `None` for format 14 which has none
    pub fn language(&self) -> Option<u32> {
        match self {
            Self::Format0(subtable) => Some(u32::from(subtable.language)),
            Self::Format2(subtable) => Some(u32::from(subtable.language)),
            Self::Format4(subtable) => Some(u32::from(subtable.language)),
            Self::Format6(subtable) => Some(u32::from(subtable.language)),
            Self::Format8(subtable) => Some(subtable.language),
            Self::Format10(subtable) => Some(subtable.language),
            Self::Format12(subtable) => Some(subtable.language),
            Self::Format13(subtable) => Some(subtable.language),
            Self::Format14(_) => None,
        }
    }

    /// Maps a character code to a glyph index.
    ///
    /// Returns `None` when the code is not covered or maps to glyph 0.
    /// Format 14 only maps variation sequences, see [`CmapSubtable::variation_glyph`].
    pub fn glyph_index(&self, code: u32) -> Option<u16> {
        match self {
            Self::Format0(subtable) => subtable.glyph_index(code),
            Self::Format2(subtable) => subtable.glyph_index(code),
            Self::Format4(subtable) => subtable.glyph_index(code),
            Self::Format6(subtable) => subtable.glyph_index(code),
            Self::Format8(subtable) => subtable.glyph_index(code),
            Self::Format10(subtable) => subtable.glyph_index(code),
            Self::Format12(subtable) => subtable.glyph_index(code),
            Self::Format13(subtable) => subtable.glyph_index(code),
            Self::Format14(_) => None,
        }
    }

    /// Maps a base character and a variation selector, format 14 only
    pub fn variation_glyph(&self, code: u32, selector: u32) -> Option<VariationGlyph> {
        match self {
            Self::Format14(subtable) => subtable.variation_glyph(code, selector),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LengthField {
    /// `format: u16, length: u16`
    U16,
    /// `format: u16, reserved: u16, length: u32`
    U32Reserved,
    /// `format: u16, length: u32`
    U32,
}

/// Cuts a subtable down to the length it declares, which must cover at
/// least `header_size` bytes
fn span(data: &[u8], field: LengthField, header_size: usize) -> Result<&[u8], FontError> {
    let mut reader = FontReader::at(data, 2)?;
    let length = match field {
        LengthField::U16 => usize::from(reader.read_u16()?),
        LengthField::U32Reserved => {
            reader.skip(2)?;
            reader.read_u32()? as usize
        }
        LengthField::U32 => reader.read_u32()? as usize,
    };

    if length < header_size {
        return Err(FontError::MalformedSubtable(format!(
            "declared length {length} is shorter than the {header_size} byte subtable header"
        )));
    }
    if length > data.len() {
        return Err(FontError::MalformedSubtable(format!(
            "declared length {} exceeds the {} bytes available",
            length,
            data.len()
        )));
    }

    Ok(&data[..length])
}

/// Fails with `MalformedSubtable` unless `count` items of `item_size` bytes fit
fn ensure_fits(
    reader: &FontReader<'_>,
    count: usize,
    item_size: usize,
    what: &str,
) -> Result<(), FontError> {
    match count.checked_mul(item_size) {
        Some(needed) if needed <= reader.remaining() => Ok(()),
        _ => Err(FontError::MalformedSubtable(format!(
            "{count} {what} do not fit in the {} bytes left",
            reader.remaining()
        ))),
    }
}

/// Applies a 16-bit delta modulo 65536, the way cmap deltas are defined
fn apply_delta(glyph: u16, delta: i16) -> u16 {
    glyph.wrapping_add(delta as u16)
}
