use std::{
    collections::{BTreeMap, btree_map},
    io,
    ops::Range,
};

use byteorder::{BigEndian, WriteBytesExt};
use log::{debug, warn};

use crate::{FontError, buffer::FontReader, types::Tag};

pub mod cmap;
pub mod head;

/// Size of the offset subtable at the start of every font file
pub const OFFSET_TABLE_SIZE: usize = 12;

/// Size of a single table directory entry
pub const TABLE_RECORD_SIZE: usize = 16;

/// The kind of outlines a font declares through its scaler type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfntVersion {
    /// `0x00010000`
    TrueType,
    /// `OTTO`, CFF outlines
    OpenTypeCff,
    /// `true`, used by older Apple fonts
    AppleTrue,
    Unknown(u32),
}

impl From<u32> for SfntVersion {
    fn from(value: u32) -> Self {
        match value {
            0x0001_0000 => Self::TrueType,
            0x4F54_544F => Self::OpenTypeCff,
            0x7472_7565 => Self::AppleTrue,
            other => Self::Unknown(other),
        }
    }
}

/// Represents the offset subtable and it's metadata, providing us with
/// important info such as the number of tables.
/// For more information, see the [Apple Documentation Table 2](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6.html)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    pub scaler_type: u32,
    pub num_tables: u16,
    /// (Maximum power of 2 <= num_tables) x 16
    pub search_range: u16,
    /// Log2(maximum power of 2 <= num_tables)
    pub entry_selector: u16,
    /// num_tables x 16 - search_range
    pub range_shift: u16,
}

impl OffsetTable {
    /// Parses the offset subtable from a reader positioned at the start of the file
    pub fn from_reader(reader: &mut FontReader<'_>) -> Result<Self, FontError> {
        Ok(Self {
            scaler_type: reader.read_u32()?,
            num_tables: reader.read_u16()?,
            search_range: reader.read_u16()?,
            entry_selector: reader.read_u16()?,
            range_shift: reader.read_u16()?,
        })
    }

    pub fn sfnt_version(&self) -> SfntVersion {
        SfntVersion::from(self.scaler_type)
    }

    fn write<W: io::Write>(&self, wr: &mut W) -> Result<(), io::Error> {
        wr.write_u32::<BigEndian>(self.scaler_type)?;
        wr.write_u16::<BigEndian>(self.num_tables)?;
        wr.write_u16::<BigEndian>(self.search_range)?;
        wr.write_u16::<BigEndian>(self.entry_selector)?;
        wr.write_u16::<BigEndian>(self.range_shift)?;
        Ok(())
    }
}

/// A single entry of the table directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    /// The checksum of the table. Carried as-is, never verified here.
    pub checksum: u32,
    /// The offset of the table, in bytes, from the beginning of the file
    pub offset: u32,
    /// The length of the table in bytes, not including any padding
    pub length: u32,
}

impl TableRecord {
    pub fn from_reader(reader: &mut FontReader<'_>) -> Result<Self, FontError> {
        Ok(Self {
            tag: reader.read_tag()?,
            checksum: reader.read_u32()?,
            offset: reader.read_u32()?,
            length: reader.read_u32()?,
        })
    }

    /// The byte range of the table inside the font file
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }

    fn check_bounds(&self, file_len: usize) -> Result<(), FontError> {
        let end = u64::from(self.offset) + u64::from(self.length);
        if end > file_len as u64 {
            return Err(FontError::MalformedDirectory(format!(
                "table '{}' spans bytes {}..{} but the file is only {} bytes long",
                self.tag, self.offset, end, file_len
            )));
        }
        Ok(())
    }

    fn write<W: io::Write>(&self, wr: &mut W) -> Result<(), io::Error> {
        wr.write_all(self.tag.as_bytes())?;
        wr.write_u32::<BigEndian>(self.checksum)?;
        wr.write_u32::<BigEndian>(self.offset)?;
        wr.write_u32::<BigEndian>(self.length)?;
        Ok(())
    }
}

/// The offset subtable together with every table record, indexed by tag.
///
/// When a file lists the same tag more than once, the entry appearing
/// last in the file replaces the earlier ones for lookups. The records are
/// also kept exactly as listed so the directory can be written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDirectory {
    pub offset: OffsetTable,
    records: Vec<TableRecord>,
    entries: BTreeMap<Tag, TableRecord>,
}

impl TableDirectory {
    /// Decodes the offset subtable and all table records from the start of a font file.
    ///
    /// # Errors
    ///
    /// * [`FontError::TruncatedInput`] if the file ends before `num_tables`
    ///   records have been read.
    /// * [`FontError::MalformedDirectory`] if a record points past the end of the file.
    pub fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::new(data);
        let offset = OffsetTable::from_reader(&mut reader)?;

        // Reject counts that cannot fit before reading a single record
        let records_len = usize::from(offset.num_tables) * TABLE_RECORD_SIZE;
        if records_len > reader.remaining() {
            return Err(FontError::TruncatedInput {
                offset: reader.position(),
                needed: records_len,
                available: reader.remaining(),
            });
        }

        let mut records = Vec::with_capacity(usize::from(offset.num_tables));
        let mut entries = BTreeMap::new();
        for _ in 0..offset.num_tables {
            let record = TableRecord::from_reader(&mut reader)?;
            record.check_bounds(data.len())?;
            records.push(record);

            if let Some(previous) = entries.insert(record.tag, record) {
                warn!(
                    "duplicate table '{}' in directory, offset {} replaced by {}",
                    record.tag, previous.offset, record.offset
                );
            }
        }

        debug!(
            "decoded table directory: {:?}, {} tables",
            offset.sfnt_version(),
            entries.len()
        );

        Ok(Self {
            offset,
            records,
            entries,
        })
    }

    pub fn get(&self, tag: Tag) -> Option<&TableRecord> {
        self.entries.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Number of distinct tags in the directory
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the records in ascending tag order
    pub fn iter(&self) -> btree_map::Values<'_, Tag, TableRecord> {
        self.entries.values()
    }

    /// Every record in file order, duplicates included
    pub fn records(&self) -> &[TableRecord] {
        &self.records
    }

    /// Slices the bytes of table `tag` out of the complete font `data`
    pub fn table_data<'a>(&self, data: &'a [u8], tag: Tag) -> Option<&'a [u8]> {
        self.get(tag).and_then(|record| data.get(record.range()))
    }

    /// Writes the offset subtable followed by the records in the order they
    /// were decoded, reproducing the original directory bytes.
    pub fn write<W: io::Write>(&self, mut wr: W) -> Result<(), FontError> {
        self.offset.write(&mut wr)?;
        for record in &self.records {
            record.write(&mut wr)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TableDirectory {
    type Item = &'a TableRecord;

    type IntoIter = btree_map::Values<'a, Tag, TableRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
