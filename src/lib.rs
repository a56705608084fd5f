use std::io::{self, Read};

use thiserror::Error;

pub mod buffer;
pub mod tables;
pub mod types;

pub use tables::{
    TableDirectory, TableRecord,
    cmap::{CmapSubtable, CmapSubtableRecord, CmapTable, VariationGlyph},
    head::HeadTable,
};
pub use types::{Fixed, LongDateTime, Tag};

/// Every way decoding a font can fail.
#[derive(Debug, Error)]
pub enum FontError {
    /// Fewer bytes were available than the current field or record requires.
    #[error("unexpected end of data at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("malformed table directory: {0}")]
    MalformedDirectory(String),

    #[error("malformed cmap table: {0}")]
    MalformedCmap(String),

    #[error("malformed cmap subtable: {0}")]
    MalformedSubtable(String),

    /// A cmap subtable format outside 0, 2, 4, 6, 8, 10, 12, 13 and 14.
    /// Only that subtable is unusable, its siblings can still be decoded.
    #[error("cmap subtable format {0} is not supported")]
    UnsupportedFormat(u16),

    #[error("the font has no '{0}' table")]
    MissingTable(Tag),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads a whole font from a file or stream into memory
pub fn load_font<R: Read>(mut reader: R) -> Result<Vec<u8>, FontError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(data)
}

/// A decoded font directory over borrowed font bytes.
///
/// The directory is decoded eagerly, `head` and `cmap` on request. Nothing
/// here is mutated after construction, so a `Font` can be shared freely
/// between threads.
#[derive(Debug, Clone)]
pub struct Font<'a> {
    data: &'a [u8],
    directory: TableDirectory,
}

impl<'a> Font<'a> {
    /// Decodes the table directory of a complete font binary
    ///
    /// # Errors
    ///
    /// Fails with [`FontError::TruncatedInput`] if the directory is cut short and
    /// with [`FontError::MalformedDirectory`] if an entry points outside `data`.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, FontError> {
        let directory = TableDirectory::decode(data)?;
        Ok(Self { data, directory })
    }

    pub fn directory(&self) -> &TableDirectory {
        &self.directory
    }

    /// The raw bytes of a table, if the directory lists it
    pub fn table_data(&self, tag: Tag) -> Option<&'a [u8]> {
        self.directory.table_data(self.data, tag)
    }

    pub fn head(&self) -> Result<HeadTable, FontError> {
        let data = self.required_table(Tag::HEAD)?;
        HeadTable::decode(data)
    }

    /// Decodes the cmap header and its encoding records. The format bodies
    /// are decoded separately through [`CmapTable::subtable`].
    pub fn cmap(&self) -> Result<CmapTable<'a>, FontError> {
        let data = self.required_table(Tag::CMAP)?;
        CmapTable::decode(data)
    }

    fn required_table(&self, tag: Tag) -> Result<&'a [u8], FontError> {
        self.table_data(tag).ok_or(FontError::MissingTable(tag))
    }
}
