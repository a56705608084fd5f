use bitflags::bitflags;
use log::{debug, warn};

use crate::{
    FontError,
    buffer::FontReader,
    types::{Fixed, LongDateTime},
};

/// Size of the fixed `head` record
pub const HEAD_TABLE_SIZE: usize = 54;

/// Value every well-formed `head` table carries in `magic_number`
pub const HEAD_MAGIC_NUMBER: u32 = 0x5F0F_3CF5;

bitflags! {
    /// The flags field of the 'head' table.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HeadFlags: u16 {
        /// Bit 0: A Y coordinate of 0 corresponds to the font's baseline.
        const Y_VALUE_ZERO_IS_BASELINE = 1 << 0;
        /// Bit 1: The x position of the left most black bit is the LSB.
        const X_POS_LEFTMOST_BLACK_BIT_IS_LSB = 1 << 1;
        /// Bit 2: Scaled point size and actual point size will differ.
        const SCALED_POINT_SIZE_DIFFERS = 1 << 2;
        /// Bit 3: Use integer scaling instead of fractional.
        const USE_INTEGER_SCALING = 1 << 3;
        /// Bit 4: Used by the Microsoft implementation of the TrueType scaler.
        const MICROSOFT_SCALER = 1 << 4;
        /// Bit 5: Intended to be laid out vertically, x = 0 is the vertical baseline.
        const VERTICAL_LAYOUT = 1 << 5;
        /// Bit 7: Requires layout for correct linguistic rendering (e.g. Arabic fonts).
        const REQUIRES_LINGUISTIC_LAYOUT = 1 << 7;
        /// Bit 8: An AAT font with metamorphosis effects designated as happening by default.
        const AAT_DEFAULT_METAMORPHOSIS = 1 << 8;
        /// Bit 9: Contains strong right-to-left glyphs.
        const STRONG_RTL_GLYPHS = 1 << 9;
        /// Bit 10: Contains Indic-style rearrangement effects.
        const INDIC_REARRANGEMENT = 1 << 10;
        /// Bit 11: Font data is lossless after a transforming compression.
        const LOSSLESS_DATA = 1 << 11;
        /// Bit 12: Font has been converted, producing compatible metrics.
        const CONVERTED = 1 << 12;
        /// Bit 13: Optimized for ClearType.
        const CLEARTYPE_OPTIMIZED = 1 << 13;
        /// Bit 14: Glyphs are generic symbols for code point ranges, such as a last resort font.
        const LAST_RESORT = 1 << 14;
    }
}

bitflags! {
    /// The macStyle field of the 'head' table.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MacStyle: u16 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const OUTLINE = 1 << 3;
        const SHADOW = 1 << 4;
        const CONDENSED = 1 << 5;
        const EXTENDED = 1 << 6;
    }
}

/// How the `loca` table stores glyph offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexToLocFormat {
    /// 16-bit offsets divided by two
    Short,
    /// 32-bit offsets
    Long,
}

/// A representation of the [head table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html)
#[derive(Debug, Clone, PartialEq)]
pub struct HeadTable {
    /// Almost always 0x00010000
    pub version: Fixed,

    /// Font revision set by the font author/manufacturer
    pub font_revision: Fixed,

    /// 0xB1B0AFBA minus the sum of the entire font, with this field zeroed
    pub checksum_adjustment: u32,

    /// Obsolete, always set to 0x5F0F3CF5
    pub magic_number: u32,

    /// Raw flags, see [`HeadTable::flags`]
    pub flags: u16,

    /// Units per em (ranges from 16 to 16384)
    pub units_per_em: u16,

    pub created: LongDateTime,

    pub modified: LongDateTime,

    /// The minimum x value for all glyph bounding boxes
    pub x_min: i16,

    /// The minimum y value for all glyph bounding boxes
    pub y_min: i16,

    /// The maximum x value for all glyph bounding boxes
    pub x_max: i16,

    /// The maximum y value for all glyph bounding boxes
    pub y_max: i16,

    /// Raw style bits, see [`HeadTable::style`]
    pub mac_style: u16,

    /// Smallest readable size in pixels
    pub lowest_rec_ppem: u16,

    /// Deprecated, should be 2
    pub font_direction_hint: i16,

    /// 0 for short `loca` offsets and 1 for long
    pub index_to_loc_format: i16,

    /// 0 for the current glyph data format
    pub glyph_data_format: i16,
}

impl HeadTable {
    /// Decodes the fixed 54 byte record from the start of `data`.
    ///
    /// The only failure is [`FontError::TruncatedInput`], the layout has no
    /// variable length parts.
    pub fn decode(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = FontReader::new(data);
        Self::from_reader(&mut reader)
    }

    pub fn from_reader(reader: &mut FontReader<'_>) -> Result<Self, FontError> {
        let head = Self {
            version: reader.read_fixed()?,
            font_revision: reader.read_fixed()?,
            checksum_adjustment: reader.read_u32()?,
            magic_number: reader.read_u32()?,
            flags: reader.read_u16()?,
            units_per_em: reader.read_u16()?,
            created: reader.read_long_date_time()?,
            modified: reader.read_long_date_time()?,
            x_min: reader.read_fword()?,
            y_min: reader.read_fword()?,
            x_max: reader.read_fword()?,
            y_max: reader.read_fword()?,
            mac_style: reader.read_u16()?,
            lowest_rec_ppem: reader.read_u16()?,
            font_direction_hint: reader.read_i16()?,
            index_to_loc_format: reader.read_i16()?,
            glyph_data_format: reader.read_i16()?,
        };

        if head.magic_number != HEAD_MAGIC_NUMBER {
            warn!("unexpected head magic number {:#010x}", head.magic_number);
        }
        debug!(
            "decoded head table: units_per_em={} index_to_loc_format={}",
            head.units_per_em, head.index_to_loc_format
        );

        Ok(head)
    }

    /// The known flag bits, unknown bits are dropped
    pub fn flags(&self) -> HeadFlags {
        HeadFlags::from_bits_truncate(self.flags)
    }

    pub fn style(&self) -> MacStyle {
        MacStyle::from_bits_truncate(self.mac_style)
    }

    /// `None` when `index_to_loc_format` is neither 0 nor 1
    pub fn loca_format(&self) -> Option<IndexToLocFormat> {
        match self.index_to_loc_format {
            0 => Some(IndexToLocFormat::Short),
            1 => Some(IndexToLocFormat::Long),
            _ => None,
        }
    }
}
