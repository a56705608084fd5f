use std::fmt;

/// Seconds between 1904-01-01 and 1970-01-01
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// A 4-byte table identifier such as `head` or `cmap`.
///
/// Tags compare and hash as raw bytes, which orders them the same way as
/// their big-endian `u32` value. Rendering them as text is only done for display.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const HEAD: Tag = Tag(*b"head");
    pub const CMAP: Tag = Tag(*b"cmap");

    pub const fn new(bytes: &[u8; 4]) -> Self {
        Tag(*bytes)
    }

    pub const fn from_u32(value: u32) -> Self {
        Tag(value.to_be_bytes())
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for Tag {
    fn from(value: [u8; 4]) -> Self {
        Tag(value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            let ch = if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '?'
            };
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// A 16.16 fixed point number stored as its raw 32-bit pattern.
///
/// The pattern is read as unsigned, so `0xFFFF_0000` is 65535.0 and not -1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fixed(pub u32);

impl Fixed {
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }

    /// Rounds to the nearest 1/65536. Values below 0 or above
    /// `u32::MAX / 65536` saturate, NaN becomes 0.
    pub fn from_f64(value: f64) -> Self {
        Fixed((value * 65536.0).round() as u32)
    }
}

/// A date stored as seconds since 1904-01-01T00:00:00 UTC.
/// Converting it to a calendar type is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LongDateTime(pub i64);

impl LongDateTime {
    pub fn seconds_since_1904(self) -> i64 {
        self.0
    }

    /// Seconds relative to the unix epoch, negative for dates before 1970
    pub fn to_unix_seconds(self) -> i64 {
        self.0.saturating_sub(MAC_EPOCH_OFFSET)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tag_display_and_ordering() {
        assert_eq!(Tag::CMAP.to_string(), "cmap");
        assert_eq!(Tag::new(b"OS/2").to_string(), "OS/2");
        assert_eq!(Tag([b'a', 0, 0x7F, b'b']).to_string(), "a??b");

        assert_eq!(Tag::from_u32(0x68656164), Tag::HEAD);
        assert_eq!(Tag::HEAD.to_u32(), 0x68656164);
        assert!(Tag::CMAP < Tag::HEAD);
        assert!(Tag::new(b"OS/2") < Tag::CMAP);
    }

    #[test]
    fn fixed_conversions() {
        assert_eq!(Fixed(0x0001_0000).to_f64(), 1.0);
        assert_eq!(Fixed(0x0002_8000).to_f64(), 2.5);
        assert_eq!(Fixed::from_f64(1.5), Fixed(0x0001_8000));
        assert_eq!(Fixed(0xFFFF_0000).to_f64(), 65535.0);
        assert_eq!(Fixed::from_f64(-1.0), Fixed(0));
        assert_eq!(Fixed::from_f64(1e12), Fixed(u32::MAX));
    }

    #[test]
    fn long_date_time_to_unix() {
        assert_eq!(LongDateTime(2_082_844_800).to_unix_seconds(), 0);
        assert_eq!(LongDateTime(0).to_unix_seconds(), -2_082_844_800);
        assert_eq!(LongDateTime(3_562_553_439).seconds_since_1904(), 3_562_553_439);
    }
}
