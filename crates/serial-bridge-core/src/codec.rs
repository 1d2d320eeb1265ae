//! Single-byte value codec
//!
//! Every unit on the wire is one undelimited byte. The write path goes
//! through the little-endian representation of the value; for a one-byte
//! quantity this is the identity, so `encode` and `decode` are mutual
//! inverses over the whole range.

use std::fmt;

/// An 8-bit value destined for, or pulled from, the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteValue(u8);

impl ByteValue {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for ByteValue {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for ByteValue {
    type Error = u64;

    /// Rejects anything above 255, returning the offending value
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u8::try_from(value).map(Self).map_err(|_| value)
    }
}

impl fmt::Display for ByteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode a value as the byte written to the channel
pub fn encode(value: ByteValue) -> [u8; 1] {
    value.0.to_le_bytes()
}

/// Decode a byte read from the channel
pub fn decode(byte: [u8; 1]) -> ByteValue {
    ByteValue(u8::from_le_bytes(byte))
}

/// 8-character, zero-padded, MSB-first binary rendering
pub fn to_binary_string(value: ByteValue) -> String {
    format!("{:08b}", value.0)
}

/// Character whose code point equals the value (control characters included)
pub fn to_character(value: ByteValue) -> char {
    char::from(value.0)
}

/// Two lowercase hex digits for the raw byte
pub fn to_hex(value: ByteValue) -> String {
    hex::encode(encode(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_full_range() {
        for v in 0..=u8::MAX {
            let value = ByteValue::new(v);
            assert_eq!(decode(encode(value)), value);
            assert_eq!(encode(value), [v]);
        }
    }

    #[test]
    fn test_binary_string_parses_back() {
        for v in 0..=u8::MAX {
            let s = to_binary_string(ByteValue::new(v));
            assert_eq!(s.len(), 8);
            assert_eq!(u8::from_str_radix(&s, 2).unwrap(), v);
        }
        assert_eq!(to_binary_string(ByteValue::new(5)), "00000101");
        assert_eq!(to_binary_string(ByteValue::new(200)), "11001000");
    }

    #[test]
    fn test_character_interpretation() {
        assert_eq!(to_character(ByteValue::new(65)), 'A');
        assert_eq!(to_character(ByteValue::new(46)), '.');
        // No filtering below the printable range
        assert_eq!(to_character(ByteValue::new(7)), '\u{7}');
        assert_eq!(to_character(ByteValue::new(233)), 'é');
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(to_hex(ByteValue::new(0x41)), "41");
        assert_eq!(to_hex(ByteValue::new(0)), "00");
        assert_eq!(to_hex(ByteValue::new(255)), "ff");
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert_eq!(ByteValue::try_from(255u64), Ok(ByteValue::new(255)));
        assert_eq!(ByteValue::try_from(256u64), Err(256));
    }
}
