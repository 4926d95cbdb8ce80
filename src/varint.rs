//! Variable-length integer encoding
//!
//! Auxiliary byte-level varints for flexible-width integers: 7 data bits per
//! byte with a continuation bit in the high position. The unsigned form
//! zero-extends; the signed form sign-extends the final byte's 7-bit payload
//! so that small negative numbers stay compact (`-1` is a single byte).

use crate::error::{Result, StringZipError};

/// Utility struct for variable-length integer encoding/decoding
pub struct VarInt;

impl VarInt {
    /// Maximum number of bytes needed to encode a 64-bit value as a varint
    pub const MAX_ENCODED_LEN: usize = 10;

    /// Append `value` to `buffer` as an unsigned varint, returning the number
    /// of bytes written.
    pub fn write_unsigned(buffer: &mut Vec<u8>, mut value: u64) -> usize {
        let mut bytes_written = 0;
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buffer.push(byte);
            bytes_written += 1;
            if value == 0 {
                return bytes_written;
            }
        }
    }

    /// Encode `value` as an unsigned varint.
    pub fn encode_unsigned(value: u64) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::MAX_ENCODED_LEN);
        Self::write_unsigned(&mut buffer, value);
        buffer
    }

    /// Decode an unsigned varint from the front of `data`, returning the
    /// value and the number of bytes consumed.
    pub fn decode_unsigned(data: &[u8]) -> Result<(u64, usize)> {
        let mut result = 0u64;
        let mut shift = 0;
        for (i, &byte) in data.iter().enumerate() {
            if i >= Self::MAX_ENCODED_LEN || shift >= 64 {
                return Err(StringZipError::invalid_data("varint too long"));
            }
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok((result, i + 1));
            }
            shift += 7;
        }
        Err(StringZipError::invalid_data("incomplete varint"))
    }

    /// Append `value` to `buffer` as a signed varint, returning the number of
    /// bytes written.
    ///
    /// The continuation scheme matches the unsigned form, but the terminating
    /// byte's 7 data bits are treated as a signed quantity, so the encoding
    /// stops as soon as the remaining bits are pure sign extension.
    pub fn write_signed(buffer: &mut Vec<u8>, mut value: i64) -> usize {
        let mut bytes_written = 0;
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
            buffer.push(if done { byte } else { byte | 0x80 });
            bytes_written += 1;
            if done {
                return bytes_written;
            }
        }
    }

    /// Encode `value` as a signed varint.
    pub fn encode_signed(value: i64) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::MAX_ENCODED_LEN);
        Self::write_signed(&mut buffer, value);
        buffer
    }

    /// Decode a signed varint from the front of `data`, returning the value
    /// and the number of bytes consumed.
    ///
    /// Continuation bytes accumulate their low 7 bits normally; the
    /// terminating byte's payload is sign-extended before shifting into
    /// position.
    pub fn decode_signed(data: &[u8]) -> Result<(i64, usize)> {
        let mut result = 0i64;
        let mut shift = 0;
        for (i, &byte) in data.iter().enumerate() {
            if i >= Self::MAX_ENCODED_LEN || shift >= 64 {
                return Err(StringZipError::invalid_data("varint too long"));
            }
            if byte & 0x80 == 0 {
                let mut payload = (byte & 0x7f) as i64;
                if byte & 0x40 != 0 {
                    payload |= !0x3f;
                }
                result |= payload << shift;
                return Ok((result, i + 1));
            }
            result |= ((byte & 0x7f) as i64) << shift;
            shift += 7;
        }
        Err(StringZipError::invalid_data("incomplete varint"))
    }

    /// The number of bytes an unsigned varint encoding of `value` occupies.
    pub fn encoded_len(mut value: u64) -> usize {
        let mut len = 1;
        value >>= 7;
        while value > 0 {
            len += 1;
            value >>= 7;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_basic_encoding() {
        let test_cases = [
            (0u64, vec![0u8]),
            (1, vec![1]),
            (127, vec![127]),
            (128, vec![0x80, 1]),
            (300, vec![0xac, 2]),
            (16384, vec![0x80, 0x80, 1]),
        ];
        for (value, expected) in test_cases {
            let encoded = VarInt::encode_unsigned(value);
            assert_eq!(encoded, expected, "failed encoding {}", value);
            let (decoded, consumed) = VarInt::decode_unsigned(&encoded).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn test_unsigned_full_range() {
        for value in [u64::MAX, u64::MAX / 2, 1 << 63, 1 << 32, 1 << 14, 1 << 7] {
            let encoded = VarInt::encode_unsigned(value);
            assert!(encoded.len() <= VarInt::MAX_ENCODED_LEN);
            assert_eq!(encoded.len(), VarInt::encoded_len(value));
            let (decoded, _) = VarInt::decode_unsigned(&encoded).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_signed_single_byte_boundaries() {
        // Values whose 7-bit payload already carries the right sign fit in
        // one byte; one past the boundary needs a continuation byte.
        assert_eq!(VarInt::encode_signed(0), vec![0]);
        assert_eq!(VarInt::encode_signed(-1), vec![0x7f]);
        assert_eq!(VarInt::encode_signed(63), vec![0x3f]);
        assert_eq!(VarInt::encode_signed(-64), vec![0x40]);
        assert_eq!(VarInt::encode_signed(64), vec![0xc0, 0x00]);
        assert_eq!(VarInt::encode_signed(-65), vec![0xbf, 0x7f]);
    }

    #[test]
    fn test_signed_full_range() {
        let test_values = [
            0,
            1,
            -1,
            63,
            -64,
            64,
            -65,
            i64::MAX,
            i64::MIN,
            i64::MAX / 7,
            i64::MIN / 3,
        ];
        for &value in &test_values {
            let encoded = VarInt::encode_signed(value);
            assert!(encoded.len() <= VarInt::MAX_ENCODED_LEN);
            let (decoded, consumed) = VarInt::decode_signed(&encoded).unwrap();
            assert_eq!(decoded, value, "failed for signed value {}", value);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn test_decode_rejects_overlong_input() {
        let overlong = vec![0x80u8; 11];
        assert!(VarInt::decode_unsigned(&overlong).is_err());
        assert!(VarInt::decode_signed(&overlong).is_err());
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let truncated = vec![0x80u8];
        assert!(VarInt::decode_unsigned(&truncated).is_err());
        assert!(VarInt::decode_signed(&truncated).is_err());
    }

    #[test]
    fn test_write_appends_to_buffer() {
        let mut buffer = vec![0xee];
        assert_eq!(VarInt::write_unsigned(&mut buffer, 300), 2);
        assert_eq!(buffer, vec![0xee, 0xac, 2]);
    }
}
