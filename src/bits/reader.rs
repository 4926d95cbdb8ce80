//! Bit-level reading from byte slices

/// Reads bits from a byte slice, most-significant-bit first.
///
/// The reader keeps a cached current byte and bit mask and a cursor measured
/// in bits. Reading past the end of input is a programming error, not a
/// recoverable condition: it panics. Callers must either know the expected
/// length of the bitstream or rely on sentinel symbols to know when to stop.
///
/// ```
/// use stringzip::bits::{BitReader, BitWriter};
///
/// let mut writer = BitWriter::new();
/// writer.write(0b101, 3);
/// writer.write(0x2ff, 10);
/// let bytes = writer.finish();
///
/// let mut reader = BitReader::new(&bytes);
/// assert_eq!(reader.read(3), 0b101);
/// assert_eq!(reader.read(10), 0x2ff);
/// ```
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// The bytes to read bits from
    data: &'a [u8],
    /// The cached current byte
    current: u8,
    /// Mask selecting the next bit of `current`, or 0 when a new byte is needed
    mask: u8,
    /// The position of the read cursor in bits
    cursor: u64,
    /// Position in `data` of the next byte to cache
    byte_cursor: usize,
    /// Total number of readable bits
    bit_len: u64,
}

impl<'a> BitReader<'a> {
    /// Create a reader over the full byte slice (`8 * data.len()` bits).
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_bit_len(data, data.len() as u64 * 8)
    }

    /// Create a reader over the first `bit_len` bits of the slice.
    ///
    /// # Panics
    ///
    /// Panics if `bit_len` exceeds the number of bits in the slice.
    pub fn with_bit_len(data: &'a [u8], bit_len: u64) -> Self {
        assert!(
            bit_len <= data.len() as u64 * 8,
            "bit length {} exceeds buffer of {} bits",
            bit_len,
            data.len() as u64 * 8
        );
        Self {
            data,
            current: 0,
            mask: 0,
            cursor: 0,
            byte_cursor: 0,
            bit_len,
        }
    }

    /// The current bit position of the read cursor.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Seek to the given bit position, re-priming the byte cache and mask.
    ///
    /// # Panics
    ///
    /// Panics if `position` is beyond the end of input.
    pub fn seek(&mut self, position: u64) {
        assert!(
            position <= self.bit_len,
            "seek to bit {} beyond input of {} bits",
            position,
            self.bit_len
        );
        self.cursor = position;
        self.byte_cursor = (position / 8) as usize;
        if position == self.bit_len {
            // At the very end; the next read asserts.
            self.current = 0;
            self.mask = 0;
        } else {
            self.current = self.next_byte();
            self.mask = 0x80 >> (position % 8);
        }
    }

    /// True if at least one more bit remains.
    pub fn has_next(&self) -> bool {
        self.cursor < self.bit_len
    }

    /// Read the next bit.
    ///
    /// # Panics
    ///
    /// Panics when the input is exhausted.
    pub fn read_bit(&mut self) -> bool {
        if self.mask == 0 {
            self.current = self.next_byte();
            self.mask = 0x80;
        }
        assert!(self.cursor < self.bit_len, "bit reader out of input");
        let value = self.current & self.mask != 0;
        self.mask >>= 1;
        self.cursor += 1;
        value
    }

    /// Read an unsigned value of the given width, up to 32 bits.
    pub fn read(&mut self, bits: u32) -> u32 {
        assert!(bits <= 32, "bit count {} exceeds 32", bits);
        let mut value = 0u32;
        let mut remaining = bits;
        while remaining > 0 {
            if self.mask == 0 && remaining >= 8 && self.cursor + 8 <= self.bit_len {
                // Byte-aligned fast path
                let byte = self.next_byte();
                remaining -= 8;
                value |= (byte as u32) << remaining;
                self.cursor += 8;
            } else {
                remaining -= 1;
                if self.read_bit() {
                    value |= 1 << remaining;
                }
            }
        }
        value
    }

    /// Read an unsigned value of the given width, up to 64 bits.
    pub fn read_u64(&mut self, bits: u32) -> u64 {
        assert!(bits <= 64, "bit count {} exceeds 64", bits);
        let mut value = 0u64;
        let mut remaining = bits;
        while remaining > 0 {
            if self.mask == 0 && remaining >= 8 && self.cursor + 8 <= self.bit_len {
                let byte = self.next_byte();
                remaining -= 8;
                value |= (byte as u64) << remaining;
                self.cursor += 8;
            } else {
                remaining -= 1;
                if self.read_bit() {
                    value |= 1 << remaining;
                }
            }
        }
        value
    }

    /// Read a two-tier variable-width value written by
    /// [`BitWriter::write_flexible`](crate::bits::BitWriter::write_flexible):
    /// one flag bit, then either `small_bits` (flag set) or `big_bits`.
    pub fn read_flexible(&mut self, small_bits: u32, big_bits: u32) -> u32 {
        if self.read_bit() {
            self.read(small_bits)
        } else {
            self.read(big_bits)
        }
    }

    fn next_byte(&mut self) -> u8 {
        assert!(self.byte_cursor < self.data.len(), "bit reader out of input");
        let byte = self.data[self.byte_cursor];
        self.byte_cursor += 1;
        byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_msb_first() {
        // 0b1010_0000
        let mut reader = BitReader::new(&[0xa0]);
        assert!(reader.read_bit());
        assert!(!reader.read_bit());
        assert!(reader.read_bit());
        assert!(!reader.read_bit());
        assert_eq!(reader.cursor(), 4);
    }

    #[test]
    fn test_read_field_across_byte_boundary() {
        // 12-bit field 0xabc packed at the start: 1010 1011 1100 ....
        let mut reader = BitReader::new(&[0xab, 0xc0]);
        assert_eq!(reader.read(12), 0xabc);
        assert_eq!(reader.cursor(), 12);
    }

    #[test]
    fn test_read_unaligned_then_aligned() {
        let mut reader = BitReader::new(&[0b1011_0110, 0b0101_1010, 0xff]);
        assert_eq!(reader.read(3), 0b101);
        assert_eq!(reader.read(13), 0b1_0110_0101_1010);
        assert_eq!(reader.read(8), 0xff);
        assert!(!reader.has_next());
    }

    #[test]
    fn test_read_u64_wide_field() {
        let bytes = 0xdead_beef_cafe_f00du64.to_be_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_u64(64), 0xdead_beef_cafe_f00d);
    }

    #[test]
    fn test_seek_reprimes_cache() {
        let mut reader = BitReader::new(&[0xa0, 0x0f]);
        assert_eq!(reader.read(4), 0xa);
        reader.seek(12);
        assert_eq!(reader.read(4), 0xf);
        reader.seek(0);
        assert_eq!(reader.read(4), 0xa);
    }

    #[test]
    fn test_has_next_with_exact_bit_len() {
        let mut reader = BitReader::with_bit_len(&[0xff], 3);
        assert!(reader.has_next());
        reader.read(3);
        assert!(!reader.has_next());
    }

    #[test]
    #[should_panic(expected = "out of input")]
    fn test_overread_panics() {
        let mut reader = BitReader::new(&[0xff]);
        reader.read(9);
    }

    #[test]
    #[should_panic(expected = "out of input")]
    fn test_overread_with_bit_len_panics() {
        let mut reader = BitReader::with_bit_len(&[0xff], 4);
        reader.read(5);
    }
}
