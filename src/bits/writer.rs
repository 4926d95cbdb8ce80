//! Bit-level writing into byte buffers

/// Writes bits into an internal byte vector, most-significant-bit first.
///
/// The writer accumulates bits into a current byte under a moving mask and
/// pushes the byte to the output once it fills. [`finish`](BitWriter::finish)
/// flushes any partial final byte, zero-padded on the right.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    /// Completed output bytes
    bytes: Vec<u8>,
    /// The byte currently being filled
    current: u8,
    /// Mask selecting the next bit position of `current`
    mask: u8,
    /// The position of the write cursor in bits
    cursor: u64,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            current: 0,
            mask: 0x80,
            cursor: 0,
        }
    }

    /// Create an empty writer with room for `bytes` output bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current: 0,
            mask: 0x80,
            cursor: 0,
        }
    }

    /// The current bit position of the write cursor.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.current |= self.mask;
        }
        self.cursor += 1;
        if self.mask == 1 {
            self.bytes.push(self.current);
            self.current = 0;
            self.mask = 0x80;
        } else {
            self.mask >>= 1;
        }
    }

    /// Write the low `bits` bits of `value`, most significant first.
    pub fn write(&mut self, value: u32, bits: u32) {
        assert!(bits <= 32, "bit count {} exceeds 32", bits);
        let mut remaining = bits;
        while remaining > 0 {
            if self.mask == 0x80 && remaining >= 8 {
                // Byte-aligned fast path
                remaining -= 8;
                self.bytes.push((value >> remaining) as u8);
                self.cursor += 8;
            } else {
                remaining -= 1;
                self.write_bit(value >> remaining & 1 == 1);
            }
        }
    }

    /// Write the low `bits` bits of `value`, up to 64 bits wide.
    pub fn write_u64(&mut self, value: u64, bits: u32) {
        assert!(bits <= 64, "bit count {} exceeds 64", bits);
        let mut remaining = bits;
        while remaining > 0 {
            if self.mask == 0x80 && remaining >= 8 {
                remaining -= 8;
                self.bytes.push((value >> remaining) as u8);
                self.cursor += 8;
            } else {
                remaining -= 1;
                self.write_bit(value >> remaining & 1 == 1);
            }
        }
    }

    /// Write `value` with a two-tier variable width: one flag bit, then
    /// `small_bits` if the value fits in that width, otherwise `big_bits`.
    ///
    /// # Panics
    ///
    /// Panics if `small_bits >= big_bits` or `value` does not fit `big_bits`.
    pub fn write_flexible(&mut self, value: u32, small_bits: u32, big_bits: u32) {
        assert!(small_bits < big_bits, "small width must be below big width");
        assert!(
            big_bits == 32 || value < 1u32 << big_bits,
            "value {} does not fit in {} bits",
            value,
            big_bits
        );
        let is_small = value < 1u32 << small_bits;
        self.write_bit(is_small);
        if is_small {
            self.write(value, small_bits);
        } else {
            self.write(value, big_bits);
        }
    }

    /// Flush the partial final byte (zero-padded) and return the output.
    pub fn finish(mut self) -> Vec<u8> {
        if self.mask != 0x80 {
            self.bytes.push(self.current);
        }
        self.bytes
    }
}
