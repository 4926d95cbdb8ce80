//! Bit-level I/O over byte buffers
//!
//! This module provides the bit cursor substrate for the Huffman codecs: a
//! [`BitReader`] that consumes a byte slice bit by bit and a [`BitWriter`]
//! that accumulates bits into a byte vector. Bits are most-significant-first
//! within each byte and multi-bit fields are packed contiguously across byte
//! boundaries with no padding, so a writer's output is bit-exact input for a
//! reader.
//!
//! Each reader or writer owns its cursor state exclusively; create one per
//! encode or decode call and discard it afterwards.

pub mod reader;
pub mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;
