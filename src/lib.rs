//! Bit-packed canonical Huffman compression for strings
//!
//! This crate compresses strings against code tables trained on a sample
//! corpus. Three codecs cover the common shapes of string data:
//!
//! - [`HuffmanCharacterCodec`] codes strings one character at a time, with
//!   an escape path that lets any Unicode string round-trip even when it
//!   contains characters the training corpus never saw.
//! - [`HuffmanStringCodec`] codes whole strings as single symbols, which
//!   wins when a small vocabulary repeats heavily.
//! - [`HuffmanStringListCodec`] compresses a list of strings with both,
//!   routing each entry to whichever codec can carry it.
//!
//! All code tables are canonical and length-limited, so the same training
//! data always yields bit-identical output, and a table persisted as
//! property text rebuilds a codec that decodes old streams exactly.
//!
//! ```
//! use stringzip::{CharacterFrequencies, HuffmanCharacterCodec};
//!
//! # fn main() -> stringzip::Result<()> {
//! let mut frequencies = CharacterFrequencies::new();
//! frequencies.add("this is a training sample");
//! frequencies.add("more training text");
//!
//! let codec = HuffmanCharacterCodec::from_frequencies(&frequencies, 1)?;
//! let encoded = codec.encode(["a training sample"])?;
//! assert_eq!(codec.decode_strings(&encoded, 1)?, vec!["a training sample"]);
//! # Ok(())
//! # }
//! ```
//!
//! The bit-level substrate ([`BitReader`], [`BitWriter`]) and the byte-level
//! varints ([`VarInt`]) are public for callers that frame their own streams.

#![warn(missing_docs)]

pub mod bits;
pub mod error;
pub mod huffman;
pub mod varint;

pub use bits::{BitReader, BitWriter};
pub use error::{Result, StringZipError};
pub use huffman::{
    CharacterEscape, CharacterFrequencies, Code, CodedSymbol, DecodeTree, Decoded, Directive,
    FrequencyMap, HuffmanCharacterCodec, HuffmanCodec, HuffmanStringCodec, HuffmanStringListCodec,
    NoEscape, RawSymbolCodec, StringFrequencies, Symbols, END_OF_STRING, ESCAPE,
    ESCAPED_CHARACTER_CEILING,
};
pub use varint::VarInt;
