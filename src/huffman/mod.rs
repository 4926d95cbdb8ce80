//! Canonical Huffman coding for symbols, characters, and strings
//!
//! The layers build on each other:
//!
//! - [`symbols`]: frequency accumulation and the retained symbol set
//! - [`tree`]: length-limited code construction and the decode tree
//! - [`codec`]: the generic [`HuffmanCodec`] with its escape protocol
//! - [`character`]: string compression one character at a time
//! - [`string`]: whole strings as single symbols
//! - [`list`]: mixed lists routed between the two string codecs

pub mod character;
pub mod codec;
pub mod list;
pub mod string;
pub mod symbols;
pub mod tree;

pub use character::{
    CharacterEscape, CharacterFrequencies, HuffmanCharacterCodec, END_OF_STRING, ESCAPE,
    ESCAPED_CHARACTER_CEILING,
};
pub use codec::{Decoded, Directive, HuffmanCodec, RawSymbolCodec};
pub use list::HuffmanStringListCodec;
pub use string::{HuffmanStringCodec, NoEscape, StringFrequencies};
pub use symbols::{CodedSymbol, FrequencyMap, Symbols};
pub use tree::{Code, DecodeTree};
