//! Whole-string compression
//!
//! [`HuffmanStringCodec`] treats each entire string as one symbol, which
//! compresses far better than character coding when a modest vocabulary of
//! strings repeats heavily. There is no escape: a string outside the trained
//! vocabulary simply cannot be encoded, and callers check
//! [`can_encode`](HuffmanStringCodec::can_encode) first or fall back to a
//! character codec (see [`HuffmanStringListCodec`](crate::huffman::list)).

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, StringZipError};
use crate::huffman::codec::{
    read_framed, write_framed, Directive, HuffmanCodec, RawSymbolCodec,
};
use crate::huffman::symbols::{FrequencyMap, Symbols};

/// Raw codec for symbol sets with no escape; both directions are errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEscape;

impl RawSymbolCodec<String> for NoEscape {
    fn write_raw(&self, _writer: &mut BitWriter, symbol: &String) -> Result<()> {
        Err(StringZipError::invalid_data(format!(
            "string {:?} is not in the vocabulary",
            symbol
        )))
    }

    fn read_raw(&self, _reader: &mut BitReader<'_>) -> Result<String> {
        Err(StringZipError::invalid_data(
            "escape code in a stream with no escape",
        ))
    }
}

/// String occurrence counts accumulated from a training corpus.
#[derive(Debug, Clone, Default)]
pub struct StringFrequencies {
    counts: FrequencyMap<String>,
}

impl StringFrequencies {
    /// Create an empty set of counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `text`.
    pub fn add(&mut self, text: &str) {
        self.counts.add(text.to_owned());
    }

    /// The count recorded for `text`.
    pub fn count(&self, text: &str) -> u64 {
        self.counts.count(text)
    }

    /// The number of distinct strings counted.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no strings have been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The vocabulary retained under `min_occurrences`. Strings below the
    /// threshold are simply dropped; there is no escape to fold them into.
    pub fn symbols(&self, min_occurrences: u64) -> Result<Symbols<String>> {
        Symbols::new(&self.counts, None, min_occurrences)
    }
}

/// A Huffman codec over whole strings.
#[derive(Debug, Clone)]
pub struct HuffmanStringCodec {
    symbols: Symbols<String>,
    codec: HuffmanCodec<String>,
}

impl HuffmanStringCodec {
    /// Default limit on code lengths.
    pub const DEFAULT_MAX_CODE_LENGTH: u8 = 24;

    /// Build a codec from a retained vocabulary, with codes limited to
    /// `max_bits`.
    pub fn from_symbols(symbols: Symbols<String>, max_bits: u8) -> Result<Self> {
        let codec = HuffmanCodec::from_symbols(&symbols, max_bits)?;
        Ok(Self { symbols, codec })
    }

    /// Build a codec from training counts under `min_occurrences`, with the
    /// default code length limit.
    pub fn from_frequencies(
        frequencies: &StringFrequencies,
        min_occurrences: u64,
    ) -> Result<Self> {
        Self::from_symbols(
            frequencies.symbols(min_occurrences)?,
            Self::DEFAULT_MAX_CODE_LENGTH,
        )
    }

    /// Load a codec from property text written by
    /// [`as_properties`](HuffmanStringCodec::as_properties).
    pub fn from_properties(text: &str) -> Result<Self> {
        let symbols = Symbols::from_properties(text, None, |key| Ok(key.to_owned()))?;
        Self::from_symbols(symbols, Self::DEFAULT_MAX_CODE_LENGTH)
    }

    /// Render the vocabulary and its frequencies as property text. String
    /// keys are stored verbatim, so strings containing `=` or leading and
    /// trailing whitespace cannot be persisted this way.
    pub fn as_properties(&self) -> String {
        self.symbols.to_properties(|s| s.clone())
    }

    /// The underlying symbol-level codec.
    pub fn codec(&self) -> &HuffmanCodec<String> {
        &self.codec
    }

    /// True if `text` is in the vocabulary.
    pub fn can_encode(&self, text: &str) -> bool {
        self.codec.can_encode(text)
    }

    /// Encode the given strings into `writer`. A string outside the
    /// vocabulary is an error.
    pub fn encode_into<'a>(
        &self,
        writer: &mut BitWriter,
        strings: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        for string in strings {
            match self.codec.code(string) {
                Some(code) => writer.write(code.bits(), code.length() as u32),
                None => {
                    return Err(StringZipError::invalid_data(format!(
                        "string {:?} is not in the vocabulary",
                        string
                    )))
                }
            }
        }
        Ok(())
    }

    /// Encode the given strings into a fresh framed buffer: the exact bit
    /// length as a varint, then the bitstream.
    pub fn encode<'a>(&self, strings: impl IntoIterator<Item = &'a str>) -> Result<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.encode_into(&mut writer, strings)?;
        Ok(write_framed(writer))
    }

    /// Decode strings from `reader`, delivering each with its ordinal to
    /// `consumer` until it stops or the input runs out.
    pub fn decode_from(
        &self,
        reader: &mut BitReader<'_>,
        mut consumer: impl FnMut(usize, String) -> Directive,
    ) -> Result<()> {
        self.codec.decode_from(reader, &NoEscape, |ordinal, string| {
            consumer(ordinal, string.into_value())
        })
    }

    /// Decode exactly `count` strings from a framed buffer written by
    /// [`encode`](HuffmanStringCodec::encode).
    pub fn decode_strings(&self, input: &[u8], count: usize) -> Result<Vec<String>> {
        let mut strings = Vec::with_capacity(count);
        let mut reader = read_framed(input)?;
        self.decode_from(&mut reader, |_, string| {
            strings.push(string);
            if strings.len() == count {
                Directive::Stop
            } else {
                Directive::Continue
            }
        })?;
        if strings.len() != count {
            return Err(StringZipError::invalid_data(format!(
                "input ended after {} of {} strings",
                strings.len(),
                count
            )));
        }
        Ok(strings)
    }
}
