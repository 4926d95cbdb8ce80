//! Character-level string compression
//!
//! [`HuffmanCharacterCodec`] compresses strings character by character. Two
//! sentinel characters are reserved below the printable range: an
//! end-of-string marker emitted after every string, and an escape that
//! carries characters outside the trained table as raw out-of-band values.
//! Training folds all characters at or above an ASCII ceiling into the
//! escape bucket, so the code table stays small while arbitrary Unicode
//! still round-trips. Sentinel-valued characters appearing in user data ride
//! the escape as well, so they decode as data rather than as markers.

use std::mem;

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, StringZipError};
use crate::huffman::codec::{
    read_framed, write_framed, Decoded, Directive, HuffmanCodec, RawSymbolCodec,
};
use crate::huffman::symbols::{FrequencyMap, Symbols};

/// Sentinel terminating every encoded string.
pub const END_OF_STRING: char = '\u{0}';

/// Sentinel prefixing a raw out-of-band character.
pub const ESCAPE: char = '\u{1}';

/// Characters at or above this code point are never given codes of their
/// own; they train and encode through the escape.
pub const ESCAPED_CHARACTER_CEILING: u32 = 128;

/// Code points below this are the reserved sentinels; in user data they are
/// forced through the escape.
const SENTINEL_CEILING: u32 = 2;

/// Bit width of the small form of a raw escaped character.
const RAW_SMALL_BITS: u32 = 8;

/// Bit width of the big form, wide enough for any Unicode scalar value.
const RAW_BIG_BITS: u32 = 21;

/// Raw out-of-band form of an escaped character: a flexible-width code
/// point, 8 bits for Latin-1 and 21 bits for the rest of Unicode.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterEscape;

impl RawSymbolCodec<char> for CharacterEscape {
    fn write_raw(&self, writer: &mut BitWriter, symbol: &char) -> Result<()> {
        writer.write_flexible(*symbol as u32, RAW_SMALL_BITS, RAW_BIG_BITS);
        Ok(())
    }

    fn read_raw(&self, reader: &mut BitReader<'_>) -> Result<char> {
        let value = reader.read_flexible(RAW_SMALL_BITS, RAW_BIG_BITS);
        char::from_u32(value).ok_or_else(|| {
            StringZipError::invalid_data(format!("escaped value {:#x} is not a character", value))
        })
    }
}

/// Character occurrence counts accumulated from training strings.
#[derive(Debug, Clone, Default)]
pub struct CharacterFrequencies {
    counts: FrequencyMap<char>,
}

impl CharacterFrequencies {
    /// Create an empty set of counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the characters of `text`, plus one end-of-string.
    ///
    /// Characters at or above [`ESCAPED_CHARACTER_CEILING`], and the
    /// sentinel-valued characters below it, count toward the escape instead
    /// of themselves, matching how encoding will carry them.
    pub fn add(&mut self, text: &str) {
        for ch in text.chars() {
            let point = ch as u32;
            if point >= SENTINEL_CEILING && point < ESCAPED_CHARACTER_CEILING {
                self.counts.add(ch);
            } else {
                self.counts.add(ESCAPE);
            }
        }
        self.counts.add(END_OF_STRING);
    }

    /// The count recorded for `ch`.
    pub fn count(&self, ch: char) -> u64 {
        self.counts.count(&ch)
    }

    /// The number of distinct characters that would be escaped under
    /// `min_occurrences`.
    pub fn escaped_count(&self, min_occurrences: u64) -> usize {
        self.counts.escaped_count(min_occurrences)
    }

    /// The retained symbol set under `min_occurrences`.
    ///
    /// The end-of-string sentinel is always retained: its count is raised to
    /// the threshold so training corpora with few strings cannot fold it
    /// away. The escape is always retained by construction.
    pub fn symbols(&self, min_occurrences: u64) -> Result<Symbols<char>> {
        let mut counts = self.counts.clone();
        let end_count = counts.count(&END_OF_STRING);
        if end_count < min_occurrences {
            counts.add_count(END_OF_STRING, min_occurrences - end_count);
        }
        Symbols::new(&counts, Some(ESCAPE), min_occurrences)
    }
}

/// A Huffman codec for strings, coding one character at a time.
#[derive(Debug, Clone)]
pub struct HuffmanCharacterCodec {
    symbols: Symbols<char>,
    codec: HuffmanCodec<char>,
}

impl HuffmanCharacterCodec {
    /// Default limit on code lengths.
    pub const DEFAULT_MAX_CODE_LENGTH: u8 = 16;

    /// Build a codec from a retained character set, with codes limited to
    /// `max_bits`. The set must include the end-of-string sentinel; without
    /// it, encoded strings could never be delimited.
    pub fn from_symbols(symbols: Symbols<char>, max_bits: u8) -> Result<Self> {
        let codec = HuffmanCodec::from_symbols(&symbols, max_bits)?;
        if !codec.can_encode(&END_OF_STRING) {
            return Err(StringZipError::configuration(
                "character table must include the end-of-string sentinel",
            ));
        }
        Ok(Self { symbols, codec })
    }

    /// Build a codec from training counts under `min_occurrences`, with the
    /// default code length limit.
    pub fn from_frequencies(
        frequencies: &CharacterFrequencies,
        min_occurrences: u64,
    ) -> Result<Self> {
        Self::from_symbols(
            frequencies.symbols(min_occurrences)?,
            Self::DEFAULT_MAX_CODE_LENGTH,
        )
    }

    /// Load a codec from property text written by
    /// [`as_properties`](HuffmanCharacterCodec::as_properties).
    pub fn from_properties(text: &str) -> Result<Self> {
        let symbols = Symbols::from_properties(text, Some(ESCAPE), |key| {
            let raw = key.strip_prefix("0x").ok_or_else(|| {
                StringZipError::invalid_data(format!("character key {:?} is not hex", key))
            })?;
            let value = u32::from_str_radix(raw, 16).map_err(|_| {
                StringZipError::invalid_data(format!("character key {:?} is not hex", key))
            })?;
            char::from_u32(value).ok_or_else(|| {
                StringZipError::invalid_data(format!("{:#x} is not a character", value))
            })
        })?;
        Self::from_symbols(symbols, Self::DEFAULT_MAX_CODE_LENGTH)
    }

    /// Render the trained character frequencies as property text, keys in
    /// `0x41` hex form, from which
    /// [`from_properties`](HuffmanCharacterCodec::from_properties) rebuilds
    /// the identical codec.
    pub fn as_properties(&self) -> String {
        self.symbols
            .to_properties(|ch| format!("{:#04x}", *ch as u32))
    }

    /// The underlying symbol-level codec.
    pub fn codec(&self) -> &HuffmanCodec<char> {
        &self.codec
    }

    /// True for any string: characters without a code go through the escape.
    pub fn can_encode(&self, _text: &str) -> bool {
        true
    }

    /// Encode the given strings into a fresh framed buffer: the exact bit
    /// length as a varint, then the bitstream with each string followed by
    /// an end-of-string sentinel. The frame lets
    /// [`decode`](HuffmanCharacterCodec::decode) stop at the true end of the
    /// data instead of reading into the final byte's zero padding.
    pub fn encode<I>(&self, strings: I) -> Result<Vec<u8>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut writer = BitWriter::new();
        self.encode_into(&mut writer, strings)?;
        Ok(write_framed(writer))
    }

    /// Encode the given strings into `writer` as a raw bitstream, without
    /// the frame or flushing. Callers framing their own streams must record
    /// the bit count themselves to decode reliably.
    pub fn encode_into<I>(&self, writer: &mut BitWriter, strings: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for string in strings {
            for ch in string.as_ref().chars() {
                if (ch as u32) < SENTINEL_CEILING {
                    // Sentinel-valued data must never collide with the
                    // markers; it rides the escape verbatim.
                    self.codec.encode_escaped(writer, &ch, &CharacterEscape)?;
                } else {
                    self.codec.encode_symbol(writer, ch, &CharacterEscape)?;
                }
            }
            self.codec
                .encode_symbol(writer, END_OF_STRING, &CharacterEscape)?;
        }
        Ok(())
    }

    /// Decode strings from a framed buffer written by
    /// [`encode`](HuffmanCharacterCodec::encode), delivering each with its
    /// ordinal to `consumer` until it stops or the data ends.
    pub fn decode(
        &self,
        input: &[u8],
        consumer: impl FnMut(usize, String) -> Directive,
    ) -> Result<()> {
        let mut reader = read_framed(input)?;
        self.decode_from(&mut reader, consumer)
    }

    /// Decode strings from `reader`, delivering each completed string with
    /// its ordinal to `consumer` until it stops or the input runs out.
    pub fn decode_from(
        &self,
        reader: &mut BitReader<'_>,
        mut consumer: impl FnMut(usize, String) -> Directive,
    ) -> Result<()> {
        let mut buffer = String::new();
        let mut ordinal = 0;
        // Only a table-decoded end-of-string delimits; an escaped character
        // of the same value is data.
        self.codec.decode_from(reader, &CharacterEscape, |_, decoded| {
            match decoded {
                Decoded::Coded(END_OF_STRING) => {
                    let directive = consumer(ordinal, mem::take(&mut buffer));
                    ordinal += 1;
                    directive
                }
                Decoded::Coded(ch) | Decoded::Escaped(ch) => {
                    buffer.push(ch);
                    Directive::Continue
                }
            }
        })
    }

    /// Decode exactly `count` strings from a framed buffer written by
    /// [`encode`](HuffmanCharacterCodec::encode).
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

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(corpus: &[&str], min_occurrences: u64) -> HuffmanCharacterCodec {
        let mut frequencies = CharacterFrequencies::new();
        for text in corpus {
            frequencies.add(text);
        }
        HuffmanCharacterCodec::from_frequencies(&frequencies, min_occurrences).unwrap()
    }

    #[test]
    fn test_training_counts_characters_and_sentinels() {
        let mut frequencies = CharacterFrequencies::new();
        frequencies.add("aaab");
        assert_eq!(frequencies.count('a'), 3);
        assert_eq!(frequencies.count('b'), 1);
        assert_eq!(frequencies.count(END_OF_STRING), 1);
    }

    #[test]
    fn test_training_folds_high_characters_into_escape() {
        let mut frequencies = CharacterFrequencies::new();
        frequencies.add("a\u{12c}\u{12c}");
        assert_eq!(frequencies.count(ESCAPE), 2);
        assert_eq!(frequencies.count('\u{12c}'), 0);
    }

    #[test]
    fn test_training_folds_sentinel_characters_into_escape() {
        // Sentinel values in training text count as escapes; only the
        // per-string marker counts toward end-of-string.
        let mut frequencies = CharacterFrequencies::new();
        frequencies.add("\u{0}a\u{1}");
        assert_eq!(frequencies.count(ESCAPE), 2);
        assert_eq!(frequencies.count(END_OF_STRING), 1);
        assert_eq!(frequencies.count('a'), 1);
    }

    #[test]
    fn test_sentinel_characters_roundtrip_as_data() {
        let codec = trained(&["ab"], 1);
        let input = vec!["a\u{0}b", "\u{1}", "\u{0}"];
        let encoded = codec.encode(&input).unwrap();
        assert_eq!(codec.decode_strings(&encoded, 3).unwrap(), input);
    }

    #[test]
    fn test_decode_stops_at_stream_end_without_count() {
        // Mostly empty training strings put the all-zeros code on
        // end-of-string; the final byte's padding must not decode as
        // spurious empty strings.
        let codec = trained(&["", "", "", "", "ab"], 1);
        assert_eq!(codec.codec().code(&END_OF_STRING).unwrap().bits(), 0);

        let encoded = codec.encode(["a"]).unwrap();
        let mut decoded = Vec::new();
        codec
            .decode(&encoded, |_, string| {
                decoded.push(string);
                Directive::Continue
            })
            .unwrap();
        assert_eq!(decoded, vec!["a"]);
    }

    #[test]
    fn test_decode_stops_before_padding_when_escape_holds_the_zero_code() {
        // A heavily escaped corpus puts the all-zeros code on the escape;
        // decoding the padding would start a raw read past the end of input.
        let codec = trained(&["\u{20ac}\u{20ac}\u{20ac}\u{20ac}\u{20ac}\u{20ac}\u{20ac}\u{20ac}a"], 1);
        assert_eq!(codec.codec().code(&ESCAPE).unwrap().bits(), 0);

        let encoded = codec.encode(["a"]).unwrap();
        let mut decoded = Vec::new();
        codec
            .decode(&encoded, |_, string| {
                decoded.push(string);
                Directive::Continue
            })
            .unwrap();
        assert_eq!(decoded, vec!["a"]);
    }

    #[test]
    fn test_table_without_end_of_string_is_rejected() {
        let mut map = FrequencyMap::new();
        map.add_count('a', 3);
        map.add_count('b', 1);
        let symbols = Symbols::new(&map, Some(ESCAPE), 0).unwrap();
        assert!(HuffmanCharacterCodec::from_symbols(symbols, 16).is_err());
    }

    #[test]
    fn test_most_frequent_character_gets_shortest_code() {
        let codec = trained(&["aaab"], 1);
        let a = codec.codec().code(&'a').unwrap();
        let b = codec.codec().code(&'b').unwrap();
        assert!(a.length() <= b.length());
        assert_eq!(a.length(), 1);
    }

    #[test]
    fn test_roundtrip_trained_strings() {
        let codec = trained(&["the quick brown fox", "jumps over the lazy dog"], 1);
        let input = vec!["the fox", "lazy dog", ""];
        let encoded = codec.encode(&input).unwrap();
        assert_eq!(codec.decode_strings(&encoded, 3).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_unicode_through_escape() {
        // U+012C never gets a code of its own; it must survive the raw path.
        let codec = trained(&["abc"], 1);
        let input = vec!["a\u{12c}c", "\u{1f600}"];
        let encoded = codec.encode(&input).unwrap();
        assert_eq!(codec.decode_strings(&encoded, 2).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_untrained_ascii_through_escape() {
        let codec = trained(&["aaaa", "bbbb"], 2);
        let input = vec!["azb"];
        let encoded = codec.encode(&input).unwrap();
        assert_eq!(codec.decode_strings(&encoded, 1).unwrap(), input);
    }

    #[test]
    fn test_end_of_string_survives_small_corpora() {
        // One training string, high threshold: the sentinel still codes.
        let codec = trained(&["aaaaaaaaaa"], 5);
        assert!(codec.codec().can_encode(&END_OF_STRING));
    }

    #[test]
    fn test_decode_strings_requires_enough_input() {
        let codec = trained(&["hello"], 1);
        let encoded = codec.encode(["hello"]).unwrap();
        assert!(codec.decode_strings(&encoded, 2).is_err());
    }

    #[test]
    fn test_properties_roundtrip_reproduces_codes() {
        let codec = trained(&["a bag of words", "another bag"], 1);
        let text = codec.as_properties();
        let reloaded = HuffmanCharacterCodec::from_properties(&text).unwrap();

        for ch in "abgof ".chars() {
            assert_eq!(codec.codec().code(&ch), reloaded.codec().code(&ch));
        }

        let encoded = codec.encode(["a bag"]).unwrap();
        assert_eq!(reloaded.decode_strings(&encoded, 1).unwrap(), vec!["a bag"]);
    }

    #[test]
    fn test_decode_from_delivers_ordinals() {
        let codec = trained(&["ab"], 1);
        let encoded = codec.encode(["a", "b", "ab"]).unwrap();
        let mut seen = Vec::new();
        codec
            .decode(&encoded, |ordinal, string| {
                seen.push((ordinal, string));
                Directive::Continue
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (0, "a".to_string()),
                (1, "b".to_string()),
                (2, "ab".to_string())
            ]
        );
    }
}
