//! Mixed string-list compression
//!
//! [`HuffmanStringListCodec`] compresses a list of strings with two codecs
//! at once: strings in the whole-string vocabulary are coded as single
//! symbols, and the rest fall back to character coding. The encoded form is
//! one continuous bitstream: the list size, a flag bit per entry marking
//! which codec carries it, the whole-string section, then the character
//! section. Decoding reassembles the list in its original order.

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, StringZipError};
use crate::huffman::character::HuffmanCharacterCodec;
use crate::huffman::codec::Directive;
use crate::huffman::string::HuffmanStringCodec;

/// Bit width of the small form of the list size field.
const SIZE_SMALL_BITS: u32 = 8;

/// Bit width of the big form of the list size field.
const SIZE_BIG_BITS: u32 = 16;

/// Largest list length the size field can carry.
const MAX_LIST_SIZE: usize = (1 << SIZE_BIG_BITS) - 1;

/// Compresses string lists with a whole-string codec where the vocabulary
/// allows and a character codec everywhere else.
#[derive(Debug, Clone)]
pub struct HuffmanStringListCodec {
    string: HuffmanStringCodec,
    character: HuffmanCharacterCodec,
}

impl HuffmanStringListCodec {
    /// Create a list codec from its two member codecs.
    pub fn new(string: HuffmanStringCodec, character: HuffmanCharacterCodec) -> Self {
        Self { string, character }
    }

    /// The whole-string member codec.
    pub fn string_codec(&self) -> &HuffmanStringCodec {
        &self.string
    }

    /// The character member codec.
    pub fn character_codec(&self) -> &HuffmanCharacterCodec {
        &self.character
    }

    /// Encode `strings` into `writer` as one continuous bitstream.
    ///
    /// Fails if the list is longer than the size field allows.
    pub fn encode_into(&self, writer: &mut BitWriter, strings: &[&str]) -> Result<()> {
        if strings.len() > MAX_LIST_SIZE {
            return Err(StringZipError::invalid_data(format!(
                "list of {} strings exceeds the limit of {}",
                strings.len(),
                MAX_LIST_SIZE
            )));
        }
        writer.write_flexible(strings.len() as u32, SIZE_SMALL_BITS, SIZE_BIG_BITS);

        // One flag bit per entry: set means the whole-string codec carries it.
        let flags: Vec<bool> = strings
            .iter()
            .map(|s| self.string.can_encode(s))
            .collect();
        for &flag in &flags {
            writer.write_bit(flag);
        }

        let in_vocabulary = strings
            .iter()
            .zip(&flags)
            .filter(|(_, &flag)| flag)
            .map(|(&s, _)| s);
        self.string.encode_into(writer, in_vocabulary)?;

        let spelled_out = strings
            .iter()
            .zip(&flags)
            .filter(|(_, &flag)| !flag)
            .map(|(&s, _)| s);
        self.character.encode_into(writer, spelled_out)?;
        Ok(())
    }

    /// Encode `strings` into a fresh bit-packed buffer.
    pub fn encode(&self, strings: &[&str]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.encode_into(&mut writer, strings)?;
        Ok(writer.finish())
    }

    /// Decode a full list from `reader`, delivering each string with its
    /// original list index to `consumer`, in index order.
    pub fn decode_from(
        &self,
        reader: &mut BitReader<'_>,
        mut consumer: impl FnMut(usize, String) -> Directive,
    ) -> Result<()> {
        let size = reader.read_flexible(SIZE_SMALL_BITS, SIZE_BIG_BITS) as usize;

        let flags: Vec<bool> = (0..size).map(|_| reader.read_bit()).collect();
        let string_indexes: Vec<usize> = (0..size).filter(|&i| flags[i]).collect();
        let character_indexes: Vec<usize> = (0..size).filter(|&i| !flags[i]).collect();

        // Both sections are decoded into place before delivery so the
        // consumer sees the list in index order.
        let mut entries: Vec<Option<String>> = vec![None; size];

        if !string_indexes.is_empty() {
            let mut decoded = 0;
            self.string.decode_from(reader, |ordinal, string| {
                entries[string_indexes[ordinal]] = Some(string);
                decoded += 1;
                if decoded == string_indexes.len() {
                    Directive::Stop
                } else {
                    Directive::Continue
                }
            })?;
            if decoded != string_indexes.len() {
                return Err(StringZipError::invalid_data(
                    "input ended inside the string section",
                ));
            }
        }

        if !character_indexes.is_empty() {
            let mut decoded = 0;
            self.character.decode_from(reader, |ordinal, string| {
                entries[character_indexes[ordinal]] = Some(string);
                decoded += 1;
                if decoded == character_indexes.len() {
                    Directive::Stop
                } else {
                    Directive::Continue
                }
            })?;
            if decoded != character_indexes.len() {
                return Err(StringZipError::invalid_data(
                    "input ended inside the character section",
                ));
            }
        }

        for (index, entry) in entries.into_iter().enumerate() {
            let string = entry.ok_or_else(|| {
                StringZipError::invalid_data(format!("list entry {} was never decoded", index))
            })?;
            if consumer(index, string) == Directive::Stop {
                break;
            }
        }
        Ok(())
    }

    /// Decode a full list from the front of `input`.
    pub fn decode_list(&self, input: &[u8]) -> Result<Vec<String>> {
        let mut strings = Vec::new();
        let mut reader = BitReader::new(input);
        self.decode_from(&mut reader, |_, string| {
            strings.push(string);
            Directive::Continue
        })?;
        Ok(strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::character::CharacterFrequencies;
    use crate::huffman::string::StringFrequencies;

    fn list_codec(vocabulary: &[&str], corpus: &[&str]) -> HuffmanStringListCodec {
        let mut strings = StringFrequencies::new();
        for text in vocabulary {
            strings.add(text);
        }
        let mut characters = CharacterFrequencies::new();
        for text in corpus {
            characters.add(text);
        }
        HuffmanStringListCodec::new(
            HuffmanStringCodec::from_frequencies(&strings, 1).unwrap(),
            HuffmanCharacterCodec::from_frequencies(&characters, 1).unwrap(),
        )
    }

    #[test]
    fn test_roundtrip_mixed_list() {
        let codec = list_codec(
            &["monday", "tuesday", "monday"],
            &["some other text entirely"],
        );
        let input = ["monday", "a holiday", "tuesday", "", "monday"];
        let encoded = codec.encode(&input).unwrap();
        assert_eq!(codec.decode_list(&encoded).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_all_in_vocabulary() {
        let codec = list_codec(&["on", "off", "on"], &["fallback"]);
        let input = ["on", "off", "off", "on"];
        let encoded = codec.encode(&input).unwrap();
        assert_eq!(codec.decode_list(&encoded).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_none_in_vocabulary() {
        let codec = list_codec(&["unused", "vocabulary"], &["plain ascii text"]);
        let input = ["exact", "strings", "spelled out"];
        let encoded = codec.encode(&input).unwrap();
        assert_eq!(codec.decode_list(&encoded).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_empty_list() {
        let codec = list_codec(&["a", "b"], &["ab"]);
        let encoded = codec.encode(&[]).unwrap();
        assert_eq!(codec.decode_list(&encoded).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_roundtrip_large_list_size_field() {
        // Past the small size form: all entries ride the string codec.
        let codec = list_codec(&["x", "y", "x"], &["xy"]);
        let input: Vec<&str> = (0..300).map(|i| if i % 2 == 0 { "x" } else { "y" }).collect();
        let encoded = codec.encode(&input).unwrap();
        assert_eq!(codec.decode_list(&encoded).unwrap(), input);
    }

    #[test]
    fn test_decode_preserves_index_order() {
        let codec = list_codec(&["known", "other", "known"], &["unknown text"]);
        let input = ["unknown", "known", "unknown", "known"];
        let encoded = codec.encode(&input).unwrap();

        let mut indexes = Vec::new();
        let mut reader = BitReader::new(&encoded);
        codec
            .decode_from(&mut reader, |index, string| {
                indexes.push((index, string));
                Directive::Continue
            })
            .unwrap();
        assert_eq!(indexes.len(), 4);
        for (expected, (index, string)) in indexes.iter().enumerate() {
            assert_eq!(*index, expected);
            assert_eq!(string, input[expected]);
        }
    }

    #[test]
    fn test_oversized_list_is_an_error() {
        let codec = list_codec(&["x", "y"], &["xy"]);
        let input = vec!["x"; MAX_LIST_SIZE + 1];
        assert!(codec.encode(&input).is_err());
    }
}
