//! Generic canonical Huffman codec over arbitrary symbol types
//!
//! [`HuffmanCodec`] turns a retained [`Symbols`] set into a canonical prefix
//! code table and a decode tree. Symbols outside the table are handled by an
//! escape protocol: the escape symbol's code is emitted, followed by the raw
//! symbol in a caller-supplied out-of-band encoding ([`RawSymbolCodec`]).

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, StringZipError};
use crate::huffman::symbols::{CodedSymbol, Symbols};
use crate::huffman::tree::{assign_canonical_codes, package_merge, Code, DecodeTree};
use crate::varint::VarInt;

/// Flow control returned by a decode consumer after each symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Directive {
    /// Keep decoding
    Continue,
    /// Stop decoding and leave the reader where it is
    Stop,
}

/// A decoded symbol, marking how the stream carried it.
///
/// A sentinel-valued symbol read through the escape is data, not a marker;
/// consumers that assign meaning to in-table symbols must match on the
/// variant rather than on the value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded<S> {
    /// Decoded from the code table
    Coded(S),
    /// Carried out of band after the escape code
    Escaped(S),
}

impl<S> Decoded<S> {
    /// The symbol itself, however it was carried.
    pub fn into_value(self) -> S {
        match self {
            Decoded::Coded(symbol) | Decoded::Escaped(symbol) => symbol,
        }
    }
}

/// Out-of-band encoding for symbols that escape the code table.
///
/// The codec emits the escape code, then hands the writer to
/// [`write_raw`](RawSymbolCodec::write_raw); on decode, recognizing the
/// escape code hands the reader to [`read_raw`](RawSymbolCodec::read_raw).
/// Both sides must agree on the raw representation.
pub trait RawSymbolCodec<S> {
    /// Write `symbol` in its raw out-of-band form.
    fn write_raw(&self, writer: &mut BitWriter, symbol: &S) -> Result<()>;

    /// Read one raw out-of-band symbol.
    fn read_raw(&self, reader: &mut BitReader<'_>) -> Result<S>;
}

/// A canonical, length-limited Huffman codec.
///
/// Construction is deterministic: the same [`Symbols`] set and length limit
/// always produce bit-identical code tables, so a table persisted as
/// properties and reloaded decodes streams from the original.
#[derive(Debug, Clone)]
pub struct HuffmanCodec<S> {
    codes: AHashMap<S, Code>,
    symbols: Vec<CodedSymbol<S>>,
    tree: DecodeTree<S>,
    escape: Option<S>,
    max_code_length: u8,
}

impl<S: Clone + Eq + Hash + Ord> HuffmanCodec<S> {
    /// Build a codec from a retained symbol set, limiting codes to
    /// `max_bits` bits.
    ///
    /// Fails if fewer than two symbols are retained, if `max_bits` is outside
    /// `1..=32`, or if `max_bits` cannot accommodate the symbol count.
    pub fn from_symbols(symbols: &Symbols<S>, max_bits: u8) -> Result<Self> {
        if !(1..=32).contains(&max_bits) {
            return Err(StringZipError::configuration(format!(
                "maximum code length {} is outside 1..=32",
                max_bits
            )));
        }
        let n = symbols.len();
        if n < 2 {
            return Err(StringZipError::configuration(
                "a codec needs at least two retained symbols",
            ));
        }
        if (max_bits as u32) < 32 && n as u64 > 1u64 << max_bits {
            return Err(StringZipError::configuration(format!(
                "{} symbols cannot be coded in {} bits",
                n, max_bits
            )));
        }

        // Symbols iterates in symbol order, which fixes the tie-break for
        // both the length computation and the canonical ordering.
        let retained: Vec<CodedSymbol<S>> = symbols.iter().cloned().collect();
        let weights: Vec<u64> = retained.iter().map(|s| s.frequency()).collect();
        let lengths = package_merge(&weights, max_bits);

        // Canonical order: by length, then by symbol value.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            lengths[a]
                .cmp(&lengths[b])
                .then_with(|| retained[a].value().cmp(retained[b].value()))
        });
        let ordered_lengths: Vec<u8> = order.iter().map(|&i| lengths[i]).collect();
        let code_values = assign_canonical_codes(&ordered_lengths);

        let mut codes = AHashMap::with_capacity(n);
        let mut tree = DecodeTree::new();
        let mut max_code_length = 0;
        for (&index, &code) in order.iter().zip(code_values.iter()) {
            let symbol = retained[index].value().clone();
            tree.insert(code, symbol.clone());
            codes.insert(symbol, code);
            max_code_length = max_code_length.max(code.length());
        }

        Ok(Self {
            codes,
            symbols: retained,
            tree,
            escape: symbols.escape().cloned(),
            max_code_length,
        })
    }

    /// The code assigned to `symbol`, if it is in the table.
    pub fn code<Q>(&self, symbol: &Q) -> Option<Code>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.codes.get(symbol).copied()
    }

    /// True if `symbol` has a code of its own.
    pub fn can_encode<Q>(&self, symbol: &Q) -> bool
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.codes.contains_key(symbol)
    }

    /// The escape symbol, if the codec has one.
    pub fn escape(&self) -> Option<&S> {
        self.escape.as_ref()
    }

    /// The length in bits of the longest assigned code.
    pub fn max_code_length(&self) -> u8 {
        self.max_code_length
    }

    /// The number of coded symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if the codec has no symbols. Construction forbids this.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Encode one symbol into `writer`.
    ///
    /// A symbol without a code is escaped through `raw`; if the codec has no
    /// escape symbol that is an error and the writer is left mid-stream.
    pub fn encode_symbol(
        &self,
        writer: &mut BitWriter,
        symbol: S,
        raw: &impl RawSymbolCodec<S>,
    ) -> Result<()>
    where
        S: fmt::Debug,
    {
        if let Some(code) = self.codes.get(&symbol) {
            writer.write(code.bits(), code.length() as u32);
            Ok(())
        } else {
            self.encode_escaped(writer, &symbol, raw)
        }
    }

    /// Encode `symbol` through the escape unconditionally, even if it has a
    /// code of its own. Decoders see it as [`Decoded::Escaped`], so values
    /// that collide with in-table markers stay plain data.
    pub fn encode_escaped(
        &self,
        writer: &mut BitWriter,
        symbol: &S,
        raw: &impl RawSymbolCodec<S>,
    ) -> Result<()>
    where
        S: fmt::Debug,
    {
        let escape = self.escape.as_ref().ok_or_else(|| {
            StringZipError::invalid_data(format!(
                "symbol {:?} must be escaped but the codec has no escape",
                symbol
            ))
        })?;
        let escape_code = self.codes[escape];
        writer.write(escape_code.bits(), escape_code.length() as u32);
        raw.write_raw(writer, symbol)
    }

    /// Encode `symbols` into `writer`, escaping any symbol without a code.
    pub fn encode_into(
        &self,
        writer: &mut BitWriter,
        symbols: impl IntoIterator<Item = S>,
        raw: &impl RawSymbolCodec<S>,
    ) -> Result<()>
    where
        S: fmt::Debug,
    {
        for symbol in symbols {
            self.encode_symbol(writer, symbol, raw)?;
        }
        Ok(())
    }

    /// Decode symbols from `reader`, passing each with its ordinal to
    /// `consumer` until it returns [`Directive::Stop`] or the input is
    /// exhausted.
    ///
    /// A decoded escape code is not delivered; the raw symbol following it
    /// is read through `raw` and delivered as [`Decoded::Escaped`].
    pub fn decode_from(
        &self,
        reader: &mut BitReader<'_>,
        raw: &impl RawSymbolCodec<S>,
        mut consumer: impl FnMut(usize, Decoded<S>) -> Directive,
    ) -> Result<()> {
        let mut ordinal = 0;
        while let Some(symbol) = self.tree.decode_symbol(reader) {
            let decoded = if self.escape.as_ref() == Some(symbol) {
                Decoded::Escaped(raw.read_raw(reader)?)
            } else {
                Decoded::Coded(symbol.clone())
            };
            let directive = consumer(ordinal, decoded);
            ordinal += 1;
            if directive == Directive::Stop {
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Prefix a finished bitstream with its exact bit length as a varint.
///
/// Byte-level codec entry points use this frame so decoding stops at the
/// true end of the data instead of reading into the zero-padding of the
/// final byte.
pub(crate) fn write_framed(writer: BitWriter) -> Vec<u8> {
    let bits = writer.cursor();
    let body = writer.finish();
    let mut bytes = Vec::with_capacity(VarInt::MAX_ENCODED_LEN + body.len());
    VarInt::write_unsigned(&mut bytes, bits);
    bytes.extend_from_slice(&body);
    bytes
}

/// Open a framed bitstream, bounding the reader to the recorded bit length.
pub(crate) fn read_framed(input: &[u8]) -> Result<BitReader<'_>> {
    let (bits, header_len) = VarInt::decode_unsigned(input)?;
    let body = &input[header_len..];
    if bits > body.len() as u64 * 8 {
        return Err(StringZipError::invalid_data(format!(
            "frame claims {} bits but only {} bytes follow",
            bits,
            body.len()
        )));
    }
    Ok(BitReader::with_bit_len(body, bits))
}

impl<S: fmt::Debug + Ord> fmt::Display for HuffmanCodec<S>
where
    S: Clone + Eq + Hash,
{
    /// One line per symbol, most frequent first, showing its code and
    /// training frequency.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut by_frequency: Vec<&CodedSymbol<S>> = self.symbols.iter().collect();
        by_frequency.sort_by(|a, b| {
            b.frequency()
                .cmp(&a.frequency())
                .then_with(|| a.value().cmp(b.value()))
        });
        for (rank, symbol) in by_frequency.iter().enumerate() {
            let code = self.codes[symbol.value()];
            writeln!(
                f,
                "{}. {} -> {:?} ({})",
                rank + 1,
                code,
                symbol.value(),
                symbol.frequency()
            )?;
        }
        Ok(())
    }
}
