//! Symbol frequency tables and retained-symbol sets
//!
//! A [`FrequencyMap`] accumulates occurrence counts per symbol across a
//! training corpus. [`Symbols`] is the immutable retained view derived from
//! it: symbols that met a minimum-occurrence threshold, plus an optional
//! escape symbol that absorbs the counts of everything folded away. A
//! [`Symbols`] set is the sole input to codec construction, and can be
//! serialized to a flat property map (`key = frequency` lines) and reloaded
//! to reproduce the identical canonical code table.

use std::borrow::Borrow;
use std::hash::Hash;

use ahash::AHashMap;

use crate::error::{Result, StringZipError};

/// Occurrence counts per symbol, accumulated over a training corpus.
#[derive(Debug, Clone)]
pub struct FrequencyMap<S> {
    counts: AHashMap<S, u64>,
}

impl<S> Default for FrequencyMap<S> {
    fn default() -> Self {
        Self {
            counts: AHashMap::new(),
        }
    }
}

impl<S: Clone + Eq + Hash> FrequencyMap<S> {
    /// Create an empty frequency map.
    pub fn new() -> Self {
        Self {
            counts: AHashMap::new(),
        }
    }

    /// Increment the count of `symbol` by one.
    pub fn add(&mut self, symbol: S) {
        *self.counts.entry(symbol).or_insert(0) += 1;
    }

    /// Increment the count of `symbol` by `count`.
    pub fn add_count(&mut self, symbol: S, count: u64) {
        *self.counts.entry(symbol).or_insert(0) += count;
    }

    /// The count recorded for `symbol`, zero if absent. Accepts any borrowed
    /// form of the symbol, so string maps can be queried with `&str`.
    pub fn count<Q>(&self, symbol: &Q) -> u64
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    /// The number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no symbol has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The number of distinct symbols whose count falls below
    /// `min_occurrences`, i.e. how many would be escaped under that
    /// threshold. Useful for tuning compression against table size.
    pub fn escaped_count(&self, min_occurrences: u64) -> usize {
        self.counts.values().filter(|&&n| n < min_occurrences).count()
    }

    /// Iterate over (symbol, count) pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, u64)> {
        self.counts.iter().map(|(s, &n)| (s, n))
    }
}

/// A symbol retained for coding, together with its training frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedSymbol<S> {
    value: S,
    frequency: u64,
}

impl<S> CodedSymbol<S> {
    /// The symbol value.
    pub fn value(&self) -> &S {
        &self.value
    }

    /// The symbol's training-time frequency.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }
}

/// The immutable retained-symbol view a codec is built from.
///
/// Constructed from a [`FrequencyMap`], an optional escape symbol, and a
/// minimum-occurrence threshold. Symbols below the threshold are dropped and
/// their counts folded into the escape symbol's bucket; the escape symbol
/// itself is always retained. Every symbol that can appear in input is thus
/// represented, either directly or through the escape.
#[derive(Debug, Clone)]
pub struct Symbols<S> {
    retained: Vec<CodedSymbol<S>>,
    escape: Option<S>,
}

impl<S: Clone + Eq + Hash + Ord> Symbols<S> {
    /// Build the retained view of `frequencies` under `min_occurrences`,
    /// folding dropped symbols into `escape` when one is configured.
    ///
    /// Fails if nothing would be retained.
    pub fn new(
        frequencies: &FrequencyMap<S>,
        escape: Option<S>,
        min_occurrences: u64,
    ) -> Result<Self> {
        let mut retained = Vec::new();
        let mut folded = 0u64;
        let mut escape_frequency = 0u64;

        for (symbol, count) in frequencies.iter() {
            if escape.as_ref() == Some(symbol) {
                escape_frequency = count;
            } else if count >= min_occurrences {
                retained.push(CodedSymbol {
                    value: symbol.clone(),
                    frequency: count,
                });
            } else {
                folded += count;
            }
        }

        if let Some(escape) = &escape {
            retained.push(CodedSymbol {
                value: escape.clone(),
                frequency: escape_frequency + folded,
            });
        }

        if retained.is_empty() {
            return Err(StringZipError::configuration(
                "no symbols retained: frequency table is empty or threshold too high",
            ));
        }

        // Deterministic order regardless of hash-map iteration
        retained.sort_by(|a, b| a.value.cmp(&b.value));
        Ok(Self { retained, escape })
    }

    /// The escape symbol, if one is configured.
    pub fn escape(&self) -> Option<&S> {
        self.escape.as_ref()
    }

    /// The number of retained symbols (including the escape).
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    /// True if no symbols are retained. Construction forbids this, so this
    /// only exists to pair with [`len`](Symbols::len).
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Iterate over the retained symbols in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &CodedSymbol<S>> {
        self.retained.iter()
    }

    /// Render this symbol set as a flat property map, one `key = frequency`
    /// line per retained symbol, keys produced by `render`. Keys containing
    /// `=` are a caller error and panic.
    pub fn to_properties(&self, render: impl Fn(&S) -> String) -> String {
        let mut text = String::new();
        for symbol in &self.retained {
            let key = render(&symbol.value);
            assert!(!key.contains('='), "property key {:?} contains '='", key);
            text.push_str(&key);
            text.push_str(" = ");
            text.push_str(&symbol.frequency.to_string());
            text.push('\n');
        }
        text
    }

    /// Load a symbol set from flat property text written by
    /// [`to_properties`](Symbols::to_properties). Lines starting with `#`
    /// and blank lines are ignored; `parse` turns each key back into a
    /// symbol. All parsed symbols are retained (threshold zero), so loading
    /// reproduces the exact table that was saved.
    pub fn from_properties(
        text: &str,
        escape: Option<S>,
        parse: impl Fn(&str) -> Result<S>,
    ) -> Result<Self> {
        let mut frequencies = FrequencyMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                StringZipError::invalid_data(format!("property line missing '=': {:?}", line))
            })?;
            let symbol = parse(key.trim())?;
            let count = value.trim().parse::<u64>().map_err(|_| {
                StringZipError::invalid_data(format!("invalid frequency: {:?}", value.trim()))
            })?;
            frequencies.add_count(symbol, count);
        }
        Self::new(&frequencies, escape, 0)
    }
}
