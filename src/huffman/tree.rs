//! Canonical prefix-code construction and the decode tree
//!
//! Code lengths are computed with the package-merge algorithm, which produces
//! an optimal prefix code under a hard length limit, so no post-hoc
//! rebalancing pass is needed. Lengths are then canonicalized: symbols are
//! ordered by (length, symbol value) and assigned consecutive code values
//! within each length group, making the full code table a pure function of
//! the length assignment.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::BitReader;

/// A prefix code: a bit pattern and its length in bits.
///
/// The pattern occupies the low `length` bits of `bits` and is emitted most
/// significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Code {
    bits: u32,
    length: u8,
}

impl Code {
    /// Create a code from its bit pattern and length.
    pub fn new(bits: u32, length: u8) -> Self {
        debug_assert!(length >= 1 && length <= 32);
        Self { bits, length }
    }

    /// The bit pattern, right-aligned in the low `length` bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// The code length in bits.
    pub fn length(&self) -> u8 {
        self.length
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for position in (0..self.length).rev() {
            let bit = if self.bits >> position & 1 == 1 { '1' } else { '0' };
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

/// Compute optimal length-limited code lengths for the given weights.
///
/// This is the package-merge construction: leaves are repeatedly packaged in
/// pairs and merged back with the leaf list, once per permitted length, and
/// each symbol's code length is the number of times it appears in the first
/// `2n - 2` items of the final list. Weights of zero are clamped to one so
/// every symbol receives a code. The result satisfies the Kraft equality for
/// `n >= 2` and never exceeds `max_length`.
///
/// Ties are broken by symbol index, so equal inputs always produce equal
/// lengths.
///
/// # Panics
///
/// Panics if `max_length` cannot accommodate the symbol count, i.e.
/// `2^max_length < n`.
pub fn package_merge(weights: &[u64], max_length: u8) -> Vec<u8> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1];
    }
    assert!(
        max_length as u32 >= 32 || n as u64 <= 1u64 << max_length,
        "{} symbols cannot be coded in {} bits",
        n,
        max_length
    );

    // One item per leaf, ascending by (weight, index); zero weights clamped.
    let mut leaves: Vec<(u64, usize)> = weights
        .iter()
        .map(|&w| w.max(1))
        .enumerate()
        .map(|(i, w)| (w, i))
        .collect();
    leaves.sort_by_key(|&(weight, index)| (weight, index));

    // Each item carries the leaf indices it covers.
    let leaf_items: Vec<(u64, Vec<usize>)> =
        leaves.iter().map(|&(w, i)| (w, vec![i])).collect();

    let mut merged = leaf_items.clone();
    for _ in 1..max_length {
        // Package adjacent pairs of the previous level.
        let mut packages: Vec<(u64, Vec<usize>)> = Vec::with_capacity(merged.len() / 2);
        for pair in merged.chunks_exact(2) {
            let weight = pair[0].0 + pair[1].0;
            let mut covered = pair[0].1.clone();
            covered.extend_from_slice(&pair[1].1);
            packages.push((weight, covered));
        }

        // Merge packages back with the leaves, keeping ascending weight.
        // Leaves win ties so the result is stable across runs.
        let mut next = Vec::with_capacity(leaf_items.len() + packages.len());
        let mut l = leaf_items.iter().peekable();
        let mut p = packages.into_iter().peekable();
        loop {
            match (l.peek(), p.peek()) {
                (Some(leaf), Some(package)) => {
                    if leaf.0 <= package.0 {
                        next.push((*l.next().expect("peeked")).clone());
                    } else {
                        next.push(p.next().expect("peeked"));
                    }
                }
                (Some(_), None) => next.push((*l.next().expect("peeked")).clone()),
                (None, Some(_)) => next.push(p.next().expect("peeked")),
                (None, None) => break,
            }
        }
        merged = next;
    }

    // Each occurrence of a leaf among the first 2n - 2 items adds one bit to
    // that symbol's code length.
    let mut lengths = vec![0u8; n];
    for (_, covered) in merged.iter().take(2 * n - 2) {
        for &index in covered {
            lengths[index] += 1;
        }
    }
    lengths
}

/// Assign canonical code values to symbols given their code lengths.
///
/// `ordered` must be sorted by (length, symbol value). Codes within a length
/// group are consecutive, and the first code of each group is the previous
/// code plus one, shifted left by the length difference.
pub fn assign_canonical_codes(lengths: &[u8]) -> Vec<Code> {
    let mut codes = Vec::with_capacity(lengths.len());
    let mut bits = 0u32;
    let mut previous_length = 0u8;
    for &length in lengths {
        debug_assert!(length >= previous_length, "lengths must be non-decreasing");
        if previous_length == 0 {
            bits = 0;
        } else {
            bits = (bits + 1) << (length - previous_length);
        }
        codes.push(Code::new(bits, length));
        previous_length = length;
    }
    codes
}

/// A binary decode tree mapping code bit sequences back to symbols.
///
/// Built by inserting each (code, symbol) pair; prefix-free codes guarantee
/// every leaf sits at a unique path.
#[derive(Debug, Clone)]
pub enum DecodeTree<S> {
    /// No symbol on this path yet
    Empty,
    /// A decoded symbol
    Leaf(S),
    /// An interior branch on the next bit
    Internal {
        /// Subtree for a zero bit
        zero: Box<DecodeTree<S>>,
        /// Subtree for a one bit
        one: Box<DecodeTree<S>>,
    },
}

impl<S> DecodeTree<S> {
    /// Create an empty tree.
    pub fn new() -> Self {
        DecodeTree::Empty
    }

    /// Insert `symbol` at the path spelled by `code`.
    ///
    /// # Panics
    ///
    /// Panics if the path runs through or lands on an existing leaf, which
    /// can only happen if the code set is not prefix-free.
    pub fn insert(&mut self, code: Code, symbol: S) {
        let mut node = self;
        for position in (0..code.length()).rev() {
            let bit = code.bits() >> position & 1 == 1;
            if matches!(node, DecodeTree::Empty) {
                *node = DecodeTree::Internal {
                    zero: Box::new(DecodeTree::Empty),
                    one: Box::new(DecodeTree::Empty),
                };
            }
            node = match node {
                DecodeTree::Internal { zero, one } => {
                    if bit {
                        one
                    } else {
                        zero
                    }
                }
                _ => panic!("code {} is not prefix-free", code),
            };
        }
        assert!(
            matches!(node, DecodeTree::Empty),
            "code {} is not prefix-free",
            code
        );
        *node = DecodeTree::Leaf(symbol);
    }

    /// Walk the tree by reading bits until a leaf is reached.
    ///
    /// Returns `None` if the input runs out before a leaf, which marks the
    /// zero-padding tail of a bitstream.
    pub fn decode_symbol(&self, reader: &mut BitReader<'_>) -> Option<&S> {
        let mut node = self;
        loop {
            match node {
                DecodeTree::Leaf(symbol) => return Some(symbol),
                DecodeTree::Empty => return None,
                DecodeTree::Internal { zero, one } => {
                    if !reader.has_next() {
                        return None;
                    }
                    node = if reader.read_bit() { one } else { zero };
                }
            }
        }
    }
}

impl<S> Default for DecodeTree<S> {
    fn default() -> Self {
        Self::new()
    }
}
