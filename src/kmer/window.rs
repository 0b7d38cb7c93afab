// src/kmer/window.rs
//! Sliding k-mer window over a reference sequence.
//!
//! The window tracks both the forward k-mer and its reverse complement so a
//! one-position advance costs O(1) instead of O(k), the same trick the
//! rolling-hash iterator uses for counting. The canonical form and the
//! orientation relative to it fall out of a single integer comparison.

use crate::graph::state::Dir;
use crate::kmer::kmer::{complement, encode_base, Kmer};

/// A k-mer together with its reverse complement, positioned in a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KmerWindow {
    kmer: Kmer,
    rev_compl: Kmer,
    k: usize,
}

impl KmerWindow {
    /// Read the k bases starting at `idx`. Returns `None` if the window
    /// overlaps a placeholder or runs past the end of the sequence. Callers
    /// walking a validated run may rely on this succeeding.
    pub fn new(seq: &[u8], idx: usize, k: usize) -> Option<Self> {
        if idx + k > seq.len() {
            return None;
        }

        let kmer = Kmer::from_bytes(&seq[idx..idx + k])?;
        Some(KmerWindow {
            kmer,
            rev_compl: kmer.reverse_complement(k),
            k,
        })
    }

    /// Advance the window one position, shifting `base` in at the right.
    /// `base` must be a valid nucleotide; the scanner never rolls a window
    /// onto a placeholder.
    #[inline]
    pub fn roll_to_next(&mut self, base: u8) {
        debug_assert!(encode_base(base).is_some(), "rolled onto a placeholder");
        let code = encode_base(base).unwrap_or(0);
        self.kmer = self.kmer.append(self.k, code);
        self.rev_compl = self.rev_compl.prepend(self.k, code ^ 0b11);
    }

    /// Lexicographically smaller of the k-mer and its reverse complement.
    #[inline]
    pub fn canonical(&self) -> Kmer {
        self.kmer.min(self.rev_compl)
    }

    /// Orientation of the window relative to its canonical form.
    #[inline]
    pub fn dir(&self) -> Dir {
        if self.kmer <= self.rev_compl {
            Dir::Fwd
        } else {
            Dir::Bwd
        }
    }

    #[inline]
    pub fn kmer(&self) -> Kmer {
        self.kmer
    }

    #[inline]
    pub fn rev_compl(&self) -> Kmer {
        self.rev_compl
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }
}

/// Byte-level reverse complement of a sequence slice, used when a segment is
/// emitted in the backward orientation.
pub fn reverse_complement_bytes(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}
