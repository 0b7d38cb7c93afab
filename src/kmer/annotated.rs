// src/kmer/annotated.rs
//! K-mer windows decorated with their vertex-table annotation.
//!
//! An [`AnnotatedKmer`] pairs a sliding window with its position in the
//! sequence and the branching class looked up for its canonical form. The
//! lookup is read-only; annotation never touches the `outputted` flag.

use crate::graph::state::{Dir, VertexClass};
use crate::graph::vertex_table::VertexTable;
use crate::kmer::kmer::Kmer;
use crate::kmer::window::KmerWindow;

#[derive(Clone, Copy, Debug)]
pub struct AnnotatedKmer {
    window: KmerWindow,
    idx: usize,
    class: VertexClass,
}

impl AnnotatedKmer {
    /// Annotate the k-mer starting at `idx`. Returns `None` if the window
    /// overlaps a placeholder.
    pub fn new(seq: &[u8], idx: usize, k: usize, table: &VertexTable) -> Option<Self> {
        let window = KmerWindow::new(seq, idx, k)?;
        let class = table.vertex_class(window.canonical());
        Some(AnnotatedKmer { window, idx, class })
    }

    /// Advance one position, re-annotating against the table.
    #[inline]
    pub fn roll_to_next(&mut self, base: u8, table: &VertexTable) {
        self.window.roll_to_next(base);
        self.idx += 1;
        self.class = table.vertex_class(self.window.canonical());
    }

    #[inline]
    pub fn kmer(&self) -> Kmer {
        self.window.kmer()
    }

    #[inline]
    pub fn rev_compl(&self) -> Kmer {
        self.window.rev_compl()
    }

    #[inline]
    pub fn canonical(&self) -> Kmer {
        self.window.canonical()
    }

    #[inline]
    pub fn dir(&self) -> Dir {
        self.window.dir()
    }

    #[inline]
    pub fn idx(&self) -> usize {
        self.idx
    }

    #[inline]
    pub fn class(&self) -> VertexClass {
        self.class
    }
}
