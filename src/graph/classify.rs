// src/graph/classify.rs
//! Vertex table construction: bucket numbering and branching classification.
//!
//! One serial scan over the reference collection assigns every canonical
//! k-mer a dense bucket id in first-seen order (deterministic across runs and
//! thread counts) and accumulates, per vertex and in canonical orientation,
//! the distinct nucleotides observed entering its front and leaving its back.
//! A sequence end or placeholder boundary counts as a branching observation
//! on the affected side: a unitig can never extend through it, which is
//! exactly what the branching classes encode for the boundary oracle.

use ahash::AHashMap;

use crate::graph::extract::search_valid_kmer;
use crate::graph::state::{Dir, VertexClass, VertexState};
use crate::graph::vertex_table::VertexTable;
use crate::io::fasta::FastaRecord;
use crate::kmer::kmer::{complement, is_placeholder, Kmer};
use crate::kmer::window::KmerWindow;

/// Distinct edge labels seen on one side of a vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum SideEdge {
    #[default]
    Unobserved,
    Unique(u8),
    Multi,
}

impl SideEdge {
    /// Fold in one observation; `None` is a sequence-end or placeholder
    /// boundary and branches the side outright.
    fn observe(&mut self, base: Option<u8>) {
        *self = match (*self, base) {
            (_, None) => SideEdge::Multi,
            (SideEdge::Unobserved, Some(b)) => SideEdge::Unique(b),
            (SideEdge::Unique(seen), Some(b)) if seen == b => SideEdge::Unique(seen),
            _ => SideEdge::Multi,
        };
    }

    fn branches(self) -> bool {
        self == SideEdge::Multi
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct SideObservations {
    front: SideEdge,
    back: SideEdge,
}

impl SideObservations {
    fn vertex_class(self) -> VertexClass {
        match (self.front.branches(), self.back.branches()) {
            (true, true) => VertexClass::MultiInMultiOut,
            (true, false) => VertexClass::MultiInSingleOut,
            (false, true) => VertexClass::SingleInMultiOut,
            (false, false) => VertexClass::SingleInSingleOut,
        }
    }
}

/// Build the annotated vertex table for a reference collection.
pub fn build_vertex_table(records: &[FastaRecord], k: usize) -> VertexTable {
    let mut index: AHashMap<Kmer, u64> = AHashMap::new();
    let mut sides: Vec<SideObservations> = Vec::new();

    for record in records {
        let seq = record.sequence.as_bytes();
        if seq.len() < k {
            continue;
        }
        let last_start = seq.len() - k;

        let mut idx = 0;
        while idx <= last_start {
            idx = search_valid_kmer(seq, k, idx, last_start);
            if idx > last_start {
                break;
            }

            // Walk one placeholder-free run with a rolling window.
            let Some(mut window) = KmerWindow::new(seq, idx, k) else {
                break;
            };
            loop {
                let bucket = *index.entry(window.canonical()).or_insert_with(|| {
                    sides.push(SideObservations::default());
                    (sides.len() - 1) as u64
                });
                let side = &mut sides[bucket as usize];

                let left = (idx > 0 && !is_placeholder(seq[idx - 1])).then(|| seq[idx - 1]);
                let right =
                    (idx + k < seq.len() && !is_placeholder(seq[idx + k])).then(|| seq[idx + k]);

                // In canonical orientation, a backward occurrence swaps the
                // sides and complements the edge labels.
                match window.dir() {
                    Dir::Fwd => {
                        side.front.observe(left);
                        side.back.observe(right);
                    }
                    Dir::Bwd => {
                        side.front.observe(right.map(complement));
                        side.back.observe(left.map(complement));
                    }
                }

                if right.is_none() {
                    // End of the run; resume the search past this k-mer.
                    idx += 1;
                    break;
                }
                window.roll_to_next(seq[idx + k]);
                idx += 1;
            }
        }
    }

    let states: Vec<VertexState> = sides
        .iter()
        .map(|s| VertexState::new(s.vertex_class()))
        .collect();
    VertexTable::from_parts(k, index, states)
}
