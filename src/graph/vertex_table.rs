// src/graph/vertex_table.rs
//! Concurrent vertex table over the canonical k-mer set.
//!
//! Bucket ids are a dense `[0, |V|)` numbering assigned at construction; the
//! id map stands in for a minimal perfect hash function and inherits its
//! contract: lookups are only defined for k-mers that were present when the
//! table was built. Per-vertex state lives in one `AtomicU8` per bucket, and
//! the only mutation after construction is setting the `outputted` flag
//! through [`VertexTable::compare_and_set`]. Threads racing to claim the same
//! unitig are resolved by that CAS: exactly one wins, losers skip.

use std::sync::atomic::{AtomicU8, Ordering};

use ahash::AHashMap;

use crate::graph::state::{VertexState, VertexClass};
use crate::kmer::kmer::Kmer;

pub struct VertexTable {
    k: usize,
    index: AHashMap<Kmer, u64>,
    states: Vec<AtomicU8>,
}

impl VertexTable {
    /// Assemble a table from a prebuilt id map and the matching per-bucket
    /// states. `index` must map onto exactly `[0, states.len())`.
    pub fn from_parts(k: usize, index: AHashMap<Kmer, u64>, states: Vec<VertexState>) -> Self {
        debug_assert_eq!(index.len(), states.len());
        VertexTable {
            k,
            index,
            states: states.into_iter().map(|s| AtomicU8::new(s.to_byte())).collect(),
        }
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Bucket id of a canonical k-mer. Defined only for vertices present at
    /// construction time (the MPHF contract); absent keys map to an arbitrary
    /// bucket.
    #[inline]
    pub fn bucket_id(&self, canonical: Kmer) -> u64 {
        debug_assert!(self.index.contains_key(&canonical));
        self.index.get(&canonical).copied().unwrap_or_default()
    }

    /// Atomic snapshot of a vertex state.
    #[inline]
    pub fn read(&self, bucket_id: u64) -> VertexState {
        VertexState::from_byte(self.states[bucket_id as usize].load(Ordering::Acquire))
    }

    /// Store `new` iff the slot still holds `expected`.
    #[inline]
    pub fn compare_and_set(
        &self,
        bucket_id: u64,
        expected: VertexState,
        new: VertexState,
    ) -> bool {
        self.states[bucket_id as usize]
            .compare_exchange(
                expected.to_byte(),
                new.to_byte(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Claim the segment emission for a vertex. Returns `true` for exactly
    /// one caller per vertex across the whole run; a lost race or an already
    /// set flag both mean some other emission owns the segment.
    pub fn try_claim(&self, bucket_id: u64) -> bool {
        let state = self.read(bucket_id);
        if state.is_outputted() {
            return false;
        }
        self.compare_and_set(bucket_id, state, state.outputted())
    }

    /// Vertex class recorded for a canonical k-mer.
    #[inline]
    pub fn vertex_class(&self, canonical: Kmer) -> VertexClass {
        self.read(self.bucket_id(canonical)).vertex_class()
    }
}
