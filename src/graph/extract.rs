// src/graph/extract.rs
//! Per-thread maximal-unitig extraction.
//!
//! Each worker walks the k-mer starting positions in its slice
//! `[left_end, right_end]` of a reference sequence, split into maximal
//! placeholder-free runs. Within a run it slides an annotated window and
//! tracks a single bit of state, `on_unipath`: a unitig opens at a start
//! boundary and is emitted at the matching end boundary. A worker keeps
//! walking past `right_end` until the unitig it is on closes, so a unitig
//! straddling two slices is emitted whole by the left worker; the right
//! worker either opens a fresh unitig at its first start boundary or loses
//! the claim on the vertex table and emits nothing.

use std::io;

use crate::graph::boundary::{is_unipath_end, is_unipath_start};
use crate::graph::state::Dir;
use crate::graph::unitig::OrientedUnitig;
use crate::graph::vertex_table::VertexTable;
use crate::io::fragment::FragmentStreams;
use crate::io::gfa::{GfaSink, RecordBuffer};
use crate::kmer::annotated::AnnotatedKmer;
use crate::kmer::kmer::is_placeholder;

/// What one worker hands to the stitcher: the first, second, and last
/// unitigs it encountered (in walk order), its still-open fragment streams,
/// and its record counters.
pub struct ThreadRecords {
    pub first: Option<OrientedUnitig>,
    pub second: Option<OrientedUnitig>,
    pub last: Option<OrientedUnitig>,
    pub fragments: FragmentStreams,
    pub segments_written: u64,
    pub links_written: u64,
}

/// First position in `[kmer_idx, right_end]` whose k-mer window is
/// placeholder-free, or a position past `right_end` when none remains. The
/// window is scanned right to left so a placeholder skips the search past it.
pub fn search_valid_kmer(seq: &[u8], k: usize, mut kmer_idx: usize, right_end: usize) -> usize {
    while kmer_idx <= right_end {
        match (kmer_idx..kmer_idx + k)
            .rev()
            .find(|&i| is_placeholder(seq[i]))
        {
            None => return kmer_idx,
            Some(placeholder_idx) => kmer_idx = placeholder_idx + 1,
        }
    }
    kmer_idx
}

/// Walk one worker's slice, emitting every maximal unitig whose start lies in
/// `[left_end, right_end]` (modulo the claim protocol). Returns the records
/// the stitcher needs.
pub fn extract_slice(
    seq: &[u8],
    left_end: usize,
    right_end: usize,
    table: &VertexTable,
    sink: &GfaSink,
    fragments: FragmentStreams,
) -> io::Result<ThreadRecords> {
    let mut extractor = Extractor {
        k: table.k(),
        seq,
        table,
        buffer: RecordBuffer::new(sink),
        records: ThreadRecords {
            first: None,
            second: None,
            last: None,
            fragments,
            segments_written: 0,
            links_written: 0,
        },
    };

    let mut kmer_idx = left_end;
    while kmer_idx <= right_end {
        kmer_idx = search_valid_kmer(seq, extractor.k, kmer_idx, right_end);
        if kmer_idx > right_end {
            break;
        }
        // Process a maximal placeholder-free run and move past it.
        kmer_idx = extractor.process_run(kmer_idx, right_end)?;
    }

    extractor.buffer.flush()?;
    Ok(extractor.records)
}

struct Extractor<'a> {
    k: usize,
    seq: &'a [u8],
    table: &'a VertexTable,
    buffer: RecordBuffer<'a>,
    records: ThreadRecords,
}

impl<'a> Extractor<'a> {
    /// No valid k-mer starts at `idx + 1` or later within this run.
    #[inline]
    fn right_neighbor_missing(&self, idx: usize) -> bool {
        idx + self.k == self.seq.len() || is_placeholder(self.seq[idx + self.k])
    }

    /// No valid k-mer ends at `idx - 1` or earlier within this run.
    #[inline]
    fn left_neighbor_missing(&self, idx: usize) -> bool {
        idx == 0 || is_placeholder(self.seq[idx - 1])
    }

    /// Walk the placeholder-free run starting at `start_idx`, emitting each
    /// maximal unitig found. Returns the index just past the run.
    fn process_run(&mut self, start_idx: usize, right_end: usize) -> io::Result<usize> {
        let (seq, k) = (self.seq, self.k);
        let mut kmer_idx = start_idx;

        let Some(mut curr) = AnnotatedKmer::new(seq, kmer_idx, k, self.table) else {
            return Ok(kmer_idx + k);
        };

        // An isolated k-mer, valid on neither side, is a maximal unitig by
        // itself.
        if self.left_neighbor_missing(kmer_idx) && self.right_neighbor_missing(kmer_idx) {
            self.emit_unitig(&curr, &curr)?;
            return Ok(kmer_idx + k);
        }

        if self.right_neighbor_missing(kmer_idx) {
            // The run is a single k-mer with only a left neighbor; it is a
            // unitig on its own iff a boundary separates it from that
            // neighbor.
            if let Some(prev) = AnnotatedKmer::new(seq, kmer_idx - 1, k, self.table) {
                if is_unipath_start(curr.class(), curr.dir(), prev.class(), prev.dir()) {
                    self.emit_unitig(&curr, &curr)?;
                }
            }
            return Ok(kmer_idx + k);
        }

        let mut next = curr;
        next.roll_to_next(seq[kmer_idx + k], self.table);

        let mut on_unipath = false;
        let mut unipath_start = curr;

        if self.left_neighbor_missing(kmer_idx) {
            // A maximal unitig starts at the beginning of the run.
            on_unipath = true;
        } else if let Some(prev) = AnnotatedKmer::new(seq, kmer_idx - 1, k, self.table) {
            if is_unipath_start(curr.class(), curr.dir(), prev.class(), prev.dir()) {
                on_unipath = true;
            }
        }

        if on_unipath && is_unipath_end(curr.class(), curr.dir(), next.class(), next.dir()) {
            self.emit_unitig(&unipath_start, &curr)?;
            on_unipath = false;
        }

        // Slide through the rest of the run. The walk deliberately overruns
        // `right_end` while a unitig is still open.
        kmer_idx += 1;
        while on_unipath || kmer_idx <= right_end {
            let prev = curr;
            curr = next;

            if is_unipath_start(curr.class(), curr.dir(), prev.class(), prev.dir()) {
                on_unipath = true;
                unipath_start = curr;
            }

            if self.right_neighbor_missing(kmer_idx) {
                // The run ends here; so does any open unitig.
                if on_unipath {
                    self.emit_unitig(&unipath_start, &curr)?;
                }
                return Ok(kmer_idx + k);
            }

            next.roll_to_next(seq[kmer_idx + k], self.table);
            if on_unipath && is_unipath_end(curr.class(), curr.dir(), next.class(), next.dir()) {
                self.emit_unitig(&unipath_start, &curr)?;
                on_unipath = false;
            }

            kmer_idx += 1;
        }

        Ok(kmer_idx + k)
    }

    /// Emit the maximal unitig flanked by `start` and `end`: claim it on the
    /// vertex table (the winner writes the `S` line), then record the link it
    /// forms with this worker's previous unitig.
    fn emit_unitig(&mut self, start: &AnnotatedKmer, end: &AnnotatedKmer) -> io::Result<()> {
        // Racing threads may encounter the same unitig in opposite
        // orientations; the naming vertex and the claim always go through
        // the canonically smaller flanking k-mer.
        let min_flanking = start.canonical().min(end.canonical());
        let bucket_id = self.table.bucket_id(min_flanking);

        let dir = if start.kmer() < end.rev_compl() {
            Dir::Fwd
        } else {
            Dir::Bwd
        };
        let current = OrientedUnitig {
            id: bucket_id,
            dir,
            start_kmer_idx: start.idx(),
            end_kmer_idx: end.idx(),
        };

        if self.table.try_claim(bucket_id) {
            self.buffer.push_segment(
                bucket_id,
                self.seq,
                current.start_kmer_idx,
                current.end_kmer_idx,
                self.k,
                dir,
            )?;
            self.records.segments_written += 1;
        }

        if self.records.first.is_none() {
            self.records.first = Some(current);
        } else if self.records.second.is_none() {
            self.records.second = Some(current);
        }

        if let Some(prev) = self.records.last {
            self.buffer.push_link(&prev, &current, self.k)?;
            self.records.links_written += 1;
            self.records
                .fragments
                .append_link(&current, prev.overlap_to(&current, self.k))?;
        }
        self.records.last = Some(current);

        Ok(())
    }
}
