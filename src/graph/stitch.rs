// src/graph/stitch.rs
//! Inter-thread stitching and `P`-line assembly.
//!
//! Workers only see their own slice of a sequence, so the link between the
//! last unitig of one worker and the first unitig of the next is known to
//! neither; the stitcher emits those links after the join. It then writes the
//! sequence's `P` line: the first unitig of the whole walk (which no fragment
//! file records, every fragment entry being a link *destination*) followed by
//! the per-thread fragment files concatenated in thread-id order. The result
//! is deterministic for a given input and thread count, and in fact
//! byte-identical across thread counts.

use std::io;
use std::path::PathBuf;

use crate::graph::extract::ThreadRecords;
use crate::graph::unitig::OrientedUnitig;
use crate::io::gfa::{GfaSink, RecordBuffer};

/// Per-sequence output totals, aggregated over the workers and the stitch
/// pass itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct StitchSummary {
    pub segments: u64,
    pub links: u64,
    pub path_written: bool,
}

/// Stitch one sequence's worker records together and write its `P` line.
/// Consumes the records; fragment files are left on disk for reuse by the
/// next sequence and deleted at end of run.
pub fn stitch_sequence(
    seq_index: u64,
    mut records: Vec<ThreadRecords>,
    k: usize,
    sink: &GfaSink,
) -> io::Result<StitchSummary> {
    let mut summary = StitchSummary::default();
    for rec in &records {
        summary.segments += rec.segments_written;
        summary.links += rec.links_written;
    }

    // Link each worker's last unitig to the next worker's first one. Workers
    // whose slice was wholly absorbed by a straddling unitig have no first
    // unitig and are skipped.
    let mut buffer = RecordBuffer::new(sink);
    let mut left: Option<(OrientedUnitig, usize)> = None;
    for thread_id in 0..records.len() {
        match left {
            None => {
                if let Some(last) = records[thread_id].last {
                    left = Some((last, thread_id));
                }
            }
            Some((left_unitig, left_thread)) => {
                if let Some(first) = records[thread_id].first {
                    buffer.push_link(&left_unitig, &first, k)?;
                    summary.links += 1;
                    let overlap = left_unitig.overlap_to(&first, k);
                    // The stitched link belongs, in walk order, right after
                    // the left worker's entries.
                    records[left_thread].fragments.append_link(&first, overlap)?;

                    // A worker with a first unitig has a last one too.
                    if let Some(last) = records[thread_id].last {
                        left = Some((last, thread_id));
                    }
                }
            }
        }
    }
    buffer.flush()?;

    let (first, second) = search_first_link(&records);

    let mut path_fragments: Vec<PathBuf> = Vec::with_capacity(records.len());
    let mut overlap_fragments: Vec<PathBuf> = Vec::with_capacity(records.len());
    for rec in records {
        let (path_file, overlap_file) = rec.fragments.finish()?;
        path_fragments.push(path_file);
        overlap_fragments.push(overlap_file);
    }

    // A sequence with no valid k-mer emits no unitig and gets no P line.
    let Some(first) = first else {
        return Ok(summary);
    };

    sink.write_path_line(
        seq_index,
        &first,
        second.as_ref(),
        k,
        &path_fragments,
        &overlap_fragments,
    )?;
    summary.path_written = true;

    Ok(summary)
}

/// The first two unitigs of the sequence walk, neither of which the fragment
/// files can supply: the very first unitig heads the `P` line, and the
/// overlap between the two heads the CIGAR list.
fn search_first_link(
    records: &[ThreadRecords],
) -> (Option<OrientedUnitig>, Option<OrientedUnitig>) {
    let mut first = None;

    for rec in records {
        if let Some(f) = rec.first {
            if first.is_none() {
                first = Some(f);
            } else {
                return (first, Some(f));
            }
        }

        if let Some(s) = rec.second {
            // This worker saw two unitigs itself.
            return (first, Some(s));
        }
    }

    (first, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::state::Dir;
    use crate::io::fragment::FragmentStreams;
    use std::path::Path;

    fn unitig(id: u64, start: usize, end: usize) -> OrientedUnitig {
        OrientedUnitig { id, dir: Dir::Fwd, start_kmer_idx: start, end_kmer_idx: end }
    }

    fn records(
        first: Option<OrientedUnitig>,
        second: Option<OrientedUnitig>,
        last: Option<OrientedUnitig>,
        tag: &str,
        thread_id: usize,
    ) -> ThreadRecords {
        let dir = std::env::temp_dir();
        let pid = std::process::id();
        let path_prefix = dir.join(format!("maxtig_stitch_path_{pid}_{tag}."));
        let overlap_prefix = dir.join(format!("maxtig_stitch_ovl_{pid}_{tag}."));
        ThreadRecords {
            first,
            second,
            last,
            fragments: FragmentStreams::create(
                Path::new(&path_prefix),
                Path::new(&overlap_prefix),
                thread_id,
            )
            .unwrap(),
            segments_written: 0,
            links_written: 0,
        }
    }

    #[test]
    fn test_search_first_link_spanning_threads() {
        let a = unitig(0, 0, 2);
        let b = unitig(1, 3, 5);
        let recs = vec![
            records(Some(a), None, Some(a), "span", 0),
            records(None, None, None, "span", 1),
            records(Some(b), None, Some(b), "span", 2),
        ];
        let (first, second) = search_first_link(&recs);
        assert_eq!(first, Some(a));
        assert_eq!(second, Some(b));
    }

    #[test]
    fn test_search_first_link_within_one_thread() {
        let a = unitig(0, 0, 2);
        let b = unitig(1, 3, 5);
        let recs = vec![records(Some(a), Some(b), Some(b), "one", 0)];
        let (first, second) = search_first_link(&recs);
        assert_eq!(first, Some(a));
        assert_eq!(second, Some(b));
    }

    #[test]
    fn test_search_first_link_single_unitig() {
        let a = unitig(0, 0, 2);
        let recs = vec![
            records(None, None, None, "single", 0),
            records(Some(a), None, Some(a), "single", 1),
        ];
        let (first, second) = search_first_link(&recs);
        assert_eq!(first, Some(a));
        assert_eq!(second, None);
    }

    #[test]
    fn test_search_first_link_empty_sequence() {
        let recs = vec![records(None, None, None, "empty", 0)];
        let (first, second) = search_first_link(&recs);
        assert_eq!(first, None);
        assert_eq!(second, None);
    }
}
