// src/pipeline/emit.rs
//! Per-sequence orchestration of the unitig extraction workers.
//!
//! Sequences are processed serially so `P` lines land in input order; within
//! a sequence, the valid k-mer starting positions are split into contiguous
//! equal slices, one rayon task per slice, with the last slice absorbing the
//! remainder. Sequences too short to fill every slice fall back to a single
//! worker. After the join, the stitcher links the slice boundaries together
//! and assembles the path line.

use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::graph::extract::{extract_slice, ThreadRecords};
use crate::graph::stitch::stitch_sequence;
use crate::graph::vertex_table::VertexTable;
use crate::io::fasta::FastaRecord;
use crate::io::fragment::{remove_fragment_files, FragmentStreams};
use crate::io::gfa::GfaSink;

/// Configuration for one GFA emission run.
pub struct GfaParams {
    pub k: usize,
    pub thread_count: usize,
    pub output_path: PathBuf,
    pub path_fragment_prefix: PathBuf,
    pub overlap_fragment_prefix: PathBuf,
}

impl GfaParams {
    /// Standard parameter set, with fragment files placed under `temp_dir`.
    pub fn new(k: usize, thread_count: usize, output_path: &Path, temp_dir: &Path) -> Self {
        GfaParams {
            k,
            thread_count: thread_count.max(1),
            output_path: output_path.to_path_buf(),
            path_fragment_prefix: temp_dir.join("maxtig.path."),
            overlap_fragment_prefix: temp_dir.join("maxtig.overlap."),
        }
    }
}

/// Totals for one emission run.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct GfaSummary {
    pub sequences: u64,
    pub segments: u64,
    pub links: u64,
    pub paths: u64,
}

/// Contiguous equal partition of the k-mer starting positions `[0, seq_len - k]`
/// into `(left_end, right_end)` slices, the last absorbing the remainder.
/// Falls back to a single full-range slice when there are fewer positions
/// than workers.
pub fn partition_tasks(seq_len: usize, k: usize, thread_count: usize) -> Vec<(usize, usize)> {
    let last_start = seq_len - k;
    let task_size = (last_start + 1) / thread_count;
    if task_size == 0 {
        return vec![(0, last_start)];
    }

    (0..thread_count)
        .map(|task_id| {
            let left_end = task_id * task_size;
            let right_end = if task_id == thread_count - 1 {
                last_start
            } else {
                left_end + task_size - 1
            };
            (left_end, right_end)
        })
        .collect()
}

/// Emit the maximal unitigs of every input sequence to the configured GFA
/// file: segments and links as the workers find them, one `P` line per
/// sequence after stitching.
pub fn emit_maximal_unitigs(
    records: &[FastaRecord],
    table: &VertexTable,
    params: &GfaParams,
) -> io::Result<GfaSummary> {
    let sink = GfaSink::create(&params.output_path)?;
    let mut summary = GfaSummary::default();

    for (seq_number, record) in records.iter().enumerate() {
        let seq_index = (seq_number + 1) as u64;
        let seq = record.sequence.as_bytes();

        // Nothing to process for sequences shorter than k.
        if seq.len() < params.k {
            debug!(
                "skipping sequence {} ({}): shorter than k",
                seq_index, record.header
            );
            continue;
        }
        info!(
            "processing sequence {} ({}, {} bp)",
            seq_index,
            record.header,
            seq.len()
        );
        summary.sequences += 1;

        let tasks = partition_tasks(seq.len(), params.k, params.thread_count);
        let thread_records: Vec<ThreadRecords> = tasks
            .into_par_iter()
            .enumerate()
            .map(|(thread_id, (left_end, right_end))| {
                let fragments = FragmentStreams::create(
                    &params.path_fragment_prefix,
                    &params.overlap_fragment_prefix,
                    thread_id,
                )?;
                extract_slice(seq, left_end, right_end, table, &sink, fragments)
            })
            .collect::<io::Result<Vec<_>>>()?;

        let stitched = stitch_sequence(seq_index, thread_records, params.k, &sink)?;
        summary.segments += stitched.segments;
        summary.links += stitched.links;
        if stitched.path_written {
            summary.paths += 1;
        }
    }

    sink.finish()?;
    remove_fragment_files(
        &params.path_fragment_prefix,
        &params.overlap_fragment_prefix,
        params.thread_count,
    );

    Ok(summary)
}
