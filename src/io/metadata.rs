// src/io/metadata.rs

use std::fs::File;
use std::io;

use serde::Serialize;

/// Summary of one run, written as JSON next to the GFA output when requested.
#[derive(Serialize, Debug, Clone)]
pub struct RunMetadata {
    pub k: usize,
    pub thread_count: usize,
    pub vertex_count: u64,
    pub sequence_count: u64,
    pub segment_count: u64,
    pub link_count: u64,
    pub path_count: u64,
}

/// Write run metadata to a JSON file.
pub fn write_run_metadata(output: &str, metadata: &RunMetadata) -> io::Result<()> {
    let file = File::create(output)?;
    serde_json::to_writer_pretty(file, metadata)?;
    Ok(())
}
