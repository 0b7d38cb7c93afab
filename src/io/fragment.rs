// src/io/fragment.rs
//! Per-thread path and overlap fragment streams.
//!
//! Each worker streams the `P`-line tokens it discovers to a pair of small
//! temporary files instead of holding them in memory; the stitcher later
//! concatenates the files in thread-id order. Every entry names the
//! destination unitig of one link, so a fragment always begins with a comma
//! and the very first unitig of a sequence never appears in any fragment.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::graph::unitig::OrientedUnitig;

/// The open fragment streams of one worker, for one sequence.
pub struct FragmentStreams {
    path_writer: BufWriter<File>,
    overlap_writer: BufWriter<File>,
    path_file: PathBuf,
    overlap_file: PathBuf,
}

/// File name for thread `thread_id`'s fragment, under the given prefix.
pub fn fragment_file(prefix: &Path, thread_id: usize) -> PathBuf {
    PathBuf::from(format!("{}{}", prefix.display(), thread_id))
}

impl FragmentStreams {
    /// Create (truncating) the fragment pair for one worker. The same names
    /// are reused from sequence to sequence.
    pub fn create(
        path_prefix: &Path,
        overlap_prefix: &Path,
        thread_id: usize,
    ) -> io::Result<Self> {
        let path_file = fragment_file(path_prefix, thread_id);
        let overlap_file = fragment_file(overlap_prefix, thread_id);
        Ok(FragmentStreams {
            path_writer: BufWriter::new(File::create(&path_file)?),
            overlap_writer: BufWriter::new(File::create(&overlap_file)?),
            path_file,
            overlap_file,
        })
    }

    /// Record one link: the destination unitig goes to the path stream, the
    /// overlap CIGAR to the overlap stream.
    pub fn append_link(&mut self, right: &OrientedUnitig, overlap: usize) -> io::Result<()> {
        write!(self.path_writer, ",{}{}", right.id, right.dir.sign())?;
        write!(self.overlap_writer, ",{}M", overlap)?;
        Ok(())
    }

    /// Flush and close both streams, returning their file paths for
    /// concatenation.
    pub fn finish(mut self) -> io::Result<(PathBuf, PathBuf)> {
        self.path_writer.flush()?;
        self.overlap_writer.flush()?;
        Ok((self.path_file, self.overlap_file))
    }
}

/// Best-effort removal of the fragment files for threads `0..thread_count`.
/// A missing file is not an error (short sequences fall back to a single
/// worker); any other failure is reported but does not fail the run.
pub fn remove_fragment_files(path_prefix: &Path, overlap_prefix: &Path, thread_count: usize) {
    for thread_id in 0..thread_count {
        for file in [
            fragment_file(path_prefix, thread_id),
            fragment_file(overlap_prefix, thread_id),
        ] {
            if let Err(err) = fs::remove_file(&file) {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!("could not delete temporary file {}: {}", file.display(), err);
                }
            }
        }
    }
}
