// src/io/gfa.rs
//! GFA output: the shared append-only sink and the per-thread record buffer.
//!
//! Segment and link lines are accumulated in thread-local buffers and flushed
//! to the sink in whole-buffer chunks, so lines from different threads never
//! interleave within a record. The GFA spec imposes no global order on `S`
//! and `L` lines, and none is provided; `P` lines are written under the sink
//! lock in one piece.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::graph::state::Dir;
use crate::graph::unitig::OrientedUnitig;
use crate::kmer::kmer::complement;

const GFA_HEADER: &str = "H\tVN:Z:1.0";

/// Records buffered per thread before a flush.
pub const RECORD_FLUSH_THRESHOLD: usize = 64;

/// The single output file, shared by all workers. Writes are serialized by
/// an internal mutex; each locked write is one whole buffer or one whole
/// record, so the file never contains torn lines.
pub struct GfaSink {
    writer: Mutex<BufWriter<File>>,
}

impl GfaSink {
    /// Create (truncating) the output file and write the GFA header.
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{GFA_HEADER}")?;
        Ok(GfaSink {
            writer: Mutex::new(writer),
        })
    }

    /// Append one buffered chunk atomically.
    pub fn append(&self, chunk: &str) -> io::Result<()> {
        self.writer.lock().write_all(chunk.as_bytes())
    }

    /// Write the `P` line for one sequence. The leading segment (and the
    /// leading overlap, when a second unitig exists) are passed explicitly;
    /// the rest is streamed verbatim from the per-thread fragment files, in
    /// thread-id order. The sink lock is held for the whole line.
    pub fn write_path_line(
        &self,
        seq_index: u64,
        first: &OrientedUnitig,
        second: Option<&OrientedUnitig>,
        k: usize,
        path_fragments: &[PathBuf],
        overlap_fragments: &[PathBuf],
    ) -> io::Result<()> {
        let mut writer = self.writer.lock();

        write!(writer, "P\tP{}\t{}{}", seq_index, first.id, first.dir.sign())?;
        for fragment in path_fragments {
            copy_fragment(fragment, &mut *writer)?;
        }

        write!(writer, "\t")?;
        match second {
            // A single-unitig path carries an empty CIGAR.
            None => write!(writer, "*")?,
            Some(second) => {
                write!(writer, "{}M", first.overlap_to(second, k))?;
                for fragment in overlap_fragments {
                    copy_fragment(fragment, &mut *writer)?;
                }
            }
        }
        writeln!(writer)?;

        Ok(())
    }

    /// Flush buffered output to disk.
    pub fn finish(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

fn copy_fragment(path: &Path, writer: &mut impl Write) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    io::copy(&mut reader, writer)?;
    Ok(())
}

/// Thread-local accumulator for `S` and `L` lines, flushed to the sink every
/// [`RECORD_FLUSH_THRESHOLD`] records and once more when the worker finishes.
pub struct RecordBuffer<'a> {
    sink: &'a GfaSink,
    buf: String,
    records: usize,
    threshold: usize,
}

impl<'a> RecordBuffer<'a> {
    pub fn new(sink: &'a GfaSink) -> Self {
        Self::with_threshold(sink, RECORD_FLUSH_THRESHOLD)
    }

    pub fn with_threshold(sink: &'a GfaSink, threshold: usize) -> Self {
        RecordBuffer {
            sink,
            buf: String::new(),
            records: 0,
            threshold: threshold.max(1),
        }
    }

    /// Buffer one `S` line. The segment sequence is the unitig's slice of the
    /// reference, spelled in the orientation the unitig was emitted with.
    pub fn push_segment(
        &mut self,
        id: u64,
        seq: &[u8],
        start_kmer_idx: usize,
        end_kmer_idx: usize,
        k: usize,
        dir: Dir,
    ) -> io::Result<()> {
        let slice = &seq[start_kmer_idx..end_kmer_idx + k];

        self.buf.push_str("S\t");
        self.buf.push_str(&id.to_string());
        self.buf.push('\t');
        match dir {
            Dir::Fwd => {
                for &base in slice {
                    self.buf.push(base as char);
                }
            }
            Dir::Bwd => {
                for &base in slice.iter().rev() {
                    self.buf.push(complement(base) as char);
                }
            }
        }
        self.buf.push_str(&format!(
            "\tLN:i:{}\tKC:i:{}\n",
            end_kmer_idx - start_kmer_idx + k,
            end_kmer_idx - start_kmer_idx + 1
        ));

        self.mark_record()
    }

    /// Buffer one `L` line for two unitigs consecutive in the walk.
    pub fn push_link(
        &mut self,
        left: &OrientedUnitig,
        right: &OrientedUnitig,
        k: usize,
    ) -> io::Result<()> {
        self.buf.push_str(&format!(
            "L\t{}\t{}\t{}\t{}\t{}M\n",
            left.id,
            left.dir.sign(),
            right.id,
            right.dir.sign(),
            left.overlap_to(right, k)
        ));

        self.mark_record()
    }

    fn mark_record(&mut self) -> io::Result<()> {
        self.records += 1;
        if self.records >= self.threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Hand the buffered chunk to the sink.
    pub fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.sink.append(&self.buf)?;
            self.buf.clear();
        }
        self.records = 0;
        Ok(())
    }
}
