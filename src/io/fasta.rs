// src/io/fasta.rs
//! Streaming FASTA input with transparent gzip support.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use flate2::read::MultiGzDecoder;

/// One reference sequence. The sequence is uppercased on read; any byte
/// outside `{A,C,G,T}` is treated as a placeholder downstream.
#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub header: String,
    pub sequence: String,
}

/// Open a FASTA file for reading, handling gzipped files automatically.
pub fn open_fasta(path: &str) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.ends_with(".gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Stream FASTA records without loading the whole file first. Sequences may
/// span multiple lines; the record header is the first whitespace-delimited
/// token after `>`.
pub fn stream_fasta_records<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = io::Result<FastaRecord>> {
    FastaStreamParser {
        lines: reader.lines(),
        pending_header: None,
    }
}

/// Iterator adaptor for streaming FASTA parsing.
pub struct FastaStreamParser<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    lines: I,
    pending_header: Option<String>,
}

fn header_of(line: &str) -> String {
    line[1..]
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

impl<I> Iterator for FastaStreamParser<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = match self.pending_header.take() {
            Some(header) => header,
            None => loop {
                match self.lines.next()? {
                    Ok(line) if line.starts_with('>') => break header_of(&line),
                    // Skip anything before the first record.
                    Ok(_) => continue,
                    Err(err) => return Some(Err(err)),
                }
            },
        };

        let mut sequence = String::new();
        loop {
            match self.lines.next() {
                None => break,
                Some(Err(err)) => return Some(Err(err)),
                Some(Ok(line)) => {
                    if line.starts_with('>') {
                        self.pending_header = Some(header_of(&line));
                        break;
                    }
                    sequence.push_str(line.trim().to_ascii_uppercase().as_str());
                }
            }
        }

        Some(Ok(FastaRecord { header, sequence }))
    }
}
