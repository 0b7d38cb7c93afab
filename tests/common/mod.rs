// Shared harness for the end-to-end GFA tests: run the pipeline on in-memory
// sequences, parse the emitted GFA back, and rebuild sequences from path
// lines.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use maxtig::graph::classify::build_vertex_table;
use maxtig::io::fasta::FastaRecord;
use maxtig::pipeline::emit::{emit_maximal_unitigs, GfaParams, GfaSummary};

#[derive(Debug, Clone)]
pub struct Segment {
    pub seq: String,
    pub ln: usize,
    pub kc: usize,
}

#[derive(Debug, Clone)]
pub struct PathLine {
    pub name: String,
    pub segments: Vec<(u64, char)>,
    pub overlaps: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Gfa {
    pub segments: HashMap<u64, Segment>,
    pub links: Vec<String>,
    pub paths: Vec<PathLine>,
}

fn temp_workspace(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("maxtig_it_{}_{}", std::process::id(), tag));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Build a fresh vertex table and run the full emission pipeline on `seqs`,
/// returning the parsed GFA and the run summary.
pub fn run_pipeline(tag: &str, seqs: &[&str], k: usize, threads: usize) -> (Gfa, GfaSummary) {
    let records: Vec<FastaRecord> = seqs
        .iter()
        .enumerate()
        .map(|(i, s)| FastaRecord {
            header: format!("seq{}", i + 1),
            sequence: s.to_string(),
        })
        .collect();

    let workspace = temp_workspace(tag);
    let output = workspace.join("out.gfa");
    let table = build_vertex_table(&records, k);
    let params = GfaParams::new(k, threads, &output, &workspace);
    let summary = emit_maximal_unitigs(&records, &table, &params).unwrap();

    let gfa = parse_gfa(&fs::read_to_string(&output).unwrap());
    fs::remove_dir_all(&workspace).ok();
    (gfa, summary)
}

pub fn parse_gfa(text: &str) -> Gfa {
    let mut gfa = Gfa::default();
    let mut saw_header = false;

    for line in text.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields[0] {
            "H" => saw_header = true,
            "S" => {
                let id: u64 = fields[1].parse().unwrap();
                let seq = fields[2].to_string();
                let ln: usize = fields[3].strip_prefix("LN:i:").unwrap().parse().unwrap();
                let kc: usize = fields[4].strip_prefix("KC:i:").unwrap().parse().unwrap();
                let previous = gfa.segments.insert(id, Segment { seq, ln, kc });
                assert!(previous.is_none(), "segment {id} emitted more than once");
            }
            "L" => gfa.links.push(line.to_string()),
            "P" => {
                let segments: Vec<(u64, char)> = fields[2]
                    .split(',')
                    .map(|token| {
                        let (id, orient) = token.split_at(token.len() - 1);
                        (id.parse().unwrap(), orient.chars().next().unwrap())
                    })
                    .collect();
                let overlaps: Vec<String> =
                    fields[3].split(',').map(|s| s.to_string()).collect();
                if overlaps != ["*"] {
                    assert_eq!(overlaps.len(), segments.len() - 1);
                }
                gfa.paths.push(PathLine {
                    name: fields[1].to_string(),
                    segments,
                    overlaps,
                });
            }
            other => panic!("unexpected GFA record type {other:?}"),
        }
    }

    assert!(saw_header, "missing GFA header");
    gfa
}

pub fn revcomp(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'C' => 'G',
            'G' => 'C',
            'T' => 'A',
            other => other,
        })
        .collect()
}

/// Walk a path line: orient each segment, drop the overlap prefix on `k-1`
/// joins, keep whole segments across `0M` gaps.
pub fn reconstruct_path(gfa: &Gfa, path: &PathLine) -> String {
    let mut out = String::new();
    for (i, (id, orient)) in path.segments.iter().enumerate() {
        let segment = &gfa.segments[id];
        let oriented = match orient {
            '+' => segment.seq.clone(),
            '-' => revcomp(&segment.seq),
            other => panic!("bad orientation {other:?}"),
        };
        if i == 0 {
            out.push_str(&oriented);
        } else {
            let overlap: usize = path.overlaps[i - 1]
                .strip_suffix('M')
                .unwrap()
                .parse()
                .unwrap();
            out.push_str(&oriented[overlap..]);
        }
    }
    out
}

/// The placeholder-split form of a sequence: its valid runs of length at
/// least `k`, concatenated. This is exactly what the path walk reproduces.
pub fn tileable_islands(seq: &str, k: usize) -> String {
    seq.split(|c: char| !matches!(c, 'A' | 'C' | 'G' | 'T'))
        .filter(|island| island.len() >= k)
        .collect()
}

/// Assert the structural invariants every emitted GFA must satisfy, and that
/// each path reproduces its input sequence.
pub fn assert_gfa_invariants(gfa: &Gfa, seqs: &[&str], k: usize) {
    for (id, segment) in &gfa.segments {
        assert_eq!(segment.ln, segment.seq.len(), "LN mismatch for {id}");
        assert_eq!(segment.kc, segment.ln - k + 1, "KC mismatch for {id}");
    }

    for link in &gfa.links {
        let overlap = link.split('\t').nth(5).unwrap();
        assert!(
            overlap == format!("{}M", k - 1) || overlap == "0M",
            "bad link overlap in {link:?}"
        );
    }

    let tileable: Vec<&str> = seqs
        .iter()
        .copied()
        .filter(|s| !tileable_islands(s, k).is_empty())
        .collect();
    assert_eq!(gfa.paths.len(), tileable.len());
    for (path, seq) in gfa.paths.iter().zip(&tileable) {
        assert_eq!(
            reconstruct_path(gfa, path),
            tileable_islands(seq, k),
            "path {} does not reproduce its sequence",
            path.name
        );
    }
}
