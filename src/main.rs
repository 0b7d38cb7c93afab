use std::io;
use std::path::Path;
use std::time::Instant;

use clap::Parser;
use rayon::ThreadPoolBuilder;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use maxtig::cli_main::Cli;
use maxtig::graph::classify::build_vertex_table;
use maxtig::io::fasta::{open_fasta, stream_fasta_records, FastaRecord};
use maxtig::io::metadata::{write_run_metadata, RunMetadata};
use maxtig::kmer::kmer::MAX_K;
use maxtig::pipeline::emit::{emit_maximal_unitigs, GfaParams};

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Setting tracing default failed");

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn run(cli: &Cli) -> io::Result<()> {
    if cli.k == 0 || cli.k > MAX_K {
        return Err(invalid_input(format!(
            "k must be between 1 and {MAX_K}, got {}",
            cli.k
        )));
    }
    if cli.k % 2 == 0 {
        // Even k admits palindromic k-mers, whose orientation is undefined.
        return Err(invalid_input(format!("k must be odd, got {}", cli.k)));
    }

    ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .map_err(|err| io::Error::other(format!("thread pool setup failed: {err}")))?;

    let start = Instant::now();

    info!("reading reference sequences from {}", cli.input);
    let records: Vec<FastaRecord> =
        stream_fasta_records(open_fasta(&cli.input)?).collect::<io::Result<Vec<_>>>()?;
    info!("read {} sequence(s)", records.len());

    info!("building the annotated vertex table (k = {})", cli.k);
    let table = build_vertex_table(&records, cli.k);
    info!("classified {} vertices", table.len());

    let params = GfaParams::new(
        cli.k,
        cli.threads,
        Path::new(&cli.output),
        Path::new(&cli.temp_dir),
    );
    info!(
        "extracting maximal unitigs with {} thread(s)",
        params.thread_count
    );
    let summary = emit_maximal_unitigs(&records, &table, &params)?;
    info!(
        "wrote {} segments, {} links, {} paths to {}",
        summary.segments, summary.links, summary.paths, cli.output
    );

    if let Some(metadata_path) = &cli.json_metadata {
        write_run_metadata(
            metadata_path,
            &RunMetadata {
                k: cli.k,
                thread_count: params.thread_count,
                vertex_count: table.len() as u64,
                sequence_count: summary.sequences,
                segment_count: summary.segments,
                link_count: summary.links,
                path_count: summary.paths,
            },
        )?;
        info!("wrote run metadata to {}", metadata_path);
    }

    info!("done in {:.2}s", start.elapsed().as_secs_f32());
    Ok(())
}
