use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "maxtig",
    version,
    about = "Maximal unitigs of a compacted de Bruijn graph, in GFA",
    long_about = None
)]
pub struct Cli {
    /// Input reference FASTA(.gz) file
    #[arg(short, long)]
    pub input: String,

    /// Output GFA file
    #[arg(short, long)]
    pub output: String,

    /// K-mer length (odd, at most 63)
    #[arg(short, long, default_value_t = 31)]
    pub k: usize,

    /// Number of worker threads
    #[arg(long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Directory for temporary path/overlap fragment files
    #[arg(long, default_value = ".")]
    pub temp_dir: String,

    /// Optional path to write run statistics as JSON
    #[arg(long)]
    pub json_metadata: Option<String>,
}
