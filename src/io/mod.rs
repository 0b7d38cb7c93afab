pub mod fasta;
pub mod fragment;
pub mod gfa;
pub mod metadata;
