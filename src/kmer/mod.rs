pub mod annotated;
pub mod kmer;
pub mod window;
