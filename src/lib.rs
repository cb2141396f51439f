//! # ec-check
//!
//! A streaming pipeline that turns sequencing reads into transcript
//! equivalence class counts, and checks those classes against alignments.
//!
//! Each read (or read pair) is matched k-mer by k-mer against a transcript
//! index. The resulting hits are collapsed into an equivalence class: the
//! set of transcripts compatible with every matched k-mer. Reads sharing a
//! class are counted together and the counts are written to `counts.txt`.
//!
//! When the reads come from a SAM/BAM file, the transcripts each read
//! actually aligned to give an independent class. Comparing the two yields a
//! confusion summary: exact matches, reads only one side placed, reads both
//! placed differently, and reads neither placed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ec_check::collector::EcCounter;
//! use ec_check::index::KmerIndex;
//! use ec_check::pipeline::{process_reads, PipelineConfig};
//! use ec_check::reads::fastq::FastqSource;
//! use std::path::Path;
//!
//! let index = KmerIndex::from_fasta(Path::new("transcripts.fa.gz"), 31).unwrap();
//! let reads = FastqSource::open_paired(
//!     Path::new("reads_1.fastq.gz"),
//!     Path::new("reads_2.fastq.gz"),
//! )
//! .unwrap();
//!
//! let mut collector = EcCounter::new(&index);
//! let config = PipelineConfig::new("out").with_fragment_length(200);
//! let summary = process_reads(reads, &index, &mut collector, &config).unwrap();
//! println!("{} reads", summary.reads_processed);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Hits, reads and nucleotide helpers
//! - [`index`]: Matcher and transcript index contracts, plus a k-mer index
//! - [`collector`]: Collector contract and a counting collector
//! - [`reads`]: FASTQ and SAM/BAM read sources
//! - [`pipeline`]: Fragment matching, validation and result emission
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod collector;
pub mod core;
pub mod index;
pub mod pipeline;
pub mod reads;
pub mod utils;

// Re-export commonly used types for convenience
pub use collector::{Collector, EcCounter};
pub use crate::core::types::*;
pub use index::{KmerIndex, Matcher, TranscriptIndex};
pub use pipeline::{ConfusionTally, PipelineConfig, RunSummary};
