//! The streaming read-to-class pipeline.
//!
//! For every logical read the pipeline:
//!
//! 1. Clears its scratch [`HitSet`](crate::core::types::HitSet)
//! 2. Matches mate1, then mate2 (projecting mate2 hit positions onto mate1's
//!    frame, see [`matcher::FragmentMatcher`])
//! 3. Hands the hits to the [`Collector`](crate::collector::Collector)
//! 4. In validation mode, compares the collector's class with the class of
//!    the read's aligned transcripts (see [`validate`])
//!
//! When the input is exhausted the collector's counts are written to
//! `<output_dir>/counts.txt` ([`emit`]).

pub mod emit;
pub mod matcher;
pub mod run;
pub mod validate;

use std::path::PathBuf;

use thiserror::Error;

use crate::reads::ReadError;

pub use matcher::FragmentMatcher;
pub use run::{process_alignments, process_reads, RunSummary};
pub use validate::{ConfusionTally, Outcome};

/// Default assumed fragment length for paired-end position correction
pub const DEFAULT_FRAGMENT_LENGTH: u32 = 200;

/// Reads between progress lines in verbose mode
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// File name of the counts artifact inside the output directory
pub const COUNTS_FILE_NAME: &str = "counts.txt";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run-wide settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Assumed distance between mate start positions
    pub fragment_length: u32,

    /// Directory receiving `counts.txt`
    pub output_dir: PathBuf,

    /// Print a progress line every [`PROGRESS_INTERVAL`] reads
    pub verbose: bool,
}

impl PipelineConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fragment_length: DEFAULT_FRAGMENT_LENGTH,
            output_dir: output_dir.into(),
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_fragment_length(mut self, fragment_length: u32) -> Self {
        self.fragment_length = fragment_length;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
