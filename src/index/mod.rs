//! Transcript index contract and a small reference implementation.
//!
//! The pipeline never looks inside an index. It needs exactly three things:
//!
//! - [`Matcher`]: append k-mer hits for a sequence to a caller-owned buffer
//! - [`TranscriptIndex`]: the ordered transcript name table (to resolve
//!   alignment reference names) and the reverse class table
//!   (sorted transcript ids -> class id)
//!
//! [`KmerIndex`] satisfies both and is built straight from a transcript FASTA.
//! Any other engine implementing the traits can be swapped in.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ec_check::index::{KmerIndex, Matcher};
//! use std::path::Path;
//!
//! let index = KmerIndex::from_fasta(Path::new("transcripts.fa.gz"), 31).unwrap();
//!
//! let mut hits = Vec::new();
//! index.match_sequence(b"ACGTACGTACGTACGTACGTACGTACGTACGTACGT", &mut hits);
//! ```

pub mod ecmap;
pub mod kmer;

use thiserror::Error;

use crate::core::types::{EcId, Hit, HitSet};

pub use ecmap::EcMap;
pub use kmer::KmerIndex;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Invalid k-mer length {0}: must be odd and between 1 and 31")]
    InvalidKmerLength(usize),

    #[error("Duplicate transcript name: {0}")]
    DuplicateTranscript(String),

    #[error("No transcripts found in {0}")]
    Empty(String),
}

/// K-mer matching capability
pub trait Matcher {
    /// Length of the k-mers this matcher looks up
    fn kmer_length(&self) -> usize;

    /// Append the hits for `seq` to `hits`.
    ///
    /// Hits are appended contiguously after whatever is already in the
    /// buffer; implementations must never clear it. Hits of one matched
    /// window share a `kmer` ordinal, numbered on from the last hit already
    /// in the buffer (see [`next_kmer_ordinal`]).
    fn match_sequence(&self, seq: &[u8], hits: &mut HitSet);
}

/// Transcript tables exposed by an index
pub trait TranscriptIndex {
    /// Transcript names, indexed by transcript id
    fn target_names(&self) -> &[String];

    /// Look up a sorted, duplicate-free transcript id list in the reverse
    /// class table
    fn find_class(&self, transcripts: &[u32]) -> Option<EcId>;

    /// Number of classes known to the index
    fn class_count(&self) -> usize;

    /// Sorted transcript ids of a class
    fn class_members(&self, ec: EcId) -> Option<&[u32]>;
}

/// First free window ordinal for hits appended to `hits`
#[must_use]
pub fn next_kmer_ordinal(hits: &[Hit]) -> u32 {
    hits.last().map_or(0, |hit| hit.kmer + 1)
}
