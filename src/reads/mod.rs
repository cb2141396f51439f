//! Read sources.
//!
//! Every source yields the same logical [`Read`](crate::core::types::Read):
//!
//! - [`fastq::FastqSource`]: one (single-end) or two synchronized
//!   (paired-end) FASTQ files, plain or gzip compressed
//! - [`alignment::ReadGroups`]: alignment records grouped by read name, with
//!   the aligned transcript ids of each group attached
//!
//! Alignment files are opened with [`alignment_file::open`], which accepts
//! SAM (`.sam`) and BAM.

pub mod alignment;
pub mod alignment_file;
pub mod fastq;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Could not open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("noodles error: {0}")]
    Noodles(String),
}
