//! Command-line interface for ec-check.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **quant**: Pseudoalign single or paired FASTQ reads and write class counts
//! - **validate**: Pseudoalign reads taken from a name-grouped SAM/BAM file and
//!   compare each read's class with the class of its aligned transcripts
//!
//! ## Usage
//!
//! ```text
//! # Paired-end reads
//! ec-check quant -i transcripts.fa.gz -k 31 -o out reads_1.fastq.gz reads_2.fastq.gz
//!
//! # Check against aligner output, sorted by read name
//! samtools sort -n aln.bam -o aln.byname.bam
//! ec-check validate -i transcripts.fa.gz -k 31 -o out aln.byname.bam
//!
//! # JSON summary for scripting
//! ec-check validate -i transcripts.fa -o out aln.sam --format json
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::index::{KmerIndex, TranscriptIndex};
use crate::pipeline::{PipelineConfig, DEFAULT_FRAGMENT_LENGTH};

pub mod quant;
pub mod validate;

#[derive(Parser)]
#[command(name = "ec-check")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Pseudoalign reads to transcript equivalence classes")]
#[command(
    long_about = "ec-check assigns every read (or read pair) to the equivalence class of transcripts compatible with its k-mers and writes per-class counts.\n\nGiven a SAM/BAM file grouped by read name, it also compares each read's class with the class of the transcripts the read aligned to and prints a confusion summary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format of the validation summary (validate only; quant
    /// prints no summary)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count equivalence classes for FASTQ reads
    Quant(quant::QuantArgs),

    /// Compare equivalence classes against read alignments
    Validate(validate::ValidateArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Transcript FASTA (plain, .gz or .bgz)
    #[arg(short, long)]
    pub index: PathBuf,

    /// K-mer length (odd, at most 31)
    #[arg(short, long, default_value = "31", value_parser = clap::value_parser!(u32).range(1..=31))]
    pub kmer_length: u32,

    /// Assumed fragment length for paired-end position correction
    #[arg(short = 'l', long, default_value_t = DEFAULT_FRAGMENT_LENGTH)]
    pub fragment_length: u32,

    /// Output directory for counts.txt
    #[arg(short, long)]
    pub output: PathBuf,
}

impl IndexArgs {
    fn load_index(&self) -> anyhow::Result<KmerIndex> {
        let index = KmerIndex::from_fasta(&self.index, self.kmer_length as usize)
            .with_context(|| format!("Failed to build index from {}", self.index.display()))?;
        info!(
            transcripts = index.target_names().len(),
            kmers = index.kmer_count(),
            classes = index.class_count(),
            "Index ready"
        );
        Ok(index)
    }

    fn pipeline_config(&self, verbose: bool) -> PipelineConfig {
        PipelineConfig::new(&self.output)
            .with_fragment_length(self.fragment_length)
            .with_verbose(verbose)
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
