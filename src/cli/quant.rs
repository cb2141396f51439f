use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{display_path, IndexArgs};
use crate::collector::EcCounter;
use crate::pipeline::process_reads;
use crate::reads::fastq::FastqSource;

#[derive(Args)]
pub struct QuantArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// FASTQ file(s): one for single-end, two for paired-end
    #[arg(required = true, num_args = 1..=2)]
    pub reads: Vec<PathBuf>,
}

/// Execute quant subcommand
///
/// # Errors
///
/// Returns an error if the index or reads cannot be read or the counts
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: QuantArgs, verbose: bool) -> anyhow::Result<()> {
    let index = args.index.load_index()?;
    let config = args.index.pipeline_config(verbose);

    let source = FastqSource::open(args.reads.as_slice())?;
    if verbose {
        let mode = if source.is_paired() { "paired" } else { "single" };
        eprintln!(
            "Processing {mode}-end reads from {}",
            args.reads
                .iter()
                .map(|p| display_path(p.as_path()))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let mut collector = EcCounter::new(&index);
    let summary = process_reads(source, &index, &mut collector, &config)
        .context("Failed to process reads")?;

    if verbose {
        eprintln!(
            "Processed {} reads, {} assigned to a class; counts written to {}",
            summary.reads_processed,
            collector.reads_assigned(),
            display_path(&summary.counts_path)
        );
    }

    Ok(())
}
