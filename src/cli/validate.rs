use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{display_path, IndexArgs, OutputFormat};
use crate::collector::EcCounter;
use crate::index::TranscriptIndex;
use crate::pipeline::emit::ValidationReport;
use crate::pipeline::process_alignments;
use crate::reads::alignment_file;

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// SAM or BAM file with records grouped by read name
    #[arg(required = true)]
    pub alignments: PathBuf,
}

/// Execute validate subcommand
///
/// # Errors
///
/// Returns an error if the index or alignment file cannot be read or the
/// counts cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ValidateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let index = args.index.load_index()?;
    let config = args.index.pipeline_config(verbose);

    let groups = alignment_file::open(&args.alignments, index.target_names())?;
    if verbose {
        eprintln!(
            "Resolved {} of {} reference names from {}",
            groups.references().resolved(),
            groups.references().len(),
            display_path(&args.alignments)
        );
    }

    let mut collector = EcCounter::new(&index);
    let summary = process_alignments(groups, &index, &mut collector, &config)
        .context("Failed to process alignments")?;

    if let Some(report) = summary.validation {
        print_report(&report, format)?;
    }

    Ok(())
}

fn print_report(report: &ValidationReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Tsv => print!("{}", report.to_tsv()),
    }
    Ok(())
}
