use std::path::PathBuf;

use tracing::{info, trace, warn};

use crate::collector::Collector;
use crate::core::types::{display_ec, HitSet, Read};
use crate::index::{Matcher, TranscriptIndex};
use crate::pipeline::emit::{write_counts, ValidationReport};
use crate::pipeline::matcher::FragmentMatcher;
use crate::pipeline::validate::{transcript_set, ConfusionTally};
use crate::pipeline::{PipelineConfig, PipelineError, PROGRESS_INTERVAL};
use crate::reads::alignment::AlignedRead;
use crate::reads::ReadError;

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reads_processed: u64,

    /// Present for alignment input with at least one record
    pub validation: Option<ValidationReport>,

    pub counts_path: PathBuf,
}

/// Scratch buffers reused for every read
#[derive(Default)]
struct Scratch {
    hits: HitSet,
}

/// Whether a progress line is due after `reads_processed` reads
pub(crate) fn progress_due(verbose: bool, reads_processed: u64) -> bool {
    verbose && reads_processed > 0 && reads_processed % PROGRESS_INTERVAL == 0
}

fn report_progress(config: &PipelineConfig, reads_processed: u64) {
    if progress_due(config.verbose, reads_processed) {
        eprintln!("Processed {reads_processed}");
    }
}

/// Pseudoalign every read of `reads` and write the collector's counts.
///
/// # Errors
///
/// Returns `PipelineError::Read` if the source fails mid-stream or
/// `PipelineError::Write` if the counts cannot be written.
pub fn process_reads<M, C>(
    reads: impl IntoIterator<Item = Result<Read, ReadError>>,
    matcher: &M,
    collector: &mut C,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError>
where
    M: Matcher,
    C: Collector,
{
    let fragment = FragmentMatcher::new(matcher, config.fragment_length);
    let mut scratch = Scratch::default();
    let mut reads_processed: u64 = 0;

    for read in reads {
        let read = read?;
        reads_processed += 1;

        fragment.match_read(&read, &mut scratch.hits);
        collector.collect(&scratch.hits);

        report_progress(config, reads_processed);
    }

    info!(reads = reads_processed, "Finished processing reads");
    let counts_path = write_counts(collector, &config.output_dir)?;

    Ok(RunSummary {
        reads_processed,
        validation: None,
        counts_path,
    })
}

/// Pseudoalign grouped alignment reads, compare each read's class with its
/// aligned transcripts, and write the collector's counts.
///
/// An empty record stream is logged, still writes the counts, and returns
/// no validation report.
///
/// # Errors
///
/// Returns `PipelineError::Read` if the source fails mid-stream or
/// `PipelineError::Write` if the counts cannot be written.
pub fn process_alignments<I, C>(
    groups: impl IntoIterator<Item = Result<AlignedRead, ReadError>>,
    index: &I,
    collector: &mut C,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError>
where
    I: Matcher + TranscriptIndex,
    C: Collector,
{
    let mut groups = groups.into_iter().peekable();
    if groups.peek().is_none() {
        warn!("Empty alignment file");
        let counts_path = write_counts(collector, &config.output_dir)?;
        return Ok(RunSummary {
            reads_processed: 0,
            validation: None,
            counts_path,
        });
    }

    let fragment = FragmentMatcher::new(index, config.fragment_length);
    let mut scratch = Scratch::default();
    let mut tally = ConfusionTally::default();
    let mut reads_processed: u64 = 0;

    for group in groups {
        let AlignedRead {
            read,
            mut transcripts,
        } = group?;
        reads_processed += 1;

        fragment.match_read(&read, &mut scratch.hits);
        let ec = collector.collect(&scratch.hits);

        report_progress(config, reads_processed);

        transcript_set(&mut transcripts);
        let outcome = tally.record(&transcripts, ec, index);
        trace!(
            read = %read.display_name(),
            ec = display_ec(ec),
            ?outcome,
            "Compared read"
        );
    }

    if tally.not_in_class_table > 0 {
        info!(
            reads = tally.not_in_class_table,
            "Reads whose aligned transcripts form no known class were not compared"
        );
    }

    let counts_path = write_counts(collector, &config.output_dir)?;

    Ok(RunSummary {
        reads_processed,
        validation: Some(ValidationReport::new(reads_processed, tally)),
        counts_path,
    })
}
