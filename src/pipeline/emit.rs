use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::collector::Collector;
use crate::pipeline::validate::ConfusionTally;
use crate::pipeline::{PipelineError, COUNTS_FILE_NAME};

/// Write the collector's counts to `<output_dir>/counts.txt`, creating the
/// directory if needed
///
/// # Errors
///
/// Returns `PipelineError::Write` if the directory or file cannot be written.
pub fn write_counts<C: Collector + ?Sized>(
    collector: &C,
    output_dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let path = output_dir.join(COUNTS_FILE_NAME);
    let write_err = |source| PipelineError::Write {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(output_dir).map_err(write_err)?;
    let file = File::create(&path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    collector.write(&mut out).map_err(write_err)?;
    out.flush().map_err(write_err)?;

    info!(path = %path.display(), "Wrote counts");
    Ok(path)
}

/// Validation-mode summary: processed reads plus the confusion counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub aligned: u64,
    #[serde(flatten)]
    pub tally: ConfusionTally,
}

impl ValidationReport {
    #[must_use]
    pub fn new(aligned: u64, tally: ConfusionTally) -> Self {
        Self { aligned, tally }
    }

    /// Header and one row, tab separated
    #[must_use]
    pub fn to_tsv(&self) -> String {
        format!(
            "aligned\texact_matches\tmatcher_not_alignment\talignment_not_matcher\tmismatches\tneither\n\
             {}\t{}\t{}\t{}\t{}\t{}\n",
            self.aligned,
            self.tally.exact_matches,
            self.tally.matcher_not_alignment,
            self.tally.alignment_not_matcher,
            self.tally.mismatches,
            self.tally.neither,
        )
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Aligned {}", self.aligned)?;
        writeln!(f, "exact matches = {}", self.tally.exact_matches)?;
        writeln!(
            f,
            "Kallisto mapped, not BAM = {}",
            self.tally.matcher_not_alignment
        )?;
        writeln!(
            f,
            "Bam mapped, not Kallisto = {}",
            self.tally.alignment_not_matcher
        )?;
        writeln!(f, "Both mapped, mismatches = {}", self.tally.mismatches)?;
        writeln!(f, "Neither mapped = {}", self.tally.neither)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ValidationReport {
        ValidationReport::new(
            6,
            ConfusionTally {
                exact_matches: 1,
                matcher_not_alignment: 2,
                alignment_not_matcher: 3,
                mismatches: 4,
                neither: 5,
                not_in_class_table: 1,
            },
        )
    }

    #[test]
    fn test_text_summary_labels() {
        assert_eq!(
            report().to_string(),
            "Aligned 6\n\
             exact matches = 1\n\
             Kallisto mapped, not BAM = 2\n\
             Bam mapped, not Kallisto = 3\n\
             Both mapped, mismatches = 4\n\
             Neither mapped = 5\n"
        );
    }

    #[test]
    fn test_json_summary() {
        let value = serde_json::to_value(report()).unwrap();
        assert_eq!(value["aligned"], 6);
        assert_eq!(value["exact_matches"], 1);
        assert_eq!(value["neither"], 5);
        assert!(value.get("not_in_class_table").is_none());
    }

    #[test]
    fn test_tsv_summary() {
        let tsv = report().to_tsv();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "6\t1\t2\t3\t4\t5");
    }
}
