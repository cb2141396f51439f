//! Comparison of matcher-derived classes against alignment-derived ones.
//!
//! For each read from an alignment file, the transcripts of its mapped
//! records are sorted and deduplicated into `lp` and looked up in the
//! index's reverse class table. The result is compared with the class `ec`
//! the collector assigned from the read's k-mer hits:
//!
//! | `lp`      | reverse lookup  | `ec`            | outcome              |
//! |-----------|-----------------|-----------------|----------------------|
//! | non-empty | not found       | any             | skipped, no count    |
//! | non-empty | equals `ec`     | any             | exact match          |
//! | non-empty | differs         | none            | alignment only       |
//! | non-empty | differs         | some            | mismatch             |
//! | empty     | -               | some            | matcher only         |
//! | empty     | -               | none            | neither              |
//!
//! A missing `ec` is read as "alignment only" when the read aligned but as
//! "neither" when it did not. The asymmetry is kept as is.

use serde::Serialize;

use crate::core::types::EcId;
use crate::index::TranscriptIndex;

/// Result of comparing one read's two classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ExactMatch,
    /// Matcher assigned a class, alignments mapped nowhere
    MatcherOnly,
    /// Alignments map to a known class, matcher assigned none
    AlignmentOnly,
    /// Both assigned, to different classes
    Mismatch,
    Neither,
    /// Aligned transcript set is not a class the index knows
    NotInClassTable,
}

/// Confusion counters over all compared reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionTally {
    pub exact_matches: u64,
    pub matcher_not_alignment: u64,
    pub alignment_not_matcher: u64,
    pub mismatches: u64,
    pub neither: u64,
    /// Reads whose aligned transcript set has no class; not part of the
    /// printed summary
    #[serde(skip)]
    pub not_in_class_table: u64,
}

impl ConfusionTally {
    /// Classify one read and count it
    pub fn record<I: TranscriptIndex>(
        &mut self,
        aligned: &[u32],
        ec: Option<EcId>,
        index: &I,
    ) -> Outcome {
        let outcome = classify(aligned, ec, index);
        self.add(outcome);
        outcome
    }

    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::ExactMatch => self.exact_matches += 1,
            Outcome::MatcherOnly => self.matcher_not_alignment += 1,
            Outcome::AlignmentOnly => self.alignment_not_matcher += 1,
            Outcome::Mismatch => self.mismatches += 1,
            Outcome::Neither => self.neither += 1,
            Outcome::NotInClassTable => self.not_in_class_table += 1,
        }
    }

    /// Number of reads counted in one of the five summary categories
    #[must_use]
    pub fn compared(&self) -> u64 {
        self.exact_matches
            + self.matcher_not_alignment
            + self.alignment_not_matcher
            + self.mismatches
            + self.neither
    }
}

/// Compare a sorted, duplicate-free aligned transcript set with `ec`
pub fn classify<I: TranscriptIndex>(aligned: &[u32], ec: Option<EcId>, index: &I) -> Outcome {
    if aligned.is_empty() {
        return if ec.is_some() {
            Outcome::MatcherOnly
        } else {
            Outcome::Neither
        };
    }

    match index.find_class(aligned) {
        None => Outcome::NotInClassTable,
        Some(found) if Some(found) == ec => Outcome::ExactMatch,
        Some(_) if ec.is_none() => Outcome::AlignmentOnly,
        Some(_) => Outcome::Mismatch,
    }
}

/// Sort and deduplicate aligned transcript ids in place
pub fn transcript_set(transcripts: &mut Vec<u32>) {
    transcripts.sort_unstable();
    transcripts.dedup();
}
