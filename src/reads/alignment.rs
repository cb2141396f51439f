//! Grouping of name-sorted alignment records into logical reads.
//!
//! Records must be grouped so that every record of one read name is
//! contiguous (e.g. `samtools sort -n` or aligner output order). The
//! grouping iterator pulls records one at a time and holds at most one
//! record of lookahead: the first record whose name differs from the
//! current group's ends that group and starts the next one.

use std::collections::HashMap;
use std::io;

use noodles::sam::alignment::record::Flags;
use tracing::{debug, warn};

use crate::core::dna::reverse_complement_in_place;
use crate::core::types::Read;
use crate::reads::ReadError;

/// The parts of an alignment record the pipeline uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    /// Read name (identity token)
    pub name: Vec<u8>,

    /// SAM flags: segment (first/last/multiple), strand and mapping state
    pub flags: Flags,

    /// Index into the file header's reference sequence table
    pub reference_id: Option<usize>,

    /// Stored sequence, reverse complemented if the record is reversed
    pub sequence: Vec<u8>,
}

impl AlignmentRecord {
    #[must_use]
    pub fn new(
        name: impl Into<Vec<u8>>,
        flags: Flags,
        reference_id: Option<usize>,
        sequence: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            flags,
            reference_id,
            sequence: sequence.into(),
        }
    }

    /// Take the sequence out of the record in original read orientation
    fn take_read_sequence(&mut self) -> Vec<u8> {
        let mut seq = std::mem::take(&mut self.sequence);
        if self.flags.is_reverse_complemented() {
            reverse_complement_in_place(&mut seq);
        }
        seq
    }
}

/// Translation from header reference index to index transcript id
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    transcripts: Vec<Option<u32>>,
}

impl ReferenceMap {
    /// Resolve each header reference name against the index's transcript
    /// names. Unknown names are logged and left unresolved.
    pub fn new<S: AsRef<str>>(
        reference_names: impl IntoIterator<Item = S>,
        target_names: &[String],
    ) -> Self {
        let by_name: HashMap<&str, u32> = target_names
            .iter()
            .zip(0u32..)
            .map(|(name, tid)| (name.as_str(), tid))
            .collect();

        let transcripts = reference_names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                let tid = by_name.get(name).copied();
                if tid.is_none() {
                    warn!(reference = %name, "Could not find transcript name in index, skipping");
                }
                tid
            })
            .collect();

        Self { transcripts }
    }

    /// Transcript id of a header reference index, if resolved
    #[must_use]
    pub fn transcript(&self, reference_id: usize) -> Option<u32> {
        self.transcripts.get(reference_id).copied().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Number of header references that resolved to a transcript
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.transcripts.iter().filter(|t| t.is_some()).count()
    }
}

/// One read reconstructed from its alignment records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRead {
    pub read: Read,

    /// Transcript ids of every mapped record in the group, unsorted and
    /// possibly repeated
    pub transcripts: Vec<u32>,
}

/// Pull-based grouping iterator over a flat, name-grouped record stream
pub struct ReadGroups<I> {
    records: I,
    references: ReferenceMap,
    lookahead: Option<AlignmentRecord>,
    done: bool,
}

impl<I> ReadGroups<I>
where
    I: Iterator<Item = io::Result<AlignmentRecord>>,
{
    pub fn new(records: I, references: ReferenceMap) -> Self {
        Self {
            records,
            references,
            lookahead: None,
            done: false,
        }
    }

    #[must_use]
    pub fn references(&self) -> &ReferenceMap {
        &self.references
    }

    fn pull(&mut self) -> Option<io::Result<AlignmentRecord>> {
        let next = self.records.next();
        if next.is_none() {
            self.done = true;
        }
        next
    }
}

/// Mutable state of the group being assembled
struct GroupBuilder {
    segmented: bool,
    mate1: Vec<u8>,
    mate2: Vec<u8>,
    transcripts: Vec<u32>,
}

impl GroupBuilder {
    fn new(first: &AlignmentRecord) -> Self {
        Self {
            segmented: first.flags.is_segmented(),
            mate1: Vec::new(),
            mate2: Vec::new(),
            transcripts: Vec::new(),
        }
    }

    fn absorb(&mut self, record: &mut AlignmentRecord, references: &ReferenceMap) {
        let flags = record.flags;

        if (flags.is_first_segment() || !self.segmented) && self.mate1.is_empty() {
            self.mate1 = record.take_read_sequence();
        } else if self.segmented && flags.is_last_segment() && self.mate2.is_empty() {
            self.mate2 = record.take_read_sequence();
        } else if self.mate1.is_empty() && self.mate2.is_empty() {
            warn!(
                read = %String::from_utf8_lossy(&record.name),
                flags = u16::from(flags),
                "Unexpected record in alignment group"
            );
        }

        if flags.is_unmapped() {
            return;
        }
        match record.reference_id.and_then(|id| references.transcript(id)) {
            Some(tid) => self.transcripts.push(tid),
            None => debug!(
                read = %String::from_utf8_lossy(&record.name),
                reference_id = ?record.reference_id,
                "Mapped record on unresolved reference"
            ),
        }
    }

    fn finish(self, name: Vec<u8>) -> AlignedRead {
        if self.mate1.is_empty() || (self.segmented && self.mate2.is_empty()) {
            warn!(
                read = %String::from_utf8_lossy(&name),
                mate1_len = self.mate1.len(),
                mate2_len = self.mate2.len(),
                "Only one read is present"
            );
        }

        let read = if self.segmented {
            Read::paired(name, self.mate1, self.mate2)
        } else {
            Read::single(name, self.mate1)
        };

        AlignedRead {
            read,
            transcripts: self.transcripts,
        }
    }
}

impl<I> Iterator for ReadGroups<I>
where
    I: Iterator<Item = io::Result<AlignmentRecord>>,
{
    type Item = Result<AlignedRead, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut current = match self.lookahead.take() {
            Some(record) => record,
            None if self.done => return None,
            None => match self.pull()? {
                Ok(record) => record,
                Err(e) => {
                    self.done = true;
                    return Some(Err(ReadError::Io(e)));
                }
            },
        };

        let mut group = GroupBuilder::new(&current);
        loop {
            group.absorb(&mut current, &self.references);

            let Some(next) = self.pull() else {
                break;
            };
            let next = match next {
                Ok(record) => record,
                Err(e) => {
                    self.done = true;
                    return Some(Err(ReadError::Io(e)));
                }
            };

            if next.name != current.name {
                self.lookahead = Some(next);
                break;
            }
            current = next;
        }

        Some(Ok(group.finish(current.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: Flags = Flags::SEGMENTED.union(Flags::FIRST_SEGMENT);
    const LAST: Flags = Flags::SEGMENTED.union(Flags::LAST_SEGMENT);

    fn references() -> ReferenceMap {
        let targets: Vec<String> = ["tA", "tB", "tC"].iter().map(|s| s.to_string()).collect();
        // Header order differs from index order, and one name is unknown
        ReferenceMap::new(["tC", "tA", "missing", "tB"], &targets)
    }

    fn group(records: Vec<AlignmentRecord>) -> Vec<AlignedRead> {
        ReadGroups::new(records.into_iter().map(Ok), references())
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn test_reference_map_translation() {
        let refs = references();
        assert_eq!(refs.len(), 4);
        assert_eq!(refs.resolved(), 3);
        assert_eq!(refs.transcript(0), Some(2));
        assert_eq!(refs.transcript(1), Some(0));
        assert_eq!(refs.transcript(2), None);
        assert_eq!(refs.transcript(3), Some(1));
        assert_eq!(refs.transcript(99), None);
    }

    #[test]
    fn test_contiguous_records_form_one_read() {
        let reads = group(vec![
            AlignmentRecord::new("r1", FIRST, Some(0), "AAAC"),
            AlignmentRecord::new("r1", LAST, Some(0), "GGGT"),
            AlignmentRecord::new("r1", FIRST | Flags::SECONDARY, Some(1), ""),
            AlignmentRecord::new("r2", FIRST, Some(3), "CCCA"),
            AlignmentRecord::new("r2", LAST, Some(3), "TTTG"),
        ]);

        assert_eq!(reads.len(), 2);
        assert_eq!(reads[0].read, Read::paired("r1", "AAAC", "GGGT"));
        assert_eq!(reads[0].transcripts, vec![2, 2, 0]);
        assert_eq!(reads[1].read, Read::paired("r2", "CCCA", "TTTG"));
        assert_eq!(reads[1].transcripts, vec![1, 1]);
    }

    #[test]
    fn test_reverse_complemented_records_are_restored() {
        let reads = group(vec![
            AlignmentRecord::new("r1", FIRST | Flags::REVERSE_COMPLEMENTED, Some(0), "GTTT"),
            AlignmentRecord::new("r1", LAST, Some(0), "ACGA"),
        ]);
        assert_eq!(reads[0].read, Read::paired("r1", "AAAC", "ACGA"));
    }

    #[test]
    fn test_unmapped_records_contribute_no_transcripts() {
        let reads = group(vec![
            AlignmentRecord::new("r1", FIRST | Flags::UNMAPPED, None, "AAAC"),
            AlignmentRecord::new("r1", LAST | Flags::UNMAPPED, None, "GGGT"),
        ]);
        assert_eq!(reads.len(), 1);
        assert!(reads[0].transcripts.is_empty());
        assert_eq!(reads[0].read, Read::paired("r1", "AAAC", "GGGT"));
    }

    #[test]
    fn test_unresolved_reference_is_skipped() {
        let reads = group(vec![
            AlignmentRecord::new("r1", FIRST, Some(2), "AAAC"),
            AlignmentRecord::new("r1", LAST, Some(1), "GGGT"),
        ]);
        assert_eq!(reads[0].transcripts, vec![0]);
    }

    #[test]
    fn test_missing_mate_still_yields_read() {
        let reads = group(vec![AlignmentRecord::new("r1", FIRST, Some(0), "AAAC")]);
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].read, Read::paired("r1", "AAAC", ""));
    }

    #[test]
    fn test_single_end_records() {
        let reads = group(vec![
            AlignmentRecord::new("r1", Flags::empty(), Some(0), "AAAC"),
            AlignmentRecord::new("r1", Flags::SECONDARY, Some(3), ""),
            AlignmentRecord::new("r2", Flags::REVERSE_COMPLEMENTED, Some(1), "GTTT"),
        ]);
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[0].read, Read::single("r1", "AAAC"));
        assert_eq!(reads[0].transcripts, vec![2, 1]);
        assert_eq!(reads[1].read, Read::single("r2", "AAAC"));
    }

    #[test]
    fn test_non_adjacent_names_form_separate_groups() {
        let reads = group(vec![
            AlignmentRecord::new("r1", Flags::empty(), Some(0), "AAAC"),
            AlignmentRecord::new("r2", Flags::empty(), Some(0), "AAAC"),
            AlignmentRecord::new("r1", Flags::empty(), Some(0), "AAAC"),
        ]);
        assert_eq!(reads.len(), 3);
    }

    #[test]
    fn test_empty_stream() {
        assert!(group(Vec::new()).is_empty());
    }

    #[test]
    fn test_read_error_ends_stream() {
        let records = vec![
            Ok(AlignmentRecord::new("r1", Flags::empty(), Some(0), "AAAC")),
            Err(io::Error::new(io::ErrorKind::InvalidData, "truncated")),
        ];
        let mut groups = ReadGroups::new(records.into_iter(), references());
        assert!(matches!(groups.next(), Some(Err(ReadError::Io(_)))));
        assert!(groups.next().is_none());
    }
}
