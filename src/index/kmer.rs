//! Exact canonical k-mer lookup over a transcript FASTA.
//!
//! Supports both uncompressed and gzip/bgzip compressed transcript files.

use std::collections::{BTreeSet, HashMap};
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use tracing::{debug, info};

use crate::core::dna::encode_base;
use crate::core::types::{EcId, Hit, HitSet};
use crate::index::{next_kmer_ordinal, EcMap, IndexError, Matcher, TranscriptIndex};
use crate::utils::is_gzipped;

/// Largest k that still packs into a `u64`
pub const MAX_KMER_LENGTH: usize = 31;

/// Canonical k-mer -> equivalence class index
#[derive(Debug)]
pub struct KmerIndex {
    k: usize,
    target_names: Vec<String>,
    kmers: HashMap<u64, EcId>,
    ecmap: EcMap,
}

impl KmerIndex {
    /// Build an index from a FASTA file of transcript sequences
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Io` if the file cannot be read, `IndexError::Noodles`
    /// if parsing fails, or any error from [`KmerIndex::from_sequences`].
    pub fn from_fasta(path: &Path, k: usize) -> Result<Self, IndexError> {
        let file = std::fs::File::open(path)?;
        let transcripts = if is_gzipped(path) {
            let mut reader = fasta::io::Reader::new(BufReader::new(MultiGzDecoder::new(file)));
            read_transcripts(&mut reader)?
        } else {
            let mut reader = fasta::io::Reader::new(BufReader::new(file));
            read_transcripts(&mut reader)?
        };

        if transcripts.is_empty() {
            return Err(IndexError::Empty(path.display().to_string()));
        }

        info!(
            transcripts = transcripts.len(),
            k,
            path = %path.display(),
            "Building k-mer index"
        );

        Self::from_sequences(k, transcripts)
    }

    /// Build an index from `(name, sequence)` pairs; transcript ids follow
    /// iteration order.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidKmerLength` for an even or out-of-range `k`,
    /// `IndexError::DuplicateTranscript` if a name repeats, or
    /// `IndexError::Empty` if no transcripts are given.
    pub fn from_sequences<N, S>(
        k: usize,
        transcripts: impl IntoIterator<Item = (N, S)>,
    ) -> Result<Self, IndexError>
    where
        N: Into<String>,
        S: AsRef<[u8]>,
    {
        if k == 0 || k > MAX_KMER_LENGTH || k % 2 == 0 {
            return Err(IndexError::InvalidKmerLength(k));
        }

        let mut target_names: Vec<String> = Vec::new();
        let mut seen_names = BTreeSet::new();
        let mut kmer_tids: HashMap<u64, Vec<u32>> = HashMap::new();

        for (name, seq) in transcripts {
            let name = name.into();
            if !seen_names.insert(name.clone()) {
                return Err(IndexError::DuplicateTranscript(name));
            }
            #[allow(clippy::cast_possible_truncation)]
            let tid = target_names.len() as u32;
            target_names.push(name);

            for (_, kmer) in CanonicalKmers::new(seq.as_ref(), k) {
                let tids = kmer_tids.entry(kmer).or_default();
                // Transcripts arrive in id order, so checking the tail dedups
                if tids.last() != Some(&tid) {
                    tids.push(tid);
                }
            }
        }

        if target_names.is_empty() {
            return Err(IndexError::Empty("transcript list".to_string()));
        }

        // Register multi-transcript classes in sorted order so ids are stable
        // across runs regardless of hash iteration order.
        let mut ecmap = EcMap::with_singletons(target_names.len());
        let distinct: BTreeSet<&Vec<u32>> = kmer_tids.values().collect();
        for members in distinct {
            ecmap.insert(members.clone());
        }

        let kmers: HashMap<u64, EcId> = kmer_tids
            .iter()
            .filter_map(|(&kmer, tids)| ecmap.find(tids).map(|ec| (kmer, ec)))
            .collect();

        debug!(
            kmers = kmers.len(),
            classes = ecmap.len(),
            "K-mer index built"
        );

        Ok(Self {
            k,
            target_names,
            kmers,
            ecmap,
        })
    }

    /// Number of distinct canonical k-mers
    #[must_use]
    pub fn kmer_count(&self) -> usize {
        self.kmers.len()
    }
}

impl Matcher for KmerIndex {
    fn kmer_length(&self) -> usize {
        self.k
    }

    fn match_sequence(&self, seq: &[u8], hits: &mut HitSet) {
        let mut window = next_kmer_ordinal(hits);
        for (offset, kmer) in CanonicalKmers::new(seq, self.k) {
            let Some(&ec) = self.kmers.get(&kmer) else {
                continue;
            };
            if let Some(members) = self.ecmap.members(ec) {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let position = offset as i32;
                hits.extend(
                    members
                        .iter()
                        .map(|&tid| Hit::in_window(tid, position, window)),
                );
                window += 1;
            }
        }
    }
}

impl TranscriptIndex for KmerIndex {
    fn target_names(&self) -> &[String] {
        &self.target_names
    }

    fn find_class(&self, transcripts: &[u32]) -> Option<EcId> {
        self.ecmap.find(transcripts)
    }

    fn class_count(&self) -> usize {
        self.ecmap.len()
    }

    fn class_members(&self, ec: EcId) -> Option<&[u32]> {
        self.ecmap.members(ec)
    }
}

fn read_transcripts<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<(String, Vec<u8>)>, IndexError> {
    let mut transcripts = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| IndexError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence = record.sequence().as_ref().to_vec();
        transcripts.push((name, sequence));
    }

    Ok(transcripts)
}

/// Iterator over `(offset, canonical k-mer)` for every ACGT-only window
struct CanonicalKmers<'a> {
    seq: &'a [u8],
    k: usize,
    mask: u64,
    shift: usize,
    pos: usize,
    valid: usize,
    fwd: u64,
    rev: u64,
}

impl<'a> CanonicalKmers<'a> {
    fn new(seq: &'a [u8], k: usize) -> Self {
        Self {
            seq,
            k,
            mask: (1u64 << (2 * k)) - 1,
            shift: 2 * (k - 1),
            pos: 0,
            valid: 0,
            fwd: 0,
            rev: 0,
        }
    }
}

impl Iterator for CanonicalKmers<'_> {
    type Item = (usize, u64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.seq.len() {
            let base = self.seq[self.pos];
            self.pos += 1;

            let Some(code) = encode_base(base) else {
                self.valid = 0;
                continue;
            };

            self.fwd = ((self.fwd << 2) | code) & self.mask;
            self.rev = (self.rev >> 2) | ((3 - code) << self.shift);
            self.valid += 1;

            if self.valid >= self.k {
                return Some((self.pos - self.k, self.fwd.min(self.rev)));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dna::reverse_complement_in_place;

    fn reverse_complement(seq: &[u8]) -> Vec<u8> {
        let mut rc = seq.to_vec();
        reverse_complement_in_place(&mut rc);
        rc
    }

    const T0: &[u8] = b"ACGTTGCAAGGCTTAACCGGATATCCGAGT";
    const T1: &[u8] = b"TTTTGGGGCCCCAAAATGCATGCACGTACG";

    fn index(k: usize) -> KmerIndex {
        KmerIndex::from_sequences(k, [("t0", T0), ("t1", T1)]).unwrap()
    }

    #[test]
    fn test_rejects_even_kmer_length() {
        let result = KmerIndex::from_sequences(4, [("t0", T0)]);
        assert!(matches!(result, Err(IndexError::InvalidKmerLength(4))));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = KmerIndex::from_sequences(5, [("t0", T0), ("t0", T1)]);
        assert!(matches!(result, Err(IndexError::DuplicateTranscript(_))));
    }

    #[test]
    fn test_canonical_kmers_are_strand_independent() {
        let fwd: Vec<u64> = CanonicalKmers::new(T0, 7).map(|(_, k)| k).collect();
        let rc = reverse_complement(T0);
        let mut rev: Vec<u64> = CanonicalKmers::new(&rc, 7).map(|(_, k)| k).collect();
        rev.reverse();
        assert_eq!(fwd, rev);
    }

    #[test]
    fn test_kmer_count_is_distinct_canonical() {
        // 24 + 24 windows; T1 repeats and reverse-complement pairs collapse
        assert_eq!(index(7).kmer_count(), 40);
        let single = KmerIndex::from_sequences(5, [("t0", "AAAAAAAA")]).unwrap();
        assert_eq!(single.kmer_count(), 1);
    }

    #[test]
    fn test_kmers_skip_ambiguous_bases() {
        let offsets: Vec<usize> = CanonicalKmers::new(b"ACGTANACGTA", 5)
            .map(|(offset, _)| offset)
            .collect();
        assert_eq!(offsets, vec![0, 6]);
    }

    #[test]
    fn test_match_appends_without_clearing() {
        let index = index(7);
        let mut hits = vec![Hit::new(99, 99)];
        index.match_sequence(&T0[3..15], &mut hits);

        assert_eq!(hits[0], Hit::new(99, 99));
        assert_eq!(hits.len(), 1 + (15 - 3 - 7 + 1));
        assert!(hits[1..].iter().all(|h| h.transcript_id == 0));
        assert_eq!(hits[1].position, 0);
        assert_eq!(hits.last().unwrap().position, 5);

        // Window ordinals continue after the hit already in the buffer
        let windows: Vec<u32> = hits[1..].iter().map(|h| h.kmer).collect();
        assert_eq!(windows, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_window_ordinals_continue_across_calls() {
        let index = index(7);
        let mut hits = Vec::new();
        index.match_sequence(&T0[..8], &mut hits);
        let first_call = hits.len();
        index.match_sequence(b"NNNN", &mut hits);
        index.match_sequence(&T1[..8], &mut hits);

        assert_eq!(first_call, 2);
        let windows: Vec<u32> = hits.iter().map(|h| h.kmer).collect();
        assert_eq!(windows, vec![0, 1, 2, 3]);
        assert_eq!(hits[2].position, 0);
        assert_eq!(hits[2].transcript_id, 1);
    }

    #[test]
    fn test_match_reverse_strand_read() {
        let index = index(7);
        let mut hits = Vec::new();
        index.match_sequence(&reverse_complement(T1), &mut hits);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.transcript_id == 1));
    }

    #[test]
    fn test_shared_kmer_yields_multi_transcript_class() {
        let shared = b"GATTACAGATTACA";
        let a = [&b"CCCCC"[..], shared].concat();
        let b = [shared, &b"TTTTT"[..]].concat();
        let index = KmerIndex::from_sequences(7, [("a", a), ("b", b)]).unwrap();

        assert_eq!(index.find_class(&[0]), Some(0));
        assert_eq!(index.find_class(&[1]), Some(1));
        let both = index.find_class(&[0, 1]).unwrap();
        assert!(both >= 2);
        assert_eq!(index.class_members(both), Some(&[0, 1][..]));

        let mut hits = Vec::new();
        index.match_sequence(shared, &mut hits);
        assert!(hits.len() >= 2);
        assert_eq!(hits[0], Hit::new(0, 0));
        assert_eq!(hits[1], Hit::new(1, 0));
    }

    #[test]
    fn test_class_ids_are_deterministic() {
        let a = index(5);
        let b = index(5);
        assert_eq!(a.class_count(), b.class_count());
        for ec in 0..a.class_count() {
            #[allow(clippy::cast_possible_truncation)]
            let ec = ec as EcId;
            assert_eq!(a.class_members(ec), b.class_members(ec));
        }
    }
}
