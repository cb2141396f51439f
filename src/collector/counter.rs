use std::collections::HashMap;
use std::io::{self, Write};

use tracing::debug;

use crate::collector::Collector;
use crate::core::types::{EcId, Hit};
use crate::index::TranscriptIndex;

/// Counts reads per equivalence class against a [`TranscriptIndex`].
///
/// The class of a read is the intersection of the transcript sets of its
/// matched k-mer windows. A window is the run of consecutive hits sharing
/// one `kmer` ordinal; positions are not used, since mate2 positions can
/// collide once projected and floored. Intersections the index does not
/// know get fresh ids numbered after the index's own classes.
pub struct EcCounter<'a, I: TranscriptIndex> {
    index: &'a I,
    extra_classes: Vec<Vec<u32>>,
    extra_inverse: HashMap<Vec<u32>, EcId>,
    counts: Vec<u64>,
    reads_seen: u64,
    reads_assigned: u64,
    scratch: Vec<u32>,
    window: Vec<u32>,
}

impl<'a, I: TranscriptIndex> EcCounter<'a, I> {
    #[must_use]
    pub fn new(index: &'a I) -> Self {
        Self {
            index,
            extra_classes: Vec::new(),
            extra_inverse: HashMap::new(),
            counts: vec![0; index.class_count()],
            reads_seen: 0,
            reads_assigned: 0,
            scratch: Vec::new(),
            window: Vec::new(),
        }
    }

    /// Count for a class id, zero if unknown
    #[must_use]
    pub fn count(&self, ec: EcId) -> u64 {
        self.counts.get(ec as usize).copied().unwrap_or(0)
    }

    /// Total number of known classes (index classes plus new ones)
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.index.class_count() + self.extra_classes.len()
    }

    #[must_use]
    pub fn reads_seen(&self) -> u64 {
        self.reads_seen
    }

    #[must_use]
    pub fn reads_assigned(&self) -> u64 {
        self.reads_assigned
    }

    /// Intersect the transcript sets of all windows into `self.scratch`
    fn intersect_windows(&mut self, hits: &[Hit]) {
        self.scratch.clear();
        let mut first = true;

        for run in hits.chunk_by(|a, b| a.kmer == b.kmer) {
            self.window.clear();
            self.window.extend(run.iter().map(|h| h.transcript_id));
            self.window.sort_unstable();
            self.window.dedup();

            if first {
                std::mem::swap(&mut self.scratch, &mut self.window);
                first = false;
            } else {
                let window = &self.window;
                self.scratch.retain(|t| window.binary_search(t).is_ok());
            }

            if self.scratch.is_empty() {
                return;
            }
        }
    }

    fn resolve(&mut self) -> EcId {
        if let Some(ec) = self.index.find_class(&self.scratch) {
            return ec;
        }
        if let Some(&ec) = self.extra_inverse.get(&self.scratch) {
            return ec;
        }

        #[allow(clippy::cast_possible_truncation)]
        let ec = self.class_count() as EcId;
        debug!(ec, members = ?self.scratch, "New equivalence class");
        self.extra_inverse.insert(self.scratch.clone(), ec);
        self.extra_classes.push(self.scratch.clone());
        ec
    }
}

impl<I: TranscriptIndex> Collector for EcCounter<'_, I> {
    fn collect(&mut self, hits: &[Hit]) -> Option<EcId> {
        self.reads_seen += 1;
        if hits.is_empty() {
            return None;
        }

        self.intersect_windows(hits);
        if self.scratch.is_empty() {
            return None;
        }

        let ec = self.resolve();
        let slot = ec as usize;
        if slot >= self.counts.len() {
            self.counts.resize(slot + 1, 0);
        }
        self.counts[slot] += 1;
        self.reads_assigned += 1;
        Some(ec)
    }

    fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        for ec in 0..self.class_count() {
            let count = self.counts.get(ec).copied().unwrap_or(0);
            writeln!(out, "{ec}\t{count}")?;
        }
        Ok(())
    }
}
