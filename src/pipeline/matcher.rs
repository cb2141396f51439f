use crate::core::types::{Hit, HitSet, Read};
use crate::index::Matcher;

/// Matches both mates of a read into one hit set.
///
/// Mate2 hit positions are measured from mate2's own 5' end. They are
/// projected onto mate1's frame assuming every fragment has the configured
/// length: `position = max(leftpos - position, 0)` with
/// `leftpos = fragment_length - k`. This is a coarse approximation, not a
/// per-fragment alignment.
pub struct FragmentMatcher<'a, M: Matcher> {
    matcher: &'a M,
    leftpos: i32,
}

impl<'a, M: Matcher> FragmentMatcher<'a, M> {
    #[allow(clippy::cast_possible_wrap)] // k is at most a few dozen
    pub fn new(matcher: &'a M, fragment_length: u32) -> Self {
        let leftpos = i64::from(fragment_length) - matcher.kmer_length() as i64;
        #[allow(clippy::cast_possible_truncation)]
        let leftpos = leftpos.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Self { matcher, leftpos }
    }

    #[must_use]
    pub fn leftpos(&self) -> i32 {
        self.leftpos
    }

    /// Clear `hits` and fill it with the hits of `read`
    pub fn match_read(&self, read: &Read, hits: &mut HitSet) {
        hits.clear();
        self.matcher.match_sequence(&read.mate1, hits);

        if let Some(mate2) = &read.mate2 {
            let n = hits.len();
            self.matcher.match_sequence(mate2, hits);
            correct_mate_positions(&mut hits[n..], self.leftpos);
        }
    }
}

/// Project mate2 hits onto mate1's coordinate frame, flooring at zero
pub fn correct_mate_positions(hits: &mut [Hit], leftpos: i32) {
    for hit in hits {
        hit.position = corrected_position(leftpos, hit.position);
    }
}

#[must_use]
pub fn corrected_position(leftpos: i32, position: i32) -> i32 {
    leftpos.saturating_sub(position).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays canned hits per sequence
    struct CannedMatcher {
        k: usize,
    }

    impl Matcher for CannedMatcher {
        fn kmer_length(&self) -> usize {
            self.k
        }

        fn match_sequence(&self, seq: &[u8], hits: &mut HitSet) {
            match seq {
                b"MATE1" => hits.extend([Hit::new(5, 2), Hit::new(5, 10)]),
                b"MATE2" => hits.push(Hit::new(5, 3)),
                b"FAR" => hits.push(Hit::new(7, 500)),
                _ => {}
            }
        }
    }

    #[test]
    fn test_paired_positions_are_projected() {
        let matcher = CannedMatcher { k: 31 };
        let fragment = FragmentMatcher::new(&matcher, 200);
        assert_eq!(fragment.leftpos(), 169);

        let mut hits = Vec::new();
        fragment.match_read(&Read::paired("r", "MATE1", "MATE2"), &mut hits);
        assert_eq!(hits, vec![Hit::new(5, 2), Hit::new(5, 10), Hit::new(5, 166)]);
    }

    #[test]
    fn test_single_end_is_uncorrected() {
        let matcher = CannedMatcher { k: 31 };
        let fragment = FragmentMatcher::new(&matcher, 200);

        let mut hits = Vec::new();
        fragment.match_read(&Read::single("r", "MATE2"), &mut hits);
        assert_eq!(hits, vec![Hit::new(5, 3)]);
    }

    #[test]
    fn test_correction_floors_at_zero() {
        let matcher = CannedMatcher { k: 31 };
        let fragment = FragmentMatcher::new(&matcher, 200);

        let mut hits = Vec::new();
        fragment.match_read(&Read::paired("r", "", "FAR"), &mut hits);
        assert_eq!(hits, vec![Hit::new(7, 0)]);
    }

    #[test]
    fn test_hits_do_not_leak_between_reads() {
        let matcher = CannedMatcher { k: 31 };
        let fragment = FragmentMatcher::new(&matcher, 200);

        let mut hits = Vec::new();
        fragment.match_read(&Read::paired("r1", "MATE1", "MATE2"), &mut hits);
        fragment.match_read(&Read::single("r2", "NOTHING"), &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_corrected_position_is_monotone_and_floored() {
        let leftpos = 169;
        let mut previous = i32::MAX;
        for p in 0..400 {
            let corrected = corrected_position(leftpos, p);
            assert!(corrected >= 0);
            assert!(corrected <= previous);
            assert_eq!(corrected, (leftpos - p).max(0));
            previous = corrected;
        }
    }

    #[test]
    fn test_short_fragment_length_gives_negative_leftpos() {
        let matcher = CannedMatcher { k: 31 };
        let fragment = FragmentMatcher::new(&matcher, 20);
        assert_eq!(fragment.leftpos(), -11);

        let mut hits = Vec::new();
        fragment.match_read(&Read::paired("r", "", "MATE2"), &mut hits);
        assert_eq!(hits, vec![Hit::new(5, 0)]);
    }
}
