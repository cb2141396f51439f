use serde::Serialize;

/// Identifier of an equivalence class in the index or collector class table
pub type EcId = u32;

/// Render an optional class id the way the counts and logs show it (`-1` for none)
#[must_use]
pub fn display_ec(ec: Option<EcId>) -> i64 {
    ec.map_or(-1, i64::from)
}

/// A single k-mer hit produced by a [`Matcher`](crate::index::Matcher)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Hit {
    /// Transcript id in the index's transcript table
    pub transcript_id: u32,

    /// Offset of the k-mer, in mate1's coordinate frame once corrected
    pub position: i32,

    /// Ordinal of the matched k-mer window within the read. Every hit of
    /// one window shares it; it keeps counting across mates and is never
    /// touched by position correction.
    pub kmer: u32,
}

impl Hit {
    /// Hit in the first matched window of a read
    #[must_use]
    pub fn new(transcript_id: u32, position: i32) -> Self {
        Self::in_window(transcript_id, position, 0)
    }

    #[must_use]
    pub fn in_window(transcript_id: u32, position: i32, kmer: u32) -> Self {
        Self {
            transcript_id,
            position,
            kmer,
        }
    }
}

/// Per-read scratch buffer of hits.
///
/// The pipeline owns exactly one of these and clears it before every read,
/// so hits never leak from one read into the next.
pub type HitSet = Vec<Hit>;

/// One logical read: a single sequence or a mate pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Read {
    /// Identity token (read name), if the source provides one
    pub name: Vec<u8>,

    /// First mate, in original read orientation
    pub mate1: Vec<u8>,

    /// Second mate for paired reads. May be present but empty when an
    /// alignment group claimed to be paired and never supplied the mate.
    pub mate2: Option<Vec<u8>>,
}

impl Read {
    #[must_use]
    pub fn single(name: impl Into<Vec<u8>>, mate1: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mate1: mate1.into(),
            mate2: None,
        }
    }

    #[must_use]
    pub fn paired(
        name: impl Into<Vec<u8>>,
        mate1: impl Into<Vec<u8>>,
        mate2: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            mate1: mate1.into(),
            mate2: Some(mate2.into()),
        }
    }

    /// Read name as text, for log messages
    #[must_use]
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_ec() {
        assert_eq!(display_ec(None), -1);
        assert_eq!(display_ec(Some(0)), 0);
        assert_eq!(display_ec(Some(42)), 42);
    }

    #[test]
    fn test_hit_new_is_first_window() {
        assert_eq!(Hit::new(3, 17), Hit::in_window(3, 17, 0));
        assert_ne!(Hit::in_window(3, 17, 1), Hit::new(3, 17));
    }
}
