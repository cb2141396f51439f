use std::collections::HashMap;

use crate::core::types::EcId;

/// Two-way equivalence class table.
///
/// Ids `0..n_transcripts` are the singleton classes `{t}`; every other class
/// gets the next free id in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EcMap {
    classes: Vec<Vec<u32>>,
    inverse: HashMap<Vec<u32>, EcId>,
}

impl EcMap {
    /// Create a table holding one singleton class per transcript
    #[must_use]
    pub fn with_singletons(n_transcripts: usize) -> Self {
        let mut map = Self::default();
        for tid in (0u32..).take(n_transcripts) {
            map.insert(vec![tid]);
        }
        map
    }

    /// Return the id of `members`, registering it if unseen.
    ///
    /// `members` must be sorted and free of duplicates.
    pub fn insert(&mut self, members: Vec<u32>) -> EcId {
        debug_assert!(members.windows(2).all(|w| w[0] < w[1]));
        if let Some(&ec) = self.inverse.get(&members) {
            return ec;
        }
        #[allow(clippy::cast_possible_truncation)]
        let ec = self.classes.len() as EcId;
        self.inverse.insert(members.clone(), ec);
        self.classes.push(members);
        ec
    }

    #[must_use]
    pub fn find(&self, members: &[u32]) -> Option<EcId> {
        self.inverse.get(members).copied()
    }

    #[must_use]
    pub fn members(&self, ec: EcId) -> Option<&[u32]> {
        self.classes.get(ec as usize).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons_come_first() {
        let map = EcMap::with_singletons(3);
        assert_eq!(map.len(), 3);
        assert_eq!(map.find(&[0]), Some(0));
        assert_eq!(map.find(&[2]), Some(2));
        assert_eq!(map.members(1), Some(&[1][..]));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut map = EcMap::with_singletons(3);
        let ec = map.insert(vec![0, 2]);
        assert_eq!(ec, 3);
        assert_eq!(map.insert(vec![0, 2]), 3);
        assert_eq!(map.insert(vec![1]), 1);
        assert_eq!(map.len(), 4);
        assert_eq!(map.find(&[0, 1]), None);
    }
}
