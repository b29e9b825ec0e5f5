//! Thread-safe cache of the sides taken by freshly recorded opportunities.
//!
//! Filled by the ledger after a commit so a caller serving the record back
//! does not need another query. Cleared at the start of every batch run.
//! The store remains the source of truth; this cache is never used to
//! decide whether an opportunity already exists.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::{ArbitrageId, RecordedSides};

#[derive(Debug, Default)]
pub struct SidesCache {
    entries: RwLock<HashMap<ArbitrageId, RecordedSides>>,
}

impl SidesCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: ArbitrageId, sides: RecordedSides) {
        self.entries.write().insert(id, sides);
    }

    #[must_use]
    pub fn get(&self, id: ArbitrageId) -> Option<RecordedSides> {
        self.entries.read().get(&id).copied()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BetSide;

    #[test]
    fn insert_get_and_clear() {
        let cache = SidesCache::new();
        let sides = RecordedSides {
            side_1: BetSide::Yes,
            side_2: BetSide::No,
        };
        cache.insert(ArbitrageId::new(7), sides);

        assert_eq!(cache.get(ArbitrageId::new(7)), Some(sides));
        assert_eq!(cache.get(ArbitrageId::new(8)), None);

        cache.clear();
        assert!(cache.is_empty());
    }
}
