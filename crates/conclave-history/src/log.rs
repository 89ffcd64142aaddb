use crate::error::HistoryError;
use conclave_types::Weight;

/// A single `(height, value)` record in a historical store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Checkpoint {
    pub height: u64,
    pub value: Weight,
}

/// Append-only log of checkpoints for one account.
///
/// Heights strictly increase across stored entries, except that repeated
/// writes within one height collapse into a single entry holding the latest
/// value. Stale entries are purged by [`CheckpointLog::clear`], which zeroes
/// slots in place and advances the retained floor without moving anything.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CheckpointLog {
    slots: Vec<Checkpoint>,
    min_retained: usize,
}

impl CheckpointLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` at `height`.
    ///
    /// Merges into the top entry when `height` matches it; otherwise
    /// appends. A height below the top entry is rejected with
    /// [`HistoryError::OutOfBounds`]; the log is block-ordered.
    pub fn push(&mut self, height: u64, value: Weight) -> Result<(), HistoryError> {
        if let Some(top) = self.slots.last_mut() {
            if top.height == height {
                top.value = value;
                return Ok(());
            }
            if top.height > height {
                return Err(HistoryError::OutOfBounds);
            }
        }
        self.slots.push(Checkpoint { height, value });
        Ok(())
    }

    /// Value of the greatest retained height at or below `height`.
    ///
    /// Fails with [`HistoryError::SearchFailure`] when the log is empty or
    /// `height` predates the first retained entry.
    pub fn find(&self, height: u64) -> Result<Weight, HistoryError> {
        let retained = &self.slots[self.min_retained..];
        let first = retained.first().ok_or(HistoryError::SearchFailure)?;
        if height < first.height {
            return Err(HistoryError::SearchFailure);
        }
        let at_or_before = retained.partition_point(|c| c.height <= height);
        Ok(retained[at_or_before - 1].value)
    }

    /// Value of the most recent entry, or [`Weight::ZERO`] when the log is
    /// empty.
    pub fn load_top(&self) -> Weight {
        self.slots
            .last()
            .map(|c| c.value)
            .unwrap_or(Weight::ZERO)
    }

    /// Purge retained entries with height strictly below
    /// `upper_bound_height`, keeping the most recent of them as the new
    /// retained floor so lookups at or above the floor stay answerable.
    ///
    /// At most `max_purge` entries are purged per call; callers pick the
    /// step size their budget allows. Purged slots are zeroed in place and
    /// the cursor advances by exactly the number purged. The log is never
    /// emptied. Returns the number of entries purged.
    pub fn clear(&mut self, upper_bound_height: u64, max_purge: usize) -> usize {
        let retained = &self.slots[self.min_retained..];
        let below = retained.partition_point(|c| c.height < upper_bound_height);
        if below <= 1 {
            // Nothing below the bound, or only the entry that becomes the
            // new floor.
            return 0;
        }
        let purge = (below - 1).min(max_purge);
        let new_min = self.min_retained + purge;
        for slot in &mut self.slots[self.min_retained..new_min] {
            *slot = Checkpoint::default();
        }
        self.min_retained = new_min;
        purge
    }

    /// `(min_retained_index, slot_count)`.
    pub fn load_bounds(&self) -> (usize, usize) {
        (self.min_retained, self.slots.len())
    }

    /// Number of entries still retained.
    pub fn retained_len(&self) -> usize {
        self.slots.len() - self.min_retained
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn w(n: u64) -> Weight {
        Weight::from(n)
    }

    #[test]
    fn empty_log_fails_lookup() {
        let log = CheckpointLog::new();
        assert_eq!(log.find(0), Err(HistoryError::SearchFailure));
        assert_eq!(log.load_top(), Weight::ZERO);
        assert_eq!(log.load_bounds(), (0, 0));
    }

    #[test]
    fn same_height_merges() {
        let mut log = CheckpointLog::new();
        log.push(10, w(5)).unwrap();
        log.push(10, w(7)).unwrap();
        log.push(11, w(9)).unwrap();

        assert_eq!(log.load_bounds(), (0, 2));
        assert_eq!(log.find(10).unwrap(), w(7));
        assert_eq!(log.find(11).unwrap(), w(9));
        assert_eq!(log.load_top(), w(9));
    }

    #[test]
    fn rejects_out_of_order_push() {
        let mut log = CheckpointLog::new();
        log.push(10, w(1)).unwrap();
        assert_eq!(log.push(9, w(2)), Err(HistoryError::OutOfBounds));
    }

    #[test]
    fn find_floors_between_checkpoints() {
        let mut log = CheckpointLog::new();
        log.push(10, w(1)).unwrap();
        log.push(20, w(2)).unwrap();
        log.push(30, w(3)).unwrap();

        assert_eq!(log.find(9), Err(HistoryError::SearchFailure));
        assert_eq!(log.find(10).unwrap(), w(1));
        assert_eq!(log.find(19).unwrap(), w(1));
        assert_eq!(log.find(20).unwrap(), w(2));
        assert_eq!(log.find(29).unwrap(), w(2));
        assert_eq!(log.find(1_000).unwrap(), w(3));
    }

    #[test]
    fn clear_advances_floor_and_keeps_lookups() {
        let mut log = CheckpointLog::new();
        for (h, v) in [(10, 1), (20, 2), (30, 3), (40, 4)] {
            log.push(h, w(v)).unwrap();
        }

        // Entries at 10 and 20 are below the bound; 20 survives as the
        // new floor.
        let purged = log.clear(25, usize::MAX);
        assert_eq!(purged, 1);
        assert_eq!(log.load_bounds(), (1, 4));
        assert_eq!(log.find(9), Err(HistoryError::SearchFailure));
        assert_eq!(log.find(19), Err(HistoryError::SearchFailure));
        assert_eq!(log.find(20).unwrap(), w(2));
        assert_eq!(log.find(25).unwrap(), w(2));
        assert_eq!(log.find(40).unwrap(), w(4));
    }

    #[test]
    fn clear_never_empties() {
        let mut log = CheckpointLog::new();
        log.push(10, w(1)).unwrap();
        log.push(20, w(2)).unwrap();

        // Bound above everything: only the most recent entry survives.
        let purged = log.clear(u64::MAX, usize::MAX);
        assert_eq!(purged, 1);
        assert_eq!(log.retained_len(), 1);
        assert_eq!(log.find(20).unwrap(), w(2));

        // A second clear has nothing left to purge.
        assert_eq!(log.clear(u64::MAX, usize::MAX), 0);
        assert_eq!(log.retained_len(), 1);
    }

    #[test]
    fn clear_respects_purge_budget() {
        let mut log = CheckpointLog::new();
        for h in 1..=10u64 {
            log.push(h, w(h)).unwrap();
        }

        // 9 entries are purgeable below the bound, budget allows 3 per call.
        assert_eq!(log.clear(u64::MAX, 3), 3);
        assert_eq!(log.load_bounds(), (3, 10));
        assert_eq!(log.clear(u64::MAX, 3), 3);
        assert_eq!(log.clear(u64::MAX, 3), 3);
        assert_eq!(log.clear(u64::MAX, 3), 0);
        assert_eq!(log.load_bounds(), (9, 10));
        assert_eq!(log.find(10).unwrap(), w(10));
    }

    #[test]
    fn slot_count_is_stable_across_clear() {
        let mut log = CheckpointLog::new();
        for h in 1..=5u64 {
            log.push(h * 10, w(h)).unwrap();
        }
        let (_, len_before) = log.load_bounds();
        log.clear(45, usize::MAX);
        let (min, len_after) = log.load_bounds();
        assert_eq!(len_before, len_after);
        assert_eq!(min, 3);
    }

    proptest! {
        /// `find` always returns the value of the greatest retained height
        /// at or below the query, under arbitrary push/clear interleaving.
        #[test]
        fn find_matches_linear_scan(
            heights in proptest::collection::vec(0u64..500, 1..40),
            query in 0u64..600,
            bound in 0u64..600,
            budget in 0usize..8,
        ) {
            let mut log = CheckpointLog::new();
            let mut sorted = heights.clone();
            sorted.sort_unstable();
            for (i, h) in sorted.iter().enumerate() {
                log.push(*h, w(i as u64 + 1)).unwrap();
            }
            log.clear(bound, budget);

            let (min, len) = log.load_bounds();
            prop_assert!(min < len);

            // Reference: scan the retained suffix linearly.
            let retained: Vec<u64> = {
                let mut hs: Vec<u64> = sorted.clone();
                hs.dedup();
                hs[hs.len() - (len - min)..].to_vec()
            };
            let expect = retained.iter().rev().find(|h| **h <= query);
            match (log.find(query), expect) {
                (Ok(_), Some(_)) => {}
                (Err(HistoryError::SearchFailure), None) => {}
                (got, want) => prop_assert!(false, "got {:?}, want {:?}", got, want),
            }
        }
    }
}
