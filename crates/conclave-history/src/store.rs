use crate::error::HistoryError;
use crate::log::CheckpointLog;
use conclave_types::{Address, Weight};
use std::collections::HashMap;

/// Per-account checkpoint logs behind one keyed API.
///
/// Each vote-power source exclusively owns its store; no two sources share
/// one.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryStore {
    logs: HashMap<Address, CheckpointLog>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `account` at `height`, creating the log on first
    /// write.
    pub fn push(
        &mut self,
        account: Address,
        height: u64,
        value: Weight,
    ) -> Result<(), HistoryError> {
        self.logs.entry(account).or_default().push(height, value)
    }

    /// Historical value for `account` at `height`. Unknown accounts fail
    /// like an empty log.
    pub fn find(&self, account: &Address, height: u64) -> Result<Weight, HistoryError> {
        self.logs
            .get(account)
            .ok_or(HistoryError::SearchFailure)?
            .find(height)
    }

    /// Most recent value for `account`, [`Weight::ZERO`] when none.
    pub fn load_top(&self, account: &Address) -> Weight {
        self.logs
            .get(account)
            .map(CheckpointLog::load_top)
            .unwrap_or(Weight::ZERO)
    }

    /// Bounded compaction of `account`'s stale entries. Unknown accounts
    /// have nothing to purge.
    pub fn clear(&mut self, account: &Address, upper_bound_height: u64, max_purge: usize) -> usize {
        self.logs
            .get_mut(account)
            .map(|log| log.clear(upper_bound_height, max_purge))
            .unwrap_or(0)
    }

    /// `(min_retained_index, slot_count)` for `account`; `(0, 0)` when no
    /// log exists.
    pub fn load_bounds(&self, account: &Address) -> (usize, usize) {
        self.logs
            .get(account)
            .map(CheckpointLog::load_bounds)
            .unwrap_or((0, 0))
    }

    pub fn log(&self, account: &Address) -> Option<&CheckpointLog> {
        self.logs.get(account)
    }
}
