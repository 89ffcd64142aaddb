//! Checkpointed historical value store.
//!
//! Every vote-power source keeps one [`CheckpointLog`] per account: an
//! append-only, block-ordered sequence of `(height, value)` records with
//! binary-search lookup and bounded compaction of stale entries. The
//! [`HistoryStore`] keys logs by account behind a single API.
//!
//! Slots are never removed positionally. Compaction zeroes stale slots in
//! place and advances a retained-floor cursor, so indices stay stable for
//! anything that cached them.

pub mod error;
pub mod log;
pub mod store;

pub use error::HistoryError;
pub use log::{Checkpoint, CheckpointLog};
pub use store::HistoryStore;
