use thiserror::Error;

/// Errors that can occur in checkpoint store operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// A write would break the block-ordering invariant of the log.
    #[error("checkpoint out of bounds")]
    OutOfBounds,

    /// The queried height predates all retained history, or the log holds
    /// no entries at all.
    #[error("no checkpoint at or before the queried height")]
    SearchFailure,
}
