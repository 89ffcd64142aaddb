use conclave_types::CallFailure;
use thiserror::Error;

/// Errors that can occur in timelock operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimelockError {
    #[error("sender is not the owner")]
    SenderNotOwner,

    #[error("sender is not an authorized proposer")]
    SenderNotAuthorized,

    #[error("call hash is already registered")]
    AlreadyRegistered,

    #[error("call hash is not registered")]
    NotRegistered,

    #[error("not enough time has passed since registration")]
    NotEnoughTimePassed,

    #[error("sub-call failed: {0}")]
    CallFailed(CallFailure),
}

impl From<CallFailure> for TimelockError {
    fn from(err: CallFailure) -> Self {
        TimelockError::CallFailed(err)
    }
}
