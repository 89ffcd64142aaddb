use conclave_history::HistoryError;
use conclave_types::CallFailure;
use thiserror::Error;

/// Errors raised by vote-power sources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// The account has no checkpoint at or before the queried height.
    #[error("account has no voting power at the queried height")]
    Uninitialized,

    /// Weight arithmetic left the 192-bit range.
    #[error("vote weight out of bounds")]
    OutOfBounds,

    /// Withdrawal larger than the deposited balance.
    #[error("insufficient balance")]
    InsufficientBalance,
}

impl From<HistoryError> for VaultError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::SearchFailure => VaultError::Uninitialized,
            HistoryError::OutOfBounds => VaultError::OutOfBounds,
        }
    }
}

/// Errors that can occur in governance operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("array length mismatch")]
    ArrayLengthMismatch,

    #[error("insufficient voting power")]
    InsufficientVotingPower,

    #[error("proposal would expire before voting ends")]
    ExpiresBeforeVotingEnds,

    #[error("vault is not approved")]
    UnverifiedVault,

    #[error("duplicate vault")]
    DuplicateVault,

    #[error("voting period has expired")]
    Expired,

    #[error("proposal not found: {0}")]
    ProposalNotFound(u64),

    #[error("call batch does not match the proposal's action hash")]
    HashMismatch,

    #[error("proposal was previously executed")]
    PreviouslyExecuted,

    #[error("proposal is not unlocked yet")]
    NotUnlocked,

    #[error("past the proposal's last call height")]
    PastLastCallTimestamp,

    #[error("proposal cannot execute: tally or quorum not met")]
    CannotExecute,

    #[error("sub-call failed: {0}")]
    CallFailed(CallFailure),

    #[error("sender is not the owner")]
    SenderNotOwner,

    #[error("voting vault not approved")]
    VotingVaultNotApproved,

    #[error("not enough votes for membership")]
    NotEnoughVotes,

    #[error("member still meets the membership bound")]
    NotKickable,

    #[error("tally weight out of bounds")]
    OutOfBounds,

    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl From<CallFailure> for GovernanceError {
    fn from(err: CallFailure) -> Self {
        GovernanceError::CallFailed(err)
    }
}
