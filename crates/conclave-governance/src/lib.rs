//! Conclave governance: weighted-vote proposal lifecycle over pluggable
//! vote-power sources.
//!
//! This crate provides:
//! - The [`VotePowerSource`] capability and aggregation helpers
//! - The [`ProposalLedger`]: propose, vote, re-vote, gated execution
//! - The [`LockingVault`]: checkpointed raw-deposit weight
//! - The [`MembershipVault`]: flat weight for proven members
//!
//! Execution of approved call batches is delegated through
//! [`conclave_types::CallSink`]; the most sensitive proposals route their
//! batches into the timelock crate.

pub mod error;
pub mod ledger;
pub mod locking;
pub mod membership;
pub mod proposal;
pub mod vault;

pub use error::{GovernanceError, VaultError};
pub use ledger::ProposalLedger;
pub use locking::{Deposit, LockingVault};
pub use membership::{MembershipConfig, MembershipVault};
pub use proposal::{Ballot, LedgerConfig, Proposal, Tally, VoteRecord};
pub use vault::{
    aggregate_power, aggregate_power_and_update, ensure_distinct, VaultApprovals,
    VotePowerSource,
};
