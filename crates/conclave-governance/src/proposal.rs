//! Proposal state: ballots, tallies, records.

use crate::error::GovernanceError;
use conclave_types::{Address, Hash, Weight};

/// A voter's choice. Wire encoding is fixed: 0 = yes, 1 = no, 2 = abstain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Ballot {
    Yes = 0,
    No = 1,
    Abstain = 2,
}

impl Ballot {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Ballot::Yes),
            1 => Some(Ballot::No),
            2 => Some(Ballot::Abstain),
            _ => None,
        }
    }
}

/// Weighted vote buckets for one proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tally {
    pub yes: Weight,
    pub no: Weight,
    pub abstain: Weight,
}

impl Tally {
    fn bucket_mut(&mut self, ballot: Ballot) -> &mut Weight {
        match ballot {
            Ballot::Yes => &mut self.yes,
            Ballot::No => &mut self.no,
            Ballot::Abstain => &mut self.abstain,
        }
    }

    /// Add `power` to the ballot's bucket.
    pub fn add(&mut self, ballot: Ballot, power: Weight) -> Result<(), GovernanceError> {
        let bucket = self.bucket_mut(ballot);
        *bucket = bucket
            .checked_add(power)
            .ok_or(GovernanceError::OutOfBounds)?;
        Ok(())
    }

    /// Remove a previously added contribution from the ballot's bucket.
    pub fn sub(&mut self, ballot: Ballot, power: Weight) -> Result<(), GovernanceError> {
        let bucket = self.bucket_mut(ballot);
        *bucket = bucket
            .checked_sub(power)
            .ok_or(GovernanceError::OutOfBounds)?;
        Ok(())
    }
}

/// An open proposal.
///
/// `action_hash` is immutable once created; execution must present the
/// exact call batch that hashes to it. The record is deleted when the
/// proposal executes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proposal {
    /// Unique, strictly increasing id.
    pub id: u64,
    /// Height the proposal was created at.
    pub created_at: u64,
    /// Earliest height at which the proposal may execute.
    pub unlock: u64,
    /// Latest height by which the proposal must execute.
    pub last_call: u64,
    /// Effective quorum, resolved at creation against the override map.
    pub quorum: Weight,
    /// Digest of the approved call batch.
    pub action_hash: Hash,
    /// Current weighted buckets.
    pub tally: Tally,
}

/// A voter's current contribution to one proposal.
///
/// Re-voting replaces this record wholesale; the tally always equals the
/// sum of current contributions, never a running total.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoteRecord {
    /// The vault set the contribution was aggregated from.
    pub vaults: Vec<Address>,
    /// Weight contributed.
    pub power: Weight,
    /// Bucket it went to.
    pub ballot: Ballot,
}

/// Ledger-wide voting parameters. Mutated only through the owner-gated
/// setters on the ledger.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerConfig {
    /// Minimum aggregate power required to create a proposal.
    pub min_proposal_power: Weight,
    /// Quorum applied when no override matches.
    pub default_quorum: Weight,
    /// Heights between creation and unlock.
    pub lock_duration: u64,
    /// Heights past creation during which votes are accepted; the
    /// last-call deadline must clear this window.
    pub extra_vote_time: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_proposal_power: Weight::from(10_000u64),
            default_quorum: Weight::from(50_000u64),
            lock_duration: 14_400,   // ~1 day at 6s blocks
            extra_vote_time: 100_800, // ~1 week
        }
    }
}
