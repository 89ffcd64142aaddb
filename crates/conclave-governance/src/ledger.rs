//! The proposal ledger: creation, weighted voting, gated execution.

use crate::error::GovernanceError;
use crate::proposal::{Ballot, LedgerConfig, Proposal, Tally, VoteRecord};
use crate::vault::{
    aggregate_power, aggregate_power_and_update, ensure_distinct, VaultApprovals,
    VotePowerSource,
};
use conclave_types::{batch_hash, Address, CallSink, Selector, Tick, Weight};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Orchestrates the proposal lifecycle over caller-chosen vote-power
/// sources.
///
/// Authority model: `owner` (normally the timelock) is the only caller
/// accepted by the setters. Everything else is open: any account may
/// propose, vote, or execute, subject to the checks below.
#[derive(Default)]
pub struct ProposalLedger {
    owner: Address,
    config: LedgerConfig,
    /// Quorum overrides keyed by `(target, selector)`.
    custom_quorums: HashMap<(Address, Selector), Weight>,
    /// Vault identities accepted in `propose`/`vote`.
    approved_vaults: HashSet<Address>,
    proposals: HashMap<u64, Proposal>,
    /// Current contribution per `(proposal, voter)`.
    votes: HashMap<(u64, Address), VoteRecord>,
    proposal_count: u64,
}

impl ProposalLedger {
    pub fn new(owner: Address, config: LedgerConfig) -> Self {
        Self {
            owner,
            config,
            ..Self::default()
        }
    }

    /// Create a proposal over `(targets, calldatas)` and cast the
    /// proposer's own ballot.
    ///
    /// Proposer power is snapshotted one height before `tick` through the
    /// updating query, so power moved within the proposal block cannot
    /// meet the bar. The ballot itself is cast at the live height, exactly
    /// as a `vote` call would.
    #[allow(clippy::too_many_arguments)]
    pub fn propose(
        &mut self,
        caller: Address,
        vaults: &mut [&mut dyn VotePowerSource],
        extra_data: &[Vec<u8>],
        targets: &[Address],
        calldatas: &[Vec<u8>],
        last_call: u64,
        ballot: Ballot,
        tick: Tick,
    ) -> Result<u64, GovernanceError> {
        if targets.len() != calldatas.len() || vaults.len() != extra_data.len() {
            return Err(GovernanceError::ArrayLengthMismatch);
        }
        let addresses: Vec<Address> = vaults.iter().map(|v| v.address()).collect();
        self.check_vault_set(&addresses)?;

        if last_call < tick.height.saturating_add(self.config.extra_vote_time) {
            return Err(GovernanceError::ExpiresBeforeVotingEnds);
        }
        let quorum = self.resolve_quorum(targets, calldatas);

        let snapshot = Tick::new(tick.height.saturating_sub(1), tick.timestamp);
        let proposer_power =
            aggregate_power_and_update(vaults, extra_data, caller, snapshot)?;
        if proposer_power < self.config.min_proposal_power {
            return Err(GovernanceError::InsufficientVotingPower);
        }

        let live_power = aggregate_power(
            vaults.iter().map(|v| &**v as &dyn VotePowerSource),
            extra_data,
            caller,
            tick,
        )?;
        if live_power.is_zero() {
            return Err(GovernanceError::InsufficientVotingPower);
        }

        let mut tally = Tally::default();
        tally.add(ballot, live_power)?;

        let id = self.proposal_count;
        self.proposal_count += 1;
        self.proposals.insert(
            id,
            Proposal {
                id,
                created_at: tick.height,
                unlock: tick.height.saturating_add(self.config.lock_duration),
                last_call,
                quorum,
                action_hash: batch_hash(targets, calldatas),
                tally,
            },
        );
        self.votes.insert(
            (id, caller),
            VoteRecord {
                vaults: addresses,
                power: live_power,
                ballot,
            },
        );

        info!(
            proposal = id,
            height = tick.height,
            quorum = %quorum,
            "proposal created"
        );
        Ok(id)
    }

    /// Cast or replace the caller's vote on an open proposal.
    ///
    /// A prior contribution is subtracted from its bucket before the fresh
    /// aggregate is added, so the tally always equals the sum of each
    /// voter's current contribution.
    pub fn vote(
        &mut self,
        caller: Address,
        vaults: &[&dyn VotePowerSource],
        extra_data: &[Vec<u8>],
        proposal_id: u64,
        ballot: Ballot,
        tick: Tick,
    ) -> Result<(), GovernanceError> {
        if vaults.len() != extra_data.len() {
            return Err(GovernanceError::ArrayLengthMismatch);
        }
        let addresses: Vec<Address> = vaults.iter().map(|v| v.address()).collect();
        self.check_vault_set(&addresses)?;

        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
        if tick.height > proposal.created_at.saturating_add(self.config.extra_vote_time) {
            return Err(GovernanceError::Expired);
        }

        let power = aggregate_power(vaults.iter().copied(), extra_data, caller, tick)?;
        if power.is_zero() {
            return Err(GovernanceError::InsufficientVotingPower);
        }

        let mut tally = proposal.tally;
        if let Some(prev) = self.votes.get(&(proposal_id, caller)) {
            tally.sub(prev.ballot, prev.power)?;
        }
        tally.add(ballot, power)?;
        proposal.tally = tally;
        self.votes.insert(
            (proposal_id, caller),
            VoteRecord {
                vaults: addresses,
                power,
                ballot,
            },
        );

        debug!(proposal = proposal_id, voter = %caller, power = %power, "vote recorded");
        Ok(())
    }

    /// Execute a passed proposal's call batch through `sink`.
    ///
    /// The supplied batch must hash to the proposal's action hash. Calls
    /// run in order; the first failure aborts with ledger state untouched.
    /// Success consumes the proposal record.
    pub fn execute(
        &mut self,
        proposal_id: u64,
        targets: &[Address],
        calldatas: &[Vec<u8>],
        tick: Tick,
        sink: &mut dyn CallSink,
    ) -> Result<(), GovernanceError> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(GovernanceError::PreviouslyExecuted)?;
        if batch_hash(targets, calldatas) != proposal.action_hash {
            return Err(GovernanceError::HashMismatch);
        }
        if tick.height < proposal.unlock {
            return Err(GovernanceError::NotUnlocked);
        }
        if tick.height > proposal.last_call {
            return Err(GovernanceError::PastLastCallTimestamp);
        }
        let passing =
            proposal.tally.yes > proposal.tally.no && proposal.tally.yes >= proposal.quorum;
        if !passing {
            return Err(GovernanceError::CannotExecute);
        }

        for (target, calldata) in targets.iter().zip(calldatas) {
            sink.call(*target, calldata)?;
        }

        self.proposals.remove(&proposal_id);
        self.votes.retain(|(pid, _), _| *pid != proposal_id);
        info!(proposal = proposal_id, height = tick.height, "proposal executed");
        Ok(())
    }

    /// Effective quorum: the minimum of the default and every override
    /// matching a `(target, selector)` pair the batch touches.
    fn resolve_quorum(&self, targets: &[Address], calldatas: &[Vec<u8>]) -> Weight {
        let mut quorum = self.config.default_quorum;
        for (target, calldata) in targets.iter().zip(calldatas) {
            if let Some(q) = self.custom_quorums.get(&(*target, Selector::of(calldata))) {
                quorum = quorum.min(*q);
            }
        }
        quorum
    }

    fn check_vault_set(&self, addresses: &[Address]) -> Result<(), GovernanceError> {
        ensure_distinct(addresses)?;
        for address in addresses {
            if !self.approved_vaults.contains(address) {
                return Err(GovernanceError::UnverifiedVault);
            }
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), GovernanceError> {
        if caller != self.owner {
            return Err(GovernanceError::SenderNotOwner);
        }
        Ok(())
    }

    // Owner-gated configuration. The owner is normally the timelock, so
    // every change below rides through a governance round itself.

    pub fn set_min_proposal_power(
        &mut self,
        caller: Address,
        power: Weight,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.config.min_proposal_power = power;
        Ok(())
    }

    pub fn set_default_quorum(
        &mut self,
        caller: Address,
        quorum: Weight,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.config.default_quorum = quorum;
        Ok(())
    }

    pub fn set_lock_duration(
        &mut self,
        caller: Address,
        heights: u64,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.config.lock_duration = heights;
        Ok(())
    }

    /// Override the quorum for one `(target, selector)` pair.
    pub fn set_custom_quorum(
        &mut self,
        caller: Address,
        target: Address,
        selector: Selector,
        quorum: Weight,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.custom_quorums.insert((target, selector), quorum);
        Ok(())
    }

    /// Admit or expel a vault from the approved set.
    pub fn change_vault_status(
        &mut self,
        caller: Address,
        vault: Address,
        approved: bool,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        if approved {
            self.approved_vaults.insert(vault);
        } else {
            self.approved_vaults.remove(&vault);
        }
        debug!(vault = %vault, approved, "vault status changed");
        Ok(())
    }

    pub fn change_extra_voting_time(
        &mut self,
        caller: Address,
        heights: u64,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.config.extra_vote_time = heights;
        Ok(())
    }

    pub fn set_owner(&mut self, caller: Address, owner: Address) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.owner = owner;
        Ok(())
    }

    // Read-only views.

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn proposal(&self, id: u64) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn vote_record(&self, proposal_id: u64, voter: &Address) -> Option<&VoteRecord> {
        self.votes.get(&(proposal_id, *voter))
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }
}

impl VaultApprovals for ProposalLedger {
    fn is_approved(&self, vault: &Address) -> bool {
        self.approved_vaults.contains(vault)
    }
}
