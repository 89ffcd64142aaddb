//! Membership vault: flat voting weight for accounts that prove sustained
//! power across approved sources.
//!
//! A member proves an aggregate weight over the admission bound, waits out
//! an idle period, and then carries a single flat unit of weight. Members
//! whose backing power decays (or whose vaults lose approval) can be kicked
//! by anyone.

use crate::error::{GovernanceError, VaultError};
use crate::vault::{aggregate_power, ensure_distinct, VaultApprovals, VotePowerSource};
use conclave_types::{Address, Tick, Weight};
use std::collections::HashMap;
use tracing::{debug, info};

/// Membership parameters. Mutated only through the owner-gated setters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MembershipConfig {
    /// Aggregate power required to join and to stay.
    pub voting_power_bound: Weight,
    /// Seconds before a new member's weight activates.
    pub idle_duration: u64,
    /// The owner's standing weight.
    pub owner_weight: Weight,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            voting_power_bound: Weight::from(100_000u64),
            idle_duration: 60 * 60 * 24 * 4, // 4 days
            owner_weight: Weight::from(100_000u64),
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Member {
    /// Timestamp of first admission; never refreshed.
    joined_at: u64,
    /// The sources the member last proved power against.
    vaults: Vec<Address>,
}

/// A [`VotePowerSource`] granting flat weight to proven members.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MembershipVault {
    address: Address,
    owner: Address,
    config: MembershipConfig,
    members: HashMap<Address, Member>,
}

impl MembershipVault {
    pub fn new(address: Address, owner: Address, config: MembershipConfig) -> Self {
        Self {
            address,
            owner,
            config,
            members: HashMap::new(),
        }
    }

    /// Admit the caller, or refresh an existing member's vault list.
    ///
    /// Power is summed across `sources` at the live height and must clear
    /// the admission bound. A refresh never moves `joined_at`, so proving
    /// again cannot restart the idle clock.
    pub fn prove_membership(
        &mut self,
        caller: Address,
        sources: &[&dyn VotePowerSource],
        extra_data: &[Vec<u8>],
        approvals: &dyn VaultApprovals,
        tick: Tick,
    ) -> Result<(), GovernanceError> {
        if sources.len() != extra_data.len() {
            return Err(GovernanceError::ArrayLengthMismatch);
        }
        let addresses: Vec<Address> = sources.iter().map(|s| s.address()).collect();
        ensure_distinct(&addresses)?;
        for address in &addresses {
            if !approvals.is_approved(address) {
                return Err(GovernanceError::VotingVaultNotApproved);
            }
        }

        let total = aggregate_power(sources.iter().copied(), extra_data, caller, tick)?;
        if total < self.config.voting_power_bound {
            return Err(GovernanceError::NotEnoughVotes);
        }

        match self.members.get_mut(&caller) {
            Some(member) => {
                member.vaults = addresses;
                debug!(member = %caller, "membership refreshed");
            }
            None => {
                self.members.insert(
                    caller,
                    Member {
                        joined_at: tick.timestamp,
                        vaults: addresses,
                    },
                );
                info!(member = %caller, timestamp = tick.timestamp, "member admitted");
            }
        }
        Ok(())
    }

    /// Expel a member that no longer clears the bound.
    ///
    /// `sources` must be handles for exactly the member's stored vault
    /// list. A stored vault that lost approval contributes nothing, as does
    /// one that no longer knows the account; if what remains still clears
    /// the bound the member stays and the call fails `NotKickable`.
    pub fn kick(
        &mut self,
        account: Address,
        sources: &[&dyn VotePowerSource],
        extra_data: &[Vec<u8>],
        approvals: &dyn VaultApprovals,
        tick: Tick,
    ) -> Result<(), GovernanceError> {
        let member = self
            .members
            .get(&account)
            .ok_or(GovernanceError::NotKickable)?;
        if sources.len() != extra_data.len() {
            return Err(GovernanceError::ArrayLengthMismatch);
        }
        let addresses: Vec<Address> = sources.iter().map(|s| s.address()).collect();
        if addresses != member.vaults {
            return Err(GovernanceError::UnverifiedVault);
        }

        let mut total = Weight::ZERO;
        for (source, proof) in sources.iter().zip(extra_data) {
            if !approvals.is_approved(&source.address()) {
                continue;
            }
            let power = match source.query_vote_power(account, tick, proof) {
                Ok(power) => power,
                Err(VaultError::Uninitialized) => Weight::ZERO,
                Err(err) => return Err(err.into()),
            };
            total = total
                .checked_add(power)
                .ok_or(GovernanceError::OutOfBounds)?;
        }

        if total >= self.config.voting_power_bound {
            return Err(GovernanceError::NotKickable);
        }
        self.members.remove(&account);
        info!(member = %account, "member kicked");
        Ok(())
    }

    pub fn is_member(&self, account: &Address) -> bool {
        self.members.contains_key(account)
    }

    pub fn joined_at(&self, account: &Address) -> Option<u64> {
        self.members.get(account).map(|m| m.joined_at)
    }

    pub fn member_vaults(&self, account: &Address) -> Option<&[Address]> {
        self.members.get(account).map(|m| m.vaults.as_slice())
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), GovernanceError> {
        if caller != self.owner {
            return Err(GovernanceError::SenderNotOwner);
        }
        Ok(())
    }

    pub fn set_voting_power_bound(
        &mut self,
        caller: Address,
        bound: Weight,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.config.voting_power_bound = bound;
        Ok(())
    }

    pub fn set_idle_duration(
        &mut self,
        caller: Address,
        seconds: u64,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.config.idle_duration = seconds;
        Ok(())
    }

    pub fn set_owner(&mut self, caller: Address, owner: Address) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        self.owner = owner;
        Ok(())
    }
}

impl VotePowerSource for MembershipVault {
    fn address(&self) -> Address {
        self.address
    }

    /// Flat unit weight once the idle period has passed; the owner always
    /// carries the configured standing weight; everyone else is zero.
    fn query_vote_power(
        &self,
        account: Address,
        tick: Tick,
        _extra: &[u8],
    ) -> Result<Weight, VaultError> {
        if account == self.owner {
            return Ok(self.config.owner_weight);
        }
        match self.members.get(&account) {
            Some(member)
                if tick.timestamp >= member.joined_at.saturating_add(self.config.idle_duration) =>
            {
                Ok(Weight::ONE)
            }
            _ => Ok(Weight::ZERO),
        }
    }
}
