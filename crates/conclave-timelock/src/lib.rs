//! Delay-gated, replay-protected execution of approved call batches.
//!
//! The timelock stores only the blake3 digest of each pending batch, one
//! record per action, yet still guarantees the executed payload is exactly
//! what was approved, because execution recomputes the digest from the
//! presented batch and demands an exact match. A registered digest becomes
//! executable once the wait period elapses, runs at most once per
//! registration, and is then marked consumed.

pub mod error;

pub use error::TimelockError;

use conclave_types::{batch_hash, Address, CallSink, Hash, Tick};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Lifecycle of a registered call digest.
///
/// Absence from the map means "never registered"; the explicit tag keeps
/// that distinct from "already executed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallState {
    /// Registered and waiting out the delay.
    Pending { registered_at: u64 },
    /// Executed; a fresh registration is required to run again.
    Consumed,
}

/// Hash-registered one-shot executor.
///
/// Normally owned by governance itself: the proposal ledger registers
/// digests as one of its executed calls, and the ledger's own configuration
/// lives behind this delay.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timelock {
    owner: Address,
    /// Seconds between registration and earliest execution.
    wait_time: u64,
    /// Accounts allowed to register call digests.
    authorized: HashSet<Address>,
    calls: HashMap<Hash, CallState>,
}

impl Timelock {
    pub fn new(owner: Address, wait_time: u64) -> Self {
        Self {
            owner,
            wait_time,
            authorized: HashSet::new(),
            calls: HashMap::new(),
        }
    }

    /// Register a call digest for execution after the wait period.
    ///
    /// Only authorized proposers may register. A digest already pending is
    /// rejected; a consumed digest may be registered again; replay
    /// protection is one execution per registration, not forever.
    pub fn register_call(
        &mut self,
        caller: Address,
        call_hash: Hash,
        now: u64,
    ) -> Result<(), TimelockError> {
        if !self.authorized.contains(&caller) {
            return Err(TimelockError::SenderNotAuthorized);
        }
        if let Some(CallState::Pending { .. }) = self.calls.get(&call_hash) {
            return Err(TimelockError::AlreadyRegistered);
        }
        self.calls
            .insert(call_hash, CallState::Pending { registered_at: now });
        info!(hash = %call_hash, timestamp = now, "call registered");
        Ok(())
    }

    /// Withdraw a pending registration before it executes.
    pub fn stop_call(&mut self, caller: Address, call_hash: Hash) -> Result<(), TimelockError> {
        self.ensure_owner(caller)?;
        match self.calls.get(&call_hash) {
            Some(CallState::Pending { .. }) => {
                self.calls.remove(&call_hash);
                debug!(hash = %call_hash, "call stopped");
                Ok(())
            }
            _ => Err(TimelockError::NotRegistered),
        }
    }

    /// Execute a registered batch.
    ///
    /// The digest is recomputed from the presented batch; no registration
    /// (or a consumed one) fails `NotRegistered`, and execution before
    /// `registered_at + wait_time` fails `NotEnoughTimePassed`. Calls run
    /// in order through `sink`; the first failure aborts with the record
    /// left pending. Success consumes the registration.
    pub fn execute(
        &mut self,
        targets: &[Address],
        calldatas: &[Vec<u8>],
        tick: Tick,
        sink: &mut dyn CallSink,
    ) -> Result<(), TimelockError> {
        let call_hash = batch_hash(targets, calldatas);
        let registered_at = match self.calls.get(&call_hash) {
            Some(CallState::Pending { registered_at }) => *registered_at,
            _ => return Err(TimelockError::NotRegistered),
        };
        if tick.timestamp < registered_at.saturating_add(self.wait_time) {
            return Err(TimelockError::NotEnoughTimePassed);
        }

        for (target, calldata) in targets.iter().zip(calldatas) {
            sink.call(*target, calldata)?;
        }

        self.calls.insert(call_hash, CallState::Consumed);
        info!(hash = %call_hash, timestamp = tick.timestamp, "call batch executed");
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), TimelockError> {
        if caller != self.owner {
            return Err(TimelockError::SenderNotOwner);
        }
        Ok(())
    }

    pub fn set_wait_time(&mut self, caller: Address, seconds: u64) -> Result<(), TimelockError> {
        self.ensure_owner(caller)?;
        self.wait_time = seconds;
        Ok(())
    }

    /// Allow `who` to register call digests.
    pub fn authorize(&mut self, caller: Address, who: Address) -> Result<(), TimelockError> {
        self.ensure_owner(caller)?;
        self.authorized.insert(who);
        Ok(())
    }

    pub fn deauthorize(&mut self, caller: Address, who: Address) -> Result<(), TimelockError> {
        self.ensure_owner(caller)?;
        self.authorized.remove(&who);
        Ok(())
    }

    pub fn set_owner(&mut self, caller: Address, owner: Address) -> Result<(), TimelockError> {
        self.ensure_owner(caller)?;
        self.owner = owner;
        Ok(())
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn wait_time(&self) -> u64 {
        self.wait_time
    }

    pub fn is_authorized(&self, who: &Address) -> bool {
        self.authorized.contains(who)
    }

    pub fn call_state(&self, call_hash: &Hash) -> Option<CallState> {
        self.calls.get(call_hash).copied()
    }
}
