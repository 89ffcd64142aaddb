use crate::address::Address;
use crate::hash::Hash;
use std::fmt;
use thiserror::Error;

/// 4-byte action discriminator, taken from the head of a calldata payload.
///
/// Quorum overrides key on `(target, selector)` so governance can demand a
/// different bar for individual privileged entry points.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selector([u8; 4]);

impl Selector {
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Selector of a calldata payload. Payloads shorter than four bytes are
    /// zero-padded, so an empty payload maps to the zero selector.
    pub fn of(calldata: &[u8]) -> Self {
        let mut bytes = [0u8; 4];
        let take = calldata.len().min(4);
        bytes[..take].copy_from_slice(&calldata[..take]);
        Self(bytes)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector(0x{})", hex::encode(self.0))
    }
}

/// Canonical digest of a call batch.
///
/// Encoding: `count ‖ target₂₀* ‖ count ‖ (len ‖ calldata)*`, counts and
/// lengths as little-endian u64. Proposal creation, ledger execution, and
/// timelock registration all hash through here, so the digest is bit-exact
/// across the full authorization path.
pub fn batch_hash(targets: &[Address], calldatas: &[Vec<u8>]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(targets.len() as u64).to_le_bytes());
    for target in targets {
        hasher.update(target.as_bytes());
    }
    hasher.update(&(calldatas.len() as u64).to_le_bytes());
    for calldata in calldatas {
        hasher.update(&(calldata.len() as u64).to_le_bytes());
        hasher.update(calldata);
    }
    Hash::from_bytes(*hasher.finalize().as_bytes())
}

/// A sub-call rejected by the execution environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("call to {target:?} failed: {reason}")]
pub struct CallFailure {
    pub target: Address,
    pub reason: String,
}

impl CallFailure {
    pub fn new(target: Address, reason: impl Into<String>) -> Self {
        Self {
            target,
            reason: reason.into(),
        }
    }
}

/// Execution seam for approved call batches.
///
/// The ledger and the timelock drive their batches through this trait one
/// call at a time and stop at the first failure, leaving their own records
/// untouched. Reverting external effects of a partially-run batch is the
/// implementor's contract; the governance side only guarantees that its
/// bookkeeping is mutated after the whole batch succeeded.
pub trait CallSink {
    fn call(&mut self, target: Address, calldata: &[u8]) -> Result<(), CallFailure>;
}
