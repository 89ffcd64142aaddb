//! The vote-power capability.
//!
//! Any vault-like component that can answer "what was this account's weight
//! at height H" implements [`VotePowerSource`]. The ledger holds only trait
//! handles, never concrete vault types; callers pick the sources per call.

use crate::error::{GovernanceError, VaultError};
use conclave_types::{Address, Tick, Weight};
use std::collections::HashSet;

/// A component answering weighted vote-power queries.
pub trait VotePowerSource {
    /// Identity of this source; the ledger's approved-vault set and the
    /// membership vault's stored lists key on it.
    fn address(&self) -> Address;

    /// The account's weight at `tick`, given source-specific proof data.
    ///
    /// Pure. Fails with [`VaultError::Uninitialized`] when the account has
    /// no checkpoint at or before the queried height. Sources that need no
    /// proof ignore `extra`.
    fn query_vote_power(
        &self,
        account: Address,
        tick: Tick,
        extra: &[u8],
    ) -> Result<Weight, VaultError>;

    /// Same query, but the source may first materialize derived
    /// bookkeeping so later pure queries are cheap. The ledger calls this
    /// during proposal submission.
    fn query_vote_power_and_update(
        &mut self,
        account: Address,
        tick: Tick,
        extra: &[u8],
    ) -> Result<Weight, VaultError> {
        self.query_vote_power(account, tick, extra)
    }
}

/// Read-only view of an approved-vault set.
///
/// The membership vault validates its backing sources against the ledger's
/// set through this seam instead of holding the ledger itself.
pub trait VaultApprovals {
    fn is_approved(&self, vault: &Address) -> bool;
}

/// Reject duplicate vault identities in a caller-supplied list.
pub fn ensure_distinct<'a>(
    addresses: impl IntoIterator<Item = &'a Address>,
) -> Result<(), GovernanceError> {
    let mut seen = HashSet::new();
    for address in addresses {
        if !seen.insert(*address) {
            return Err(GovernanceError::DuplicateVault);
        }
    }
    Ok(())
}

/// Sum an account's weight across `sources` with checked arithmetic.
///
/// `extra` carries one opaque proof payload per source, in order.
pub fn aggregate_power<'a, I>(
    sources: I,
    extra: &[Vec<u8>],
    account: Address,
    tick: Tick,
) -> Result<Weight, VaultError>
where
    I: IntoIterator<Item = &'a dyn VotePowerSource>,
{
    let mut total = Weight::ZERO;
    for (source, proof) in sources.into_iter().zip(extra) {
        let power = source.query_vote_power(account, tick, proof)?;
        total = total.checked_add(power).ok_or(VaultError::OutOfBounds)?;
    }
    Ok(total)
}

/// [`aggregate_power`], through the updating query.
pub fn aggregate_power_and_update(
    sources: &mut [&mut dyn VotePowerSource],
    extra: &[Vec<u8>],
    account: Address,
    tick: Tick,
) -> Result<Weight, VaultError> {
    let mut total = Weight::ZERO;
    for (source, proof) in sources.iter_mut().zip(extra) {
        let power = source.query_vote_power_and_update(account, tick, proof)?;
        total = total.checked_add(power).ok_or(VaultError::OutOfBounds)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatSource {
        address: Address,
        weight: Weight,
    }

    impl VotePowerSource for FlatSource {
        fn address(&self) -> Address {
            self.address
        }

        fn query_vote_power(
            &self,
            _account: Address,
            _tick: Tick,
            _extra: &[u8],
        ) -> Result<Weight, VaultError> {
            Ok(self.weight)
        }
    }

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::from_bytes(bytes)
    }

    #[test]
    fn distinct_check() {
        assert!(ensure_distinct([addr(1), addr(2)].iter()).is_ok());
        assert_eq!(
            ensure_distinct([addr(1), addr(1)].iter()),
            Err(GovernanceError::DuplicateVault)
        );
    }

    #[test]
    fn aggregation_sums_sources() {
        let a = FlatSource {
            address: addr(1),
            weight: Weight::from(10u64),
        };
        let b = FlatSource {
            address: addr(2),
            weight: Weight::from(32u64),
        };
        let extra = vec![Vec::new(), Vec::new()];
        let sources: Vec<&dyn VotePowerSource> = vec![&a, &b];
        let total = aggregate_power(
            sources.into_iter(),
            &extra,
            addr(9),
            Tick::at_height(5),
        )
        .unwrap();
        assert_eq!(total, Weight::from(42u64));
    }

    #[test]
    fn aggregation_overflow_is_out_of_bounds() {
        let a = FlatSource {
            address: addr(1),
            weight: Weight::MAX,
        };
        let b = FlatSource {
            address: addr(2),
            weight: Weight::ONE,
        };
        let extra = vec![Vec::new(), Vec::new()];
        let sources: Vec<&dyn VotePowerSource> = vec![&a, &b];
        assert_eq!(
            aggregate_power(sources.into_iter(), &extra, addr(9), Tick::at_height(5)),
            Err(VaultError::OutOfBounds)
        );
    }

    #[test]
    fn default_update_delegates_to_pure_query() {
        let mut a = FlatSource {
            address: addr(1),
            weight: Weight::from(7u64),
        };
        let power = a
            .query_vote_power_and_update(addr(9), Tick::at_height(5), &[])
            .unwrap();
        assert_eq!(power, Weight::from(7u64));
    }
}
