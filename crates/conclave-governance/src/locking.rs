//! Token-locking vault: raw deposited balance as vote weight.
//!
//! Deposits delegate their full weight to a single delegate; the delegate's
//! aggregate weight is checkpointed per height, so the ledger's historical
//! queries resolve against real block-ordered history.

use crate::error::VaultError;
use crate::vault::VotePowerSource;
use conclave_history::HistoryStore;
use conclave_types::{Address, Tick, Weight};
use std::collections::HashMap;
use tracing::debug;

/// One account's locked position.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deposit {
    /// Where the position's weight points.
    pub delegate: Address,
    /// Locked balance.
    pub amount: Weight,
}

/// A [`VotePowerSource`] backed by checkpointed deposits.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockingVault {
    address: Address,
    deposits: HashMap<Address, Deposit>,
    /// Delegated weight per delegate, checkpointed by height.
    history: HistoryStore,
}

impl LockingVault {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            deposits: HashMap::new(),
            history: HistoryStore::new(),
        }
    }

    /// Lock `amount` for `account`, delegating its weight.
    ///
    /// The first deposit fixes the delegation; later deposits ignore
    /// `delegate` and stack onto the existing one. Use
    /// [`LockingVault::change_delegation`] to move it.
    pub fn deposit(
        &mut self,
        account: Address,
        delegate: Address,
        amount: Weight,
        tick: Tick,
    ) -> Result<(), VaultError> {
        let delegate = match self.deposits.get(&account) {
            Some(existing) => existing.delegate,
            None => delegate,
        };
        let balance = self
            .deposits
            .get(&account)
            .map(|d| d.amount)
            .unwrap_or(Weight::ZERO);
        let new_balance = balance.checked_add(amount).ok_or(VaultError::OutOfBounds)?;
        self.add_delegated(delegate, amount, tick.height)?;
        self.deposits.insert(
            account,
            Deposit {
                delegate,
                amount: new_balance,
            },
        );
        debug!(account = %account, delegate = %delegate, amount = %amount, "deposit locked");
        Ok(())
    }

    /// Unlock `amount` for `account`, shrinking the delegate's weight.
    pub fn withdraw(
        &mut self,
        account: Address,
        amount: Weight,
        tick: Tick,
    ) -> Result<(), VaultError> {
        let deposit = self
            .deposits
            .get(&account)
            .ok_or(VaultError::InsufficientBalance)?;
        let new_balance = deposit
            .amount
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientBalance)?;
        let delegate = deposit.delegate;
        self.remove_delegated(delegate, amount, tick.height)?;
        self.deposits.insert(
            account,
            Deposit {
                delegate,
                amount: new_balance,
            },
        );
        Ok(())
    }

    /// Move `account`'s whole balance to a new delegate.
    pub fn change_delegation(
        &mut self,
        account: Address,
        new_delegate: Address,
        tick: Tick,
    ) -> Result<(), VaultError> {
        let deposit = self
            .deposits
            .get(&account)
            .ok_or(VaultError::Uninitialized)?
            .clone();
        if deposit.delegate == new_delegate {
            return Ok(());
        }
        self.remove_delegated(deposit.delegate, deposit.amount, tick.height)?;
        self.add_delegated(new_delegate, deposit.amount, tick.height)?;
        self.deposits.insert(
            account,
            Deposit {
                delegate: new_delegate,
                amount: deposit.amount,
            },
        );
        debug!(account = %account, delegate = %new_delegate, "delegation moved");
        Ok(())
    }

    /// Bounded compaction of a delegate's stale checkpoints. Returns the
    /// number of entries purged.
    pub fn compact(
        &mut self,
        delegate: &Address,
        upper_bound_height: u64,
        max_purge: usize,
    ) -> usize {
        self.history.clear(delegate, upper_bound_height, max_purge)
    }

    pub fn balance_of(&self, account: &Address) -> Weight {
        self.deposits
            .get(account)
            .map(|d| d.amount)
            .unwrap_or(Weight::ZERO)
    }

    pub fn delegate_of(&self, account: &Address) -> Option<Address> {
        self.deposits.get(account).map(|d| d.delegate)
    }

    fn add_delegated(
        &mut self,
        delegate: Address,
        amount: Weight,
        height: u64,
    ) -> Result<(), VaultError> {
        let current = self.history.load_top(&delegate);
        let next = current.checked_add(amount).ok_or(VaultError::OutOfBounds)?;
        self.history.push(delegate, height, next)?;
        Ok(())
    }

    fn remove_delegated(
        &mut self,
        delegate: Address,
        amount: Weight,
        height: u64,
    ) -> Result<(), VaultError> {
        let current = self.history.load_top(&delegate);
        let next = current.checked_sub(amount).ok_or(VaultError::OutOfBounds)?;
        self.history.push(delegate, height, next)?;
        Ok(())
    }
}

impl VotePowerSource for LockingVault {
    fn address(&self) -> Address {
        self.address
    }

    /// Historical delegated weight; needs no proof data.
    fn query_vote_power(
        &self,
        account: Address,
        tick: Tick,
        _extra: &[u8],
    ) -> Result<Weight, VaultError> {
        Ok(self.history.find(&account, tick.height)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::from_bytes(bytes)
    }

    fn w(n: u64) -> Weight {
        Weight::from(n)
    }

    #[test]
    fn deposit_checkpoints_delegate_power() {
        let mut vault = LockingVault::new(addr(1));
        vault.deposit(addr(10), addr(10), w(100), Tick::at_height(5)).unwrap();
        vault.deposit(addr(11), addr(10), w(50), Tick::at_height(7)).unwrap();

        assert_eq!(vault.balance_of(&addr(10)), w(100));
        assert_eq!(vault.balance_of(&addr(11)), w(50));
        assert_eq!(
            vault.query_vote_power(addr(10), Tick::at_height(5), &[]).unwrap(),
            w(100)
        );
        assert_eq!(
            vault.query_vote_power(addr(10), Tick::at_height(7), &[]).unwrap(),
            w(150)
        );
        // Before any checkpoint the account is uninitialized.
        assert_eq!(
            vault.query_vote_power(addr(10), Tick::at_height(4), &[]),
            Err(VaultError::Uninitialized)
        );
    }

    #[test]
    fn later_deposits_keep_first_delegation() {
        let mut vault = LockingVault::new(addr(1));
        vault.deposit(addr(10), addr(20), w(40), Tick::at_height(5)).unwrap();
        // The delegate argument is ignored once set.
        vault.deposit(addr(10), addr(21), w(60), Tick::at_height(6)).unwrap();

        assert_eq!(vault.delegate_of(&addr(10)), Some(addr(20)));
        assert_eq!(
            vault.query_vote_power(addr(20), Tick::at_height(6), &[]).unwrap(),
            w(100)
        );
        assert_eq!(
            vault.query_vote_power(addr(21), Tick::at_height(6), &[]),
            Err(VaultError::Uninitialized)
        );
    }

    #[test]
    fn withdraw_shrinks_delegate_power() {
        let mut vault = LockingVault::new(addr(1));
        vault.deposit(addr(10), addr(20), w(100), Tick::at_height(5)).unwrap();
        vault.withdraw(addr(10), w(30), Tick::at_height(8)).unwrap();

        assert_eq!(vault.balance_of(&addr(10)), w(70));
        assert_eq!(
            vault.query_vote_power(addr(20), Tick::at_height(7), &[]).unwrap(),
            w(100)
        );
        assert_eq!(
            vault.query_vote_power(addr(20), Tick::at_height(8), &[]).unwrap(),
            w(70)
        );
        assert_eq!(
            vault.withdraw(addr(10), w(71), Tick::at_height(9)),
            Err(VaultError::InsufficientBalance)
        );
        assert_eq!(
            vault.withdraw(addr(12), w(1), Tick::at_height(9)),
            Err(VaultError::InsufficientBalance)
        );
    }

    #[test]
    fn redelegation_moves_full_balance() {
        let mut vault = LockingVault::new(addr(1));
        vault.deposit(addr(10), addr(20), w(100), Tick::at_height(5)).unwrap();
        vault.change_delegation(addr(10), addr(21), Tick::at_height(9)).unwrap();

        assert_eq!(
            vault.query_vote_power(addr(20), Tick::at_height(9), &[]).unwrap(),
            Weight::ZERO
        );
        assert_eq!(
            vault.query_vote_power(addr(21), Tick::at_height(9), &[]).unwrap(),
            w(100)
        );
        // History below the move is preserved.
        assert_eq!(
            vault.query_vote_power(addr(20), Tick::at_height(8), &[]).unwrap(),
            w(100)
        );
    }

    #[test]
    fn same_height_mutations_collapse() {
        let mut vault = LockingVault::new(addr(1));
        vault.deposit(addr(10), addr(20), w(5), Tick::at_height(5)).unwrap();
        vault.deposit(addr(11), addr(20), w(2), Tick::at_height(5)).unwrap();

        let (min, len) = vault.history.load_bounds(&addr(20));
        assert_eq!((min, len), (0, 1));
        assert_eq!(
            vault.query_vote_power(addr(20), Tick::at_height(5), &[]).unwrap(),
            w(7)
        );
    }

    #[test]
    fn compaction_bounds_history() {
        let mut vault = LockingVault::new(addr(1));
        for h in 1..=6u64 {
            vault.deposit(addr(10), addr(20), w(10), Tick::at_height(h)).unwrap();
        }
        let purged = vault.compact(&addr(20), 5, usize::MAX);
        assert_eq!(purged, 3);
        assert_eq!(
            vault.query_vote_power(addr(20), Tick::at_height(3), &[]),
            Err(VaultError::Uninitialized)
        );
        assert_eq!(
            vault.query_vote_power(addr(20), Tick::at_height(6), &[]).unwrap(),
            w(60)
        );
    }
}
