//! Asset custody: the fungible-token ledger the escrow engine drives
//!
//! The engine never does token accounting itself. It moves balances through
//! the [`AssetCustody`] trait, which any token ledger can implement.
//! [`TokenLedger`] is the in-memory implementation:
//! - Accounts keyed by address, one asset per account
//! - Associated account per `(owner, asset)`
//! - Atomic transfer with owner authorization and overflow protection
//! - Minting for environment setup

use escrow_types::account::TokenAccount;
use escrow_types::errors::LedgerError;
use escrow_types::ids::Address;
use std::collections::BTreeMap;
use tracing::debug;

use crate::derivation::associated_account;

/// Operations the escrow engine needs from a token ledger.
pub trait AssetCustody {
    /// Move `amount` from `from` to `to`, authorized by the owner of `from`.
    ///
    /// Must be atomic: on any error neither balance changes.
    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        authority: &Address,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Balance held by a token account.
    fn balance_of(&self, account: &Address) -> Result<u64, LedgerError>;

    /// Whether the associated account of `owner` for `asset` exists.
    fn account_exists(&self, owner: &Address, asset: &Address) -> bool;

    /// Create the associated account of `owner` for `asset` if missing.
    /// Returns its address either way.
    fn open_account(&mut self, owner: &Address, asset: &Address) -> Result<Address, LedgerError>;

    /// Remove an empty account. Fails with `AccountNotEmpty` while it holds a
    /// balance.
    fn close_account(&mut self, account: &Address) -> Result<(), LedgerError>;
}

/// In-memory token ledger.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    accounts: BTreeMap<Address, TokenAccount>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Setup primitives ─────────────────────────

    /// Mint `amount` of `asset` into the associated account of `owner`,
    /// opening it if needed. Returns the account address.
    pub fn mint_to(
        &mut self,
        owner: &Address,
        asset: &Address,
        amount: u64,
    ) -> Result<Address, LedgerError> {
        let address = self.open_account(owner, asset)?;
        self.account_mut(&address)?.credit(amount)?;
        Ok(address)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Look up an account by address.
    pub fn account(&self, address: &Address) -> Option<&TokenAccount> {
        self.accounts.get(address)
    }

    /// Balance of the associated account of `owner`, zero if it does not exist.
    pub fn balance_of_owner(&self, owner: &Address, asset: &Address) -> u64 {
        self.accounts
            .get(&associated_account(owner, asset))
            .map_or(0, |account| account.amount)
    }

    /// Sum of every balance of `asset` across the ledger.
    pub fn total_supply(&self, asset: &Address) -> u128 {
        self.accounts
            .values()
            .filter(|account| account.asset == *asset)
            .map(|account| account.amount as u128)
            .sum()
    }

    /// Number of open accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn account_mut(&mut self, address: &Address) -> Result<&mut TokenAccount, LedgerError> {
        self.accounts
            .get_mut(address)
            .ok_or(LedgerError::AccountNotFound { account: *address })
    }
}

impl AssetCustody for TokenLedger {
    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        authority: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        // Validate everything before touching either balance
        let source = self
            .accounts
            .get(from)
            .ok_or(LedgerError::AccountNotFound { account: *from })?;
        let destination = self
            .accounts
            .get(to)
            .ok_or(LedgerError::AccountNotFound { account: *to })?;

        if !source.is_owned_by(authority) {
            return Err(LedgerError::OwnerMismatch {
                account: *from,
                authority: *authority,
            });
        }
        if source.asset != destination.asset {
            return Err(LedgerError::AssetMismatch {
                account: *to,
                expected: source.asset,
                found: destination.asset,
            });
        }
        if source.amount < amount {
            return Err(LedgerError::InsufficientFunds {
                account: *from,
                required: amount,
                available: source.amount,
            });
        }
        if from == to {
            return Ok(());
        }
        destination
            .amount
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.account_mut(from)?.debit(amount)?;
        self.account_mut(to)?.credit(amount)?;

        debug!(%from, %to, amount, "Custody transfer");
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> Result<u64, LedgerError> {
        self.accounts
            .get(account)
            .map(|account| account.amount)
            .ok_or(LedgerError::AccountNotFound { account: *account })
    }

    fn account_exists(&self, owner: &Address, asset: &Address) -> bool {
        self.accounts.contains_key(&associated_account(owner, asset))
    }

    fn open_account(&mut self, owner: &Address, asset: &Address) -> Result<Address, LedgerError> {
        let address = associated_account(owner, asset);
        let account = self
            .accounts
            .entry(address)
            .or_insert_with(|| TokenAccount::new(address, *owner, *asset));
        // Associated addresses are derived from (owner, asset); a hit with
        // different fields means the map was corrupted.
        if account.asset != *asset {
            return Err(LedgerError::AssetMismatch {
                account: address,
                expected: *asset,
                found: account.asset,
            });
        }
        Ok(address)
    }

    fn close_account(&mut self, account: &Address) -> Result<(), LedgerError> {
        let balance = self.balance_of(account)?;
        if balance > 0 {
            return Err(LedgerError::AccountNotEmpty {
                account: *account,
                balance,
            });
        }
        self.accounts.remove(account);
        debug!(%account, "Account closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Setup {
        ledger: TokenLedger,
        alice: Address,
        bob: Address,
        asset: Address,
    }

    fn setup() -> Setup {
        Setup {
            ledger: TokenLedger::new(),
            alice: Address::new_unique(),
            bob: Address::new_unique(),
            asset: Address::new_unique(),
        }
    }

    // ─── Account tests ───

    #[test]
    fn test_open_account_idempotent() {
        let mut s = setup();
        let first = s.ledger.open_account(&s.alice, &s.asset).unwrap();
        let second = s.ledger.open_account(&s.alice, &s.asset).unwrap();
        assert_eq!(first, second);
        assert_eq!(s.ledger.len(), 1);
        assert!(s.ledger.account_exists(&s.alice, &s.asset));
        assert!(!s.ledger.account_exists(&s.bob, &s.asset));
    }

    #[test]
    fn test_close_empty_account() {
        let mut s = setup();
        let account = s.ledger.open_account(&s.alice, &s.asset).unwrap();
        s.ledger.close_account(&account).unwrap();
        assert!(!s.ledger.account_exists(&s.alice, &s.asset));
        assert!(s.ledger.is_empty());
    }

    #[test]
    fn test_close_funded_account_rejected() {
        let mut s = setup();
        let account = s.ledger.mint_to(&s.alice, &s.asset, 7).unwrap();
        assert_eq!(
            s.ledger.close_account(&account),
            Err(LedgerError::AccountNotEmpty {
                account,
                balance: 7,
            })
        );
        assert_eq!(s.ledger.balance_of(&account).unwrap(), 7);
    }

    #[test]
    fn test_close_missing_account() {
        let mut s = setup();
        let missing = Address::new_unique();
        assert_eq!(
            s.ledger.close_account(&missing),
            Err(LedgerError::AccountNotFound { account: missing })
        );
    }

    #[test]
    fn test_mint_to_credits_associated_account() {
        let mut s = setup();
        let account = s.ledger.mint_to(&s.alice, &s.asset, 100).unwrap();
        assert_eq!(account, associated_account(&s.alice, &s.asset));
        assert_eq!(s.ledger.balance_of(&account).unwrap(), 100);
        assert_eq!(s.ledger.balance_of_owner(&s.alice, &s.asset), 100);
        assert_eq!(s.ledger.total_supply(&s.asset), 100);
    }

    #[test]
    fn test_balance_of_missing_account() {
        let s = setup();
        let missing = Address::new_unique();
        assert_eq!(
            s.ledger.balance_of(&missing),
            Err(LedgerError::AccountNotFound { account: missing })
        );
    }

    // ─── Transfer tests ───

    #[test]
    fn test_transfer_success() {
        let mut s = setup();
        let from = s.ledger.mint_to(&s.alice, &s.asset, 100).unwrap();
        let to = s.ledger.open_account(&s.bob, &s.asset).unwrap();

        s.ledger.transfer(&from, &to, &s.alice, 30).unwrap();

        assert_eq!(s.ledger.balance_of(&from).unwrap(), 70);
        assert_eq!(s.ledger.balance_of(&to).unwrap(), 30);
        assert_eq!(s.ledger.total_supply(&s.asset), 100);
    }

    #[test]
    fn test_transfer_insufficient_is_atomic() {
        let mut s = setup();
        let from = s.ledger.mint_to(&s.alice, &s.asset, 10).unwrap();
        let to = s.ledger.open_account(&s.bob, &s.asset).unwrap();

        let result = s.ledger.transfer(&from, &to, &s.alice, 11);
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(s.ledger.balance_of(&from).unwrap(), 10);
        assert_eq!(s.ledger.balance_of(&to).unwrap(), 0);
    }

    #[test]
    fn test_transfer_requires_owner() {
        let mut s = setup();
        let from = s.ledger.mint_to(&s.alice, &s.asset, 10).unwrap();
        let to = s.ledger.open_account(&s.bob, &s.asset).unwrap();

        let result = s.ledger.transfer(&from, &to, &s.bob, 5);
        assert_eq!(
            result,
            Err(LedgerError::OwnerMismatch {
                account: from,
                authority: s.bob,
            })
        );
        assert_eq!(s.ledger.balance_of(&from).unwrap(), 10);
    }

    #[test]
    fn test_transfer_asset_mismatch() {
        let mut s = setup();
        let other_asset = Address::new_unique();
        let from = s.ledger.mint_to(&s.alice, &s.asset, 10).unwrap();
        let to = s.ledger.open_account(&s.bob, &other_asset).unwrap();

        let result = s.ledger.transfer(&from, &to, &s.alice, 5);
        assert!(matches!(result, Err(LedgerError::AssetMismatch { .. })));
    }

    #[test]
    fn test_transfer_to_missing_account() {
        let mut s = setup();
        let from = s.ledger.mint_to(&s.alice, &s.asset, 10).unwrap();
        let missing = Address::new_unique();

        let result = s.ledger.transfer(&from, &missing, &s.alice, 5);
        assert_eq!(result, Err(LedgerError::AccountNotFound { account: missing }));
        assert_eq!(s.ledger.balance_of(&from).unwrap(), 10);
    }

    #[test]
    fn test_transfer_overflow_is_atomic() {
        let mut s = setup();
        let from = s.ledger.mint_to(&s.alice, &s.asset, 10).unwrap();
        let to = s.ledger.mint_to(&s.bob, &s.asset, u64::MAX).unwrap();

        let result = s.ledger.transfer(&from, &to, &s.alice, 1);
        assert_eq!(result, Err(LedgerError::Overflow));
        assert_eq!(s.ledger.balance_of(&from).unwrap(), 10);
        assert_eq!(s.ledger.balance_of(&to).unwrap(), u64::MAX);
    }

    #[test]
    fn test_self_transfer_is_noop() {
        let mut s = setup();
        let acc = s.ledger.mint_to(&s.alice, &s.asset, 10).unwrap();
        s.ledger.transfer(&acc, &acc, &s.alice, 10).unwrap();
        assert_eq!(s.ledger.balance_of(&acc).unwrap(), 10);
    }
}
