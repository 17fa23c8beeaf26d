//! Token account type held by the custody ledger
//!
//! One account holds the balance of a single asset for a single owner.
//! Only the owner may authorize moving funds out of it.

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::ids::Address;

/// Balance of one asset held by one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub address: Address,
    pub owner: Address,
    pub asset: Address,
    pub amount: u64,
}

impl TokenAccount {
    /// Create an empty account
    pub fn new(address: Address, owner: Address, asset: Address) -> Self {
        Self {
            address,
            owner,
            asset,
            amount: 0,
        }
    }

    /// Add to the balance, failing on overflow.
    pub fn credit(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Subtract from the balance. The balance is untouched on failure.
    pub fn debit(&mut self, amount: u64) -> Result<(), LedgerError> {
        if self.amount < amount {
            return Err(LedgerError::InsufficientFunds {
                account: self.address,
                required: amount,
                available: self.amount,
            });
        }
        self.amount -= amount;
        Ok(())
    }

    /// Check whether `authority` may move funds out of this account
    pub fn is_owned_by(&self, authority: &Address) -> bool {
        self.owner == *authority
    }
}
