//! Error types for the custody ledger
//!
//! Failures a fungible-token ledger reports back to its callers. A failed
//! operation never leaves a partial balance change behind.

use thiserror::Error;

use crate::ids::Address;

/// Custody ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account not found: {account}")]
    AccountNotFound { account: Address },

    #[error("Insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: Address,
        required: u64,
        available: u64,
    },

    #[error("Asset mismatch on {account}: expected {expected}, found {found}")]
    AssetMismatch {
        account: Address,
        expected: Address,
        found: Address,
    },

    #[error("Authority {authority} does not own account {account}")]
    OwnerMismatch { account: Address, authority: Address },

    #[error("Account {account} still holds {balance}")]
    AccountNotEmpty { account: Address, balance: u64 },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Failure to parse an [`Address`] from its hex form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("Address is not valid hex")]
    InvalidHex,

    #[error("Address must be 32 bytes, got {0}")]
    InvalidLength(usize),
}
