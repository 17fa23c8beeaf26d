//! Escrow error taxonomy
//!
//! Every instruction returns one of these on rejection. A rejected
//! instruction applies none of its effects.

use escrow_types::errors::LedgerError;
use escrow_types::ids::Address;
use thiserror::Error;

use crate::auth::Role;
use crate::state::EscrowStatus;

/// Escrow engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    #[error("Escrow already exists at {location}")]
    AlreadyExists { location: Address },

    #[error("Escrow not found: {location}")]
    NotFound { location: Address },

    #[error("Invalid state for {operation}: escrow is {status}")]
    InvalidState {
        operation: &'static str,
        status: EscrowStatus,
    },

    #[error("Unauthorized: {caller} is not the escrow {role}")]
    Unauthorized { caller: Address, role: Role },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Escrow amount must be positive")]
    InvalidAmount,

    #[error("Invalid instruction signature")]
    InvalidSignature,

    #[error("Vault balance mismatch: expected {expected}, found {found}")]
    VaultBalanceMismatch { expected: u64, found: u64 },

    #[error("Instruction encoding failed: {0}")]
    Encoding(String),

    #[error("Custody error: {0}")]
    Custody(LedgerError),
}

impl From<LedgerError> for EscrowError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                required,
                available,
                ..
            } => EscrowError::InsufficientFunds {
                required,
                available,
            },
            other => EscrowError::Custody(other),
        }
    }
}
