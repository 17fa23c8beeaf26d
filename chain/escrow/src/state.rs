//! Escrow record and its status machine
//!
//! ```text
//! Created --deposit--> Funded --release--> Released
//!                             --cancel---> Cancelled
//! ```
//! `Released` and `Cancelled` are terminal. The status field is the only
//! record of whether an escrow has been funded or settled.

use escrow_types::ids::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::EscrowError;

/// Lifecycle status of an escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Agreement recorded, nothing deposited
    Created,
    /// Amount locked in the vault
    Funded,
    /// Vault paid out to the receiver
    Released,
    /// Vault refunded to the sender
    Cancelled,
}

impl EscrowStatus {
    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, EscrowStatus::Released | EscrowStatus::Cancelled)
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EscrowStatus::Created => "Created",
            EscrowStatus::Funded => "Funded",
            EscrowStatus::Released => "Released",
            EscrowStatus::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// One escrow agreement, stored at the location derived from
/// `(sender, receiver, asset)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    pub sender: Address,
    pub receiver: Address,
    pub asset: Address,
    /// Agreed quantity, fixed at creation
    pub amount: u64,
    pub status: EscrowStatus,
    /// Custody account holding the deposit, bound on funding
    pub vault: Option<Address>,
}

impl EscrowRecord {
    /// New record in `Created` status.
    pub fn new(sender: Address, receiver: Address, asset: Address, amount: u64) -> Self {
        Self {
            sender,
            receiver,
            asset,
            amount,
            status: EscrowStatus::Created,
            vault: None,
        }
    }

    /// Fail with `InvalidState` unless the record is in `expected` status.
    pub fn require_status(
        &self,
        expected: EscrowStatus,
        operation: &'static str,
    ) -> Result<(), EscrowError> {
        if self.status != expected {
            return Err(EscrowError::InvalidState {
                operation,
                status: self.status,
            });
        }
        Ok(())
    }

    /// `Created -> Funded`, binding the vault.
    pub fn mark_funded(&mut self, vault: Address) -> Result<(), EscrowError> {
        self.require_status(EscrowStatus::Created, "deposit_tokens")?;
        self.status = EscrowStatus::Funded;
        self.vault = Some(vault);
        Ok(())
    }

    /// `Funded -> Released`.
    pub fn mark_released(&mut self) -> Result<(), EscrowError> {
        self.require_status(EscrowStatus::Funded, "release_tokens")?;
        self.status = EscrowStatus::Released;
        Ok(())
    }

    /// `Funded -> Cancelled`.
    pub fn mark_cancelled(&mut self) -> Result<(), EscrowError> {
        self.require_status(EscrowStatus::Funded, "cancel_escrow")?;
        self.status = EscrowStatus::Cancelled;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
