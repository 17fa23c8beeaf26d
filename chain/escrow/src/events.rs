//! Escrow events
//!
//! Immutable records emitted by each committed transition.

use escrow_types::ids::Address;
use serde::{Deserialize, Serialize};

/// Escrow agreement recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowCreated {
    pub escrow: Address,
    pub sender: Address,
    pub receiver: Address,
    pub asset: Address,
    pub amount: u64,
}

/// Agreed amount locked in the vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensDeposited {
    pub escrow: Address,
    pub vault: Address,
    pub amount: u64,
}

/// Vault paid out to the receiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensReleased {
    pub escrow: Address,
    pub receiver: Address,
    pub amount: u64,
}

/// Vault refunded to the sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowCancelled {
    pub escrow: Address,
    pub sender: Address,
    pub refunded_amount: u64,
}

/// Enum wrapper for all escrow events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowEvent {
    Created(EscrowCreated),
    Deposited(TokensDeposited),
    Released(TokensReleased),
    Cancelled(EscrowCancelled),
}

impl EscrowEvent {
    /// Escrow location the event belongs to.
    pub fn escrow(&self) -> &Address {
        match self {
            EscrowEvent::Created(e) => &e.escrow,
            EscrowEvent::Deposited(e) => &e.escrow,
            EscrowEvent::Released(e) => &e.escrow,
            EscrowEvent::Cancelled(e) => &e.escrow,
        }
    }
}
