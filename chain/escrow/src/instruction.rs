//! Instruction set accepted by the escrow engine
//!
//! One variant per operation, each carrying its typed arguments. The
//! submitting identity is not part of the instruction; it comes from the
//! signature (see [`crate::auth::SignedInstruction`]).

use escrow_types::ids::{Address, TxId};
use serde::{Deserialize, Serialize};

use crate::events::EscrowEvent;

/// Arguments of `CreateEscrow`. The signer is the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEscrowArgs {
    pub receiver: Address,
    pub asset: Address,
    pub amount: u64,
}

/// Reference to an existing escrow record by its derived location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRef {
    pub escrow: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowInstruction {
    CreateEscrow(CreateEscrowArgs),
    DepositTokens(EscrowRef),
    ReleaseTokens(EscrowRef),
    CancelEscrow(EscrowRef),
}

impl EscrowInstruction {
    /// Operation name, as used in logs and `InvalidState` errors.
    pub fn name(&self) -> &'static str {
        match self {
            EscrowInstruction::CreateEscrow(_) => "create_escrow",
            EscrowInstruction::DepositTokens(_) => "deposit_tokens",
            EscrowInstruction::ReleaseTokens(_) => "release_tokens",
            EscrowInstruction::CancelEscrow(_) => "cancel_escrow",
        }
    }

    /// Escrow location the instruction targets, when it names one.
    /// `CreateEscrow` derives its location from the signer instead.
    pub fn target(&self) -> Option<&Address> {
        match self {
            EscrowInstruction::CreateEscrow(_) => None,
            EscrowInstruction::DepositTokens(r)
            | EscrowInstruction::ReleaseTokens(r)
            | EscrowInstruction::CancelEscrow(r) => Some(&r.escrow),
        }
    }

    pub fn create(receiver: Address, asset: Address, amount: u64) -> Self {
        EscrowInstruction::CreateEscrow(CreateEscrowArgs {
            receiver,
            asset,
            amount,
        })
    }

    pub fn deposit(escrow: Address) -> Self {
        EscrowInstruction::DepositTokens(EscrowRef { escrow })
    }

    pub fn release(escrow: Address) -> Self {
        EscrowInstruction::ReleaseTokens(EscrowRef { escrow })
    }

    pub fn cancel(escrow: Address) -> Self {
        EscrowInstruction::CancelEscrow(EscrowRef { escrow })
    }
}

/// Outcome of an accepted instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: TxId,
    /// Location of the escrow the instruction acted on
    pub escrow: Address,
    pub event: EscrowEvent,
}
