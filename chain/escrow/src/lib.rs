//! Escrow Engine
//!
//! A sender locks a fixed amount of a fungible asset in a vault controlled by
//! the engine; the receiver then withdraws it, or the sender takes it back.
//! Token accounting is delegated to a custody ledger.
//!
//! # Modules
//! - `state`: escrow record and status machine
//! - `engine`: instruction processing against a custody ledger
//! - `derivation`: record, vault and associated account addresses
//! - `auth`: signed instructions and role checks
//! - `instruction`: instruction set and receipts
//! - `custody`: custody ledger interface and in-memory ledger
//! - `bank`: atomic, serialized instruction processing
//! - `events`: events emitted by committed transitions
//! - `errors`: escrow error taxonomy
//! - `config`: engine configuration

pub mod auth;
pub mod bank;
pub mod config;
pub mod custody;
pub mod derivation;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instruction;
pub mod state;

use escrow_types::ids::Address;

/// Escrow ABI version, frozen after release
pub const ESCROW_ABI_VERSION: &str = "1.0.0";

/// Default program id the engine derives addresses and verifies signatures under.
pub const ESCROW_PROGRAM_ID: Address = Address::new(*b"Escrow11111111111111111111111111");

pub mod prelude {
    pub use crate::auth::{identity_of, sign_instruction, Role, SignedInstruction};
    pub use crate::bank::Bank;
    pub use crate::config::EscrowConfig;
    pub use crate::custody::{AssetCustody, TokenLedger};
    pub use crate::engine::EscrowEngine;
    pub use crate::errors::EscrowError;
    pub use crate::events::EscrowEvent;
    pub use crate::instruction::{EscrowInstruction, Receipt};
    pub use crate::state::{EscrowRecord, EscrowStatus};
}
