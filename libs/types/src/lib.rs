//! Types library for the escrow engine
//!
//! Identifiers, token accounts and the custody ledger error taxonomy shared
//! between the escrow engine and the ledger it drives.
//!
//! # Modules
//! - `ids`: `Address` (32-byte ledger address) and `TxId`
//! - `account`: token account balances
//! - `errors`: ledger and parse errors

pub mod account;
pub mod errors;
pub mod ids;
