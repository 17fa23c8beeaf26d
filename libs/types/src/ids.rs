//! Identifier types shared by the escrow engine and the custody ledger
//!
//! `Address` is the single 32-byte identifier used for identities, assets,
//! derived escrow locations and token accounts. `TxId` identifies an accepted
//! instruction and uses UUID v7 so receipts sort chronologically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ParseAddressError;

/// Length in bytes of an [`Address`].
pub const ADDRESS_LEN: usize = 32;

/// 32-byte ledger address.
///
/// Identities are Ed25519 verifying-key bytes; asset identifiers and derived
/// locations are SHA-256 outputs. Displays as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create from raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Random address, for identities and assets created in tests or setup.
    pub fn new_unique() -> Self {
        Self(rand::random())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 8 hex chars are enough to tell addresses apart in logs
        write!(f, "Address({}..)", &hex::encode(self.0)[..8])
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| ParseAddressError::InvalidHex)?;
        let len = bytes.len();
        let bytes: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| ParseAddressError::InvalidLength(len))?;
        Ok(Self(bytes))
    }
}

/// Identifier of an accepted instruction
///
/// Uses UUID v7 for time-based sorting of receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(Uuid);

impl TxId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_unique() {
        let a = Address::new_unique();
        let b = Address::new_unique();
        assert_ne!(a, b, "Random addresses should not collide");
    }

    #[test]
    fn test_address_display_is_hex() {
        let addr = Address::new([0xab; ADDRESS_LEN]);
        assert_eq!(addr.to_string(), "ab".repeat(ADDRESS_LEN));
    }

    #[test]
    fn test_address_parse() {
        let addr = Address::new_unique();
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn test_address_parse_rejects_bad_input() {
        assert_eq!(
            "zz".parse::<Address>(),
            Err(ParseAddressError::InvalidHex)
        );
        assert_eq!(
            "abcd".parse::<Address>(),
            Err(ParseAddressError::InvalidLength(2))
        );
    }

    #[test]
    fn test_address_debug_is_short() {
        let addr = Address::new([0x01; ADDRESS_LEN]);
        assert_eq!(format!("{:?}", addr), "Address(01010101..)");
    }

    #[test]
    fn test_tx_id_creation() {
        let id1 = TxId::new();
        let id2 = TxId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_tx_id_serialization() {
        let id = TxId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: TxId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
