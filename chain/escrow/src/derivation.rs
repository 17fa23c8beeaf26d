//! Address derivation
//!
//! Escrow records, vaults and associated token accounts live at addresses
//! computed from their identifying values. Derivation is SHA-256 over
//! length-prefixed seeds, the owning program id and a fixed marker, so
//! distinct seed tuples never share an input and derived addresses cannot be
//! confused with key-pair identities.

use escrow_types::ids::Address;
use sha2::{Digest, Sha256};

/// Seed prefix of every escrow record location.
pub const ESCROW_SEED: &[u8] = b"escrow";

/// Namespace of associated token accounts on the custody ledger.
pub const ASSOCIATED_ACCOUNT_PROGRAM_ID: Address =
    Address::new(*b"AssociatedTokenAccount1111111111");

const DERIVATION_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Derive an address from ordered seed parts under `program_id`.
pub fn derive(seed_parts: &[&[u8]], program_id: &Address) -> Address {
    let mut hasher = Sha256::new();
    for seed in seed_parts {
        hasher.update((seed.len() as u32).to_le_bytes());
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(DERIVATION_MARKER);
    Address::new(hasher.finalize().into())
}

/// Location of the escrow record for `(sender, receiver, asset)`.
pub fn escrow_address(
    sender: &Address,
    receiver: &Address,
    asset: &Address,
    program_id: &Address,
) -> Address {
    derive(
        &[
            ESCROW_SEED,
            sender.as_ref(),
            receiver.as_ref(),
            asset.as_ref(),
        ],
        program_id,
    )
}

/// Canonical token account of `owner` for `asset`.
pub fn associated_account(owner: &Address, asset: &Address) -> Address {
    derive(
        &[owner.as_ref(), asset.as_ref()],
        &ASSOCIATED_ACCOUNT_PROGRAM_ID,
    )
}

/// Vault of an escrow: the associated account owned by the escrow location.
pub fn vault_address(escrow: &Address, asset: &Address) -> Address {
    associated_account(escrow, asset)
}
