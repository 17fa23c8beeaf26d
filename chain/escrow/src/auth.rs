//! Instruction signatures and role checks
//!
//! Callers are Ed25519 identities: an [`Address`] is the verifying-key bytes.
//! An instruction is accepted only with a valid signature over its canonical
//! bytes, and the recovered signer must then match the role the operation
//! requires on the record (sender or receiver).

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use escrow_types::ids::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::errors::EscrowError;
use crate::instruction::EscrowInstruction;
use crate::state::EscrowRecord;

/// Signing schema version (frozen).
pub const SIGNING_SCHEMA_VERSION: &str = "1.0.0";

/// Party an operation must be authorized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Funds and, before release, cancels
    Sender,
    /// Withdraws once funded
    Receiver,
}

impl Role {
    /// Identity on `record` that holds this role.
    pub fn required_identity(self, record: &EscrowRecord) -> &Address {
        match self {
            Role::Sender => &record.sender,
            Role::Receiver => &record.receiver,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => f.write_str("sender"),
            Role::Receiver => f.write_str("receiver"),
        }
    }
}

/// Address of the identity controlled by `signing_key`.
pub fn identity_of(signing_key: &SigningKey) -> Address {
    Address::new(signing_key.verifying_key().to_bytes())
}

/// Whether `caller` is the identity an operation requires.
pub fn is_authorized(caller: &Address, required_identity: &Address) -> bool {
    caller == required_identity
}

/// Fail with `Unauthorized` unless `caller` holds `role` on `record`.
pub fn authorize(caller: &Address, record: &EscrowRecord, role: Role) -> Result<(), EscrowError> {
    if !is_authorized(caller, role.required_identity(record)) {
        return Err(EscrowError::Unauthorized {
            caller: *caller,
            role,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Signed instructions
// ---------------------------------------------------------------------------

/// Payload covered by an instruction signature.
///
/// Binding the program id keeps a signature from being replayed against
/// another deployment of the engine.
#[derive(Serialize)]
struct SigningPayload<'a> {
    version: &'a str,
    program_id: &'a Address,
    instruction: &'a EscrowInstruction,
}

/// An instruction plus the signature of the identity submitting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInstruction {
    pub instruction: EscrowInstruction,
    /// Submitting identity (Ed25519 verifying key)
    pub signer: Address,
    /// Ed25519 signature as hex string
    pub signature: String,
}

/// SHA-256 of the canonical JSON encoding of the signing payload.
pub fn signing_hash(
    instruction: &EscrowInstruction,
    program_id: &Address,
) -> Result<[u8; 32], EscrowError> {
    let payload = SigningPayload {
        version: SIGNING_SCHEMA_VERSION,
        program_id,
        instruction,
    };
    let bytes =
        serde_json::to_vec(&payload).map_err(|err| EscrowError::Encoding(err.to_string()))?;
    Ok(Sha256::digest(&bytes).into())
}

/// Sign `instruction` for submission to the engine deployed as `program_id`.
pub fn sign_instruction(
    instruction: EscrowInstruction,
    signing_key: &SigningKey,
    program_id: &Address,
) -> Result<SignedInstruction, EscrowError> {
    let hash = signing_hash(&instruction, program_id)?;
    let signature = signing_key.sign(&hash);

    Ok(SignedInstruction {
        instruction,
        signer: identity_of(signing_key),
        signature: hex::encode(signature.to_bytes()),
    })
}

/// Verify a signed instruction and return the authenticated caller.
pub fn verify_instruction(
    signed: &SignedInstruction,
    program_id: &Address,
) -> Result<Address, EscrowError> {
    let sig_bytes = hex::decode(&signed.signature).map_err(|_| EscrowError::InvalidSignature)?;
    let sig_bytes: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| EscrowError::InvalidSignature)?;

    let verifying_key = VerifyingKey::from_bytes(signed.signer.as_bytes())
        .map_err(|_| EscrowError::InvalidSignature)?;
    let signature = Signature::from_bytes(&sig_bytes);

    let hash = signing_hash(&signed.instruction, program_id)?;
    verifying_key
        .verify(&hash, &signature)
        .map_err(|_| EscrowError::InvalidSignature)?;

    Ok(signed.signer)
}
