//! Escrow engine configuration

use escrow_types::ids::Address;

use crate::ESCROW_PROGRAM_ID;

/// Escrow engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowConfig {
    /// Namespace for record derivation and instruction signatures
    pub program_id: Address,
    /// Keep emitted events in the engine's log
    pub record_events: bool,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            program_id: ESCROW_PROGRAM_ID,
            record_events: true,
        }
    }
}

impl EscrowConfig {
    /// Default configuration under a different program id.
    pub fn for_program(program_id: Address) -> Self {
        Self {
            program_id,
            ..Self::default()
        }
    }
}
