//! Transactional substrate for the escrow engine
//!
//! Serializes signed instructions against one engine and one custody ledger.
//! Engine operations are all-or-nothing on their own: every check runs before
//! the custody transfer, records change only after it, and accounts opened
//! for a rejected transfer are closed again. The lock adds ordering, so
//! conflicting concurrent instructions on the same record run one after the
//! other and all but one fail the status guard.

use escrow_types::errors::LedgerError;
use escrow_types::ids::Address;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::auth::SignedInstruction;
use crate::custody::{AssetCustody, TokenLedger};
use crate::engine::EscrowEngine;
use crate::errors::EscrowError;
use crate::events::EscrowEvent;
use crate::instruction::Receipt;
use crate::state::EscrowRecord;

#[derive(Debug)]
struct BankState<C> {
    engine: EscrowEngine,
    custody: C,
}

/// Engine plus ledger behind a single lock.
#[derive(Debug)]
pub struct Bank<C = TokenLedger> {
    state: Mutex<BankState<C>>,
}

impl<C: AssetCustody> Bank<C> {
    pub fn new(engine: EscrowEngine, custody: C) -> Self {
        Self {
            state: Mutex::new(BankState { engine, custody }),
        }
    }

    /// Execute one signed instruction.
    pub fn process(&self, signed: &SignedInstruction) -> Result<Receipt, EscrowError> {
        let mut state = self.lock();
        let BankState { engine, custody } = &mut *state;
        let result = engine.execute(custody, signed);
        if result.is_err() {
            debug!(operation = signed.instruction.name(), "Instruction had no effect");
        }
        result
    }

    /// Run `f` against the custody ledger, e.g. to mint during setup.
    pub fn with_custody<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.lock().custody)
    }

    /// Copy of the record at `location`.
    pub fn escrow(&self, location: &Address) -> Option<EscrowRecord> {
        self.lock().engine.escrow(location).cloned()
    }

    pub fn balance_of(&self, account: &Address) -> Result<u64, LedgerError> {
        self.lock().custody.balance_of(account)
    }

    pub fn program_id(&self) -> Address {
        *self.lock().engine.program_id()
    }

    /// Location of the record for `(sender, receiver, asset)`.
    pub fn escrow_address(&self, sender: &Address, receiver: &Address, asset: &Address) -> Address {
        self.lock().engine.escrow_address(sender, receiver, asset)
    }

    /// Copy of the committed event log.
    pub fn events(&self) -> Vec<EscrowEvent> {
        self.lock().engine.events().to_vec()
    }

    /// Take the committed events, leaving the log empty.
    pub fn drain_events(&self) -> Vec<EscrowEvent> {
        self.lock().engine.drain_events()
    }

    /// Consume the bank and return the engine and ledger.
    pub fn into_parts(self) -> (EscrowEngine, C) {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (state.engine, state.custody)
    }

    // Engine operations mutate a record only after every fallible step, so a
    // poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, BankState<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Bank<TokenLedger> {
    fn default() -> Self {
        Self::new(EscrowEngine::new(), TokenLedger::new())
    }
}
