//! Escrow state machine
//!
//! Records are keyed by the location derived from `(sender, receiver, asset)`.
//! Every instruction checks, in order: record existence, status, caller role,
//! then funds. State changes only after the custody transfer succeeds, and an
//! account opened for a transfer that is then rejected is closed again, so a
//! rejected instruction leaves both the record and the ledger untouched.
//!
//! The ledger is passed explicitly into each call; the engine holds no
//! balances beyond each record's immutable `amount`.

use escrow_types::ids::{Address, TxId};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::auth::{authorize, verify_instruction, Role, SignedInstruction};
use crate::config::EscrowConfig;
use crate::custody::AssetCustody;
use crate::derivation::{associated_account, escrow_address, vault_address};
use crate::errors::EscrowError;
use crate::events::{EscrowCancelled, EscrowCreated, EscrowEvent, TokensDeposited, TokensReleased};
use crate::instruction::{EscrowInstruction, Receipt};
use crate::state::{EscrowRecord, EscrowStatus};

/// Escrow state machine over a set of records.
#[derive(Debug, Clone)]
pub struct EscrowEngine {
    config: EscrowConfig,
    /// Records by derived location
    records: HashMap<Address, EscrowRecord>,
    /// Emitted events log (append-only)
    events: Vec<EscrowEvent>,
}

impl EscrowEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::with_config(EscrowConfig::default())
    }

    /// Create an engine with custom configuration
    pub fn with_config(config: EscrowConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    pub fn program_id(&self) -> &Address {
        &self.config.program_id
    }

    // ───────────────────────── Derivation ─────────────────────────

    /// Location of the record for `(sender, receiver, asset)`.
    pub fn escrow_address(&self, sender: &Address, receiver: &Address, asset: &Address) -> Address {
        escrow_address(sender, receiver, asset, &self.config.program_id)
    }

    /// Vault account of the escrow at `escrow`.
    pub fn vault_address(&self, escrow: &Address, asset: &Address) -> Address {
        vault_address(escrow, asset)
    }

    // ───────────────────────── Instructions ─────────────────────────

    /// Record a new agreement. `sender` must be the authenticated caller.
    ///
    /// Fails with `InvalidAmount` for a zero amount and `AlreadyExists` when
    /// a record already occupies the derived location.
    pub fn create_escrow(
        &mut self,
        sender: &Address,
        receiver: Address,
        asset: Address,
        amount: u64,
    ) -> Result<EscrowRecord, EscrowError> {
        let (location, _) = self.open_escrow(sender, receiver, asset, amount)?;
        self.get_escrow(&location).cloned()
    }

    /// Lock the agreed amount in the vault. Sender only, once.
    pub fn deposit_tokens<C: AssetCustody>(
        &mut self,
        custody: &mut C,
        caller: &Address,
        escrow: &Address,
    ) -> Result<EscrowEvent, EscrowError> {
        let record = self.get_escrow(escrow)?;
        record.require_status(EscrowStatus::Created, "deposit_tokens")?;
        authorize(caller, record, Role::Sender)?;
        let (sender, asset, amount) = (record.sender, record.asset, record.amount);

        let source = associated_account(&sender, &asset);
        let available = if custody.account_exists(&sender, &asset) {
            custody.balance_of(&source)?
        } else {
            0
        };
        if available < amount {
            return Err(EscrowError::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let vault = transfer_into(custody, &source, escrow, &asset, &sender, amount)?;
        self.record_mut(escrow)?.mark_funded(vault)?;

        info!(escrow = %escrow, vault = %vault, amount, "Escrow funded");
        Ok(self.emit(EscrowEvent::Deposited(TokensDeposited {
            escrow: *escrow,
            vault,
            amount,
        })))
    }

    /// Pay the vault out to the receiver. Receiver only, once funded, and only
    /// while the vault holds exactly the agreed amount.
    pub fn release_tokens<C: AssetCustody>(
        &mut self,
        custody: &mut C,
        caller: &Address,
        escrow: &Address,
    ) -> Result<EscrowEvent, EscrowError> {
        let record = self.get_escrow(escrow)?;
        record.require_status(EscrowStatus::Funded, "release_tokens")?;
        authorize(caller, record, Role::Receiver)?;
        let (receiver, asset, amount) = (record.receiver, record.asset, record.amount);

        let vault = vault_of(record, escrow);
        let held = custody.balance_of(&vault)?;
        if held != amount {
            return Err(EscrowError::VaultBalanceMismatch {
                expected: amount,
                found: held,
            });
        }

        transfer_into(custody, &vault, &receiver, &asset, escrow, amount)?;
        self.record_mut(escrow)?.mark_released()?;

        info!(escrow = %escrow, receiver = %receiver, amount, "Escrow released");
        Ok(self.emit(EscrowEvent::Released(TokensReleased {
            escrow: *escrow,
            receiver,
            amount,
        })))
    }

    /// Refund the whole vault balance to the sender. Sender only, once funded.
    pub fn cancel_escrow<C: AssetCustody>(
        &mut self,
        custody: &mut C,
        caller: &Address,
        escrow: &Address,
    ) -> Result<EscrowEvent, EscrowError> {
        let record = self.get_escrow(escrow)?;
        record.require_status(EscrowStatus::Funded, "cancel_escrow")?;
        authorize(caller, record, Role::Sender)?;
        let (sender, asset) = (record.sender, record.asset);

        let vault = vault_of(record, escrow);
        let refunded_amount = custody.balance_of(&vault)?;
        if refunded_amount > 0 {
            transfer_into(custody, &vault, &sender, &asset, escrow, refunded_amount)?;
        }
        self.record_mut(escrow)?.mark_cancelled()?;

        info!(escrow = %escrow, sender = %sender, refunded_amount, "Escrow cancelled");
        Ok(self.emit(EscrowEvent::Cancelled(EscrowCancelled {
            escrow: *escrow,
            sender,
            refunded_amount,
        })))
    }

    /// Verify a signed instruction and run it.
    pub fn execute<C: AssetCustody>(
        &mut self,
        custody: &mut C,
        signed: &SignedInstruction,
    ) -> Result<Receipt, EscrowError> {
        let operation = signed.instruction.name();
        let result = self.dispatch(custody, signed);
        match &result {
            Ok(receipt) => debug!(tx_id = %receipt.tx_id, operation, "Instruction committed"),
            Err(err) => warn!(
                operation,
                signer = %signed.signer,
                error = %err,
                "Instruction rejected"
            ),
        }
        result
    }

    fn dispatch<C: AssetCustody>(
        &mut self,
        custody: &mut C,
        signed: &SignedInstruction,
    ) -> Result<Receipt, EscrowError> {
        let caller = verify_instruction(signed, &self.config.program_id)?;

        let (escrow, event) = match &signed.instruction {
            EscrowInstruction::CreateEscrow(args) => {
                self.open_escrow(&caller, args.receiver, args.asset, args.amount)?
            }
            EscrowInstruction::DepositTokens(r) => {
                (r.escrow, self.deposit_tokens(custody, &caller, &r.escrow)?)
            }
            EscrowInstruction::ReleaseTokens(r) => {
                (r.escrow, self.release_tokens(custody, &caller, &r.escrow)?)
            }
            EscrowInstruction::CancelEscrow(r) => {
                (r.escrow, self.cancel_escrow(custody, &caller, &r.escrow)?)
            }
        };

        Ok(Receipt {
            tx_id: TxId::new(),
            escrow,
            event,
        })
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Record at `location`, if any.
    pub fn escrow(&self, location: &Address) -> Option<&EscrowRecord> {
        self.records.get(location)
    }

    /// Record at `location`, or `NotFound`.
    pub fn get_escrow(&self, location: &Address) -> Result<&EscrowRecord, EscrowError> {
        self.records
            .get(location)
            .ok_or(EscrowError::NotFound {
                location: *location,
            })
    }

    /// Current status of the record at `location`.
    pub fn status(&self, location: &Address) -> Result<EscrowStatus, EscrowError> {
        Ok(self.get_escrow(location)?.status)
    }

    /// Number of records ever created.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[EscrowEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<EscrowEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn open_escrow(
        &mut self,
        sender: &Address,
        receiver: Address,
        asset: Address,
        amount: u64,
    ) -> Result<(Address, EscrowEvent), EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidAmount);
        }

        let location = self.escrow_address(sender, &receiver, &asset);
        if self.records.contains_key(&location) {
            return Err(EscrowError::AlreadyExists { location });
        }

        self.records.insert(
            location,
            EscrowRecord::new(*sender, receiver, asset, amount),
        );

        info!(escrow = %location, sender = %sender, receiver = %receiver, amount, "Escrow created");
        let event = self.emit(EscrowEvent::Created(EscrowCreated {
            escrow: location,
            sender: *sender,
            receiver,
            asset,
            amount,
        }));
        Ok((location, event))
    }

    fn record_mut(&mut self, location: &Address) -> Result<&mut EscrowRecord, EscrowError> {
        self.records
            .get_mut(location)
            .ok_or(EscrowError::NotFound {
                location: *location,
            })
    }

    fn emit(&mut self, event: EscrowEvent) -> EscrowEvent {
        if self.config.record_events {
            self.events.push(event.clone());
        }
        event
    }
}

/// Vault bound at funding, or the derived one for records not yet funded.
fn vault_of(record: &EscrowRecord, escrow: &Address) -> Address {
    record
        .vault
        .unwrap_or_else(|| vault_address(escrow, &record.asset))
}

/// Transfer `amount` from `from` into the associated account of `owner`,
/// opening it if needed. An account opened here is closed again when the
/// transfer is rejected.
fn transfer_into<C: AssetCustody>(
    custody: &mut C,
    from: &Address,
    owner: &Address,
    asset: &Address,
    authority: &Address,
    amount: u64,
) -> Result<Address, EscrowError> {
    let opened = !custody.account_exists(owner, asset);
    let destination = custody.open_account(owner, asset)?;

    if let Err(err) = custody.transfer(from, &destination, authority, amount) {
        if opened {
            if let Err(close_err) = custody.close_account(&destination) {
                warn!(account = %destination, error = %close_err, "Opened account left behind");
            }
        }
        return Err(err.into());
    }
    Ok(destination)
}

impl Default for EscrowEngine {
    fn default() -> Self {
        Self::new()
    }
}
