//! The module contains the errors the ledger core can raise.
//!
//! Three families:
//!
//! - validation errors ([`EmptyJournal`], [`UnbalancedJournal`],
//!   [`InvalidNormalBalance`], [`InvalidAmount`]) — caller-fixable, never
//!   partially applied
//! - not-found errors ([`EntityNotFound`], [`AccountNotFound`],
//!   [`HeadingNotFound`], [`SubheadingNotFound`], [`JournalNotFound`])
//! - conflict errors ([`DuplicateAccountCode`], [`DuplicateJournalNumber`]) —
//!   raised by the strict creation paths; the tolerant `ensure_*`/`resolve_*`
//!   operations swallow the underlying uniqueness conflict instead and return
//!   the existing row
//!
//! [`EmptyJournal`]: LedgerError::EmptyJournal
//! [`UnbalancedJournal`]: LedgerError::UnbalancedJournal
//! [`InvalidNormalBalance`]: LedgerError::InvalidNormalBalance
//! [`InvalidAmount`]: LedgerError::InvalidAmount
//! [`EntityNotFound`]: LedgerError::EntityNotFound
//! [`AccountNotFound`]: LedgerError::AccountNotFound
//! [`HeadingNotFound`]: LedgerError::HeadingNotFound
//! [`SubheadingNotFound`]: LedgerError::SubheadingNotFound
//! [`JournalNotFound`]: LedgerError::JournalNotFound
//! [`DuplicateAccountCode`]: LedgerError::DuplicateAccountCode
//! [`DuplicateJournalNumber`]: LedgerError::DuplicateJournalNumber

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("journal has no lines")]
    EmptyJournal,
    #[error("journal not balanced: debits {debit_minor} != credits {credit_minor}")]
    UnbalancedJournal { debit_minor: i64, credit_minor: i64 },
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid normal balance: {0}")]
    InvalidNormalBalance(String),
    #[error("invalid scope: {0}")]
    InvalidScope(String),
    #[error("entity \"{0}\" not found")]
    EntityNotFound(Uuid),
    #[error("account \"{0}\" not found")]
    AccountNotFound(String),
    #[error("heading \"{0}\" not found")]
    HeadingNotFound(String),
    #[error("subheading \"{0}\" not found")]
    SubheadingNotFound(String),
    #[error("journal \"{0}\" not found")]
    JournalNotFound(Uuid),
    #[error("account code \"{0}\" already present")]
    DuplicateAccountCode(String),
    #[error("journal number \"{0}\" already present")]
    DuplicateJournalNumber(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EmptyJournal, Self::EmptyJournal) => true,
            (
                Self::UnbalancedJournal {
                    debit_minor: da,
                    credit_minor: ca,
                },
                Self::UnbalancedJournal {
                    debit_minor: db,
                    credit_minor: cb,
                },
            ) => da == db && ca == cb,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidNormalBalance(a), Self::InvalidNormalBalance(b)) => a == b,
            (Self::InvalidScope(a), Self::InvalidScope(b)) => a == b,
            (Self::EntityNotFound(a), Self::EntityNotFound(b)) => a == b,
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::HeadingNotFound(a), Self::HeadingNotFound(b)) => a == b,
            (Self::SubheadingNotFound(a), Self::SubheadingNotFound(b)) => a == b,
            (Self::JournalNotFound(a), Self::JournalNotFound(b)) => a == b,
            (Self::DuplicateAccountCode(a), Self::DuplicateAccountCode(b)) => a == b,
            (Self::DuplicateJournalNumber(a), Self::DuplicateJournalNumber(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
