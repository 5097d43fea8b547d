pub use accounts::{AccountType, NewAccount, NormalBalance};
pub use entities::EntityScope;
pub use error::LedgerError;
pub use headings::FinancialStatement;
pub use journal_lines::LineInput;
pub use journals::JournalDraft;
pub use ops::{Ensure, Ledger, LedgerBuilder};
pub use reports::{
    BalanceSheet, BalanceSheetSection, CashFlowCategory, CashFlowMapping, CashFlowRow,
    CashFlowStatement, EntityTotals, StatementRow, TrialBalanceRow,
};

pub mod accounts;
pub mod entities;
mod error;
pub mod groups;
pub mod headings;
pub mod journal_lines;
pub mod journals;
mod ops;
pub mod reports;
pub mod standard_accounts;
pub mod subheadings;

pub type ResultLedger<T> = Result<T, LedgerError>;
