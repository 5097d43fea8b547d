//! Row and statement types produced by the report operations.
//!
//! Reports are pure reads over posted journal lines. Every type here is a
//! plain serializable value so an outer API layer can pass them through
//! unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{AccountType, NormalBalance};

/// One account row of a trial balance.
///
/// `balance_minor` is signed per the account's normal balance: debit sums
/// minus credit sums for debit-normal accounts, the reverse for
/// credit-normal ones. Summing `signed_minor()` across all rows of a trial
/// balance always yields zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub normal_balance: NormalBalance,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub balance_minor: i64,
}

impl TrialBalanceRow {
    /// The row's balance with its natural sign: debit-normal positive,
    /// credit-normal negated.
    pub fn signed_minor(&self) -> i64 {
        match self.normal_balance {
            NormalBalance::Debit => self.balance_minor,
            NormalBalance::Credit => -self.balance_minor,
        }
    }
}

/// One account row of a profit & loss or balance sheet statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub amount_minor: i64,
}

/// One balance-sheet section (assets, liabilities or equity).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetSection {
    pub account_type: AccountType,
    pub rows: Vec<StatementRow>,
    pub total_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub assets: BalanceSheetSection,
    pub liabilities: BalanceSheetSection,
    pub equity: BalanceSheetSection,
}

/// Cash-flow bucket an account's movements are classified into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowCategory {
    Operating,
    Investing,
    Financing,
}

impl CashFlowCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operating => "operating",
            Self::Investing => "investing",
            Self::Financing => "financing",
        }
    }
}

/// Caller-supplied account-to-category classification for the cash-flow
/// statement.
///
/// The engine makes no guess about which bucket an account belongs to:
/// unmapped accounts fall into `default_category`, which itself defaults to
/// operating.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowMapping {
    pub categories: HashMap<Uuid, CashFlowCategory>,
    pub default_category: Option<CashFlowCategory>,
}

impl CashFlowMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(mut self, account_id: Uuid, category: CashFlowCategory) -> Self {
        self.categories.insert(account_id, category);
        self
    }

    pub fn with_default(mut self, category: CashFlowCategory) -> Self {
        self.default_category = Some(category);
        self
    }

    pub fn category_for(&self, account_id: Uuid) -> CashFlowCategory {
        self.categories
            .get(&account_id)
            .copied()
            .unwrap_or(self.default_category.unwrap_or(CashFlowCategory::Operating))
    }
}

/// Net movement of one cash/bank account over the reporting window.
///
/// Positive means cash flowed in (net debit on a debit-normal account).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowRow {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub category: CashFlowCategory,
    pub net_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub operating_minor: i64,
    pub investing_minor: i64,
    pub financing_minor: i64,
    pub rows: Vec<CashFlowRow>,
}

impl CashFlowStatement {
    pub fn net_minor(&self) -> i64 {
        self.operating_minor + self.investing_minor + self.financing_minor
    }
}

/// Lifetime posting totals for one entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTotals {
    pub journal_count: u64,
    pub debit_minor: i64,
    pub credit_minor: i64,
}
