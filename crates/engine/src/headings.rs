//! Chart-of-accounts headings (top level of the hierarchy).
//!
//! Headings exist in two layers: global defaults (`company_id IS NULL`) and
//! per-company overrides. For a given `head_code` the company row, when one
//! exists, shadows the global row — including a disabled company row, since
//! disabling is itself an override action.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Which financial statement a heading rolls up into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatement {
    BalanceSheet,
    IncomeStatement,
}

impl FinancialStatement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
        }
    }
}

impl TryFrom<&str> for FinancialStatement {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "balance_sheet" => Ok(Self::BalanceSheet),
            "income_statement" => Ok(Self::IncomeStatement),
            other => Err(LedgerError::InvalidScope(format!(
                "invalid financial statement: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_headings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub head_code: i32,
    pub name: String,
    pub financial_stmt: String,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subheadings::Entity")]
    Subheadings,
}

impl Related<super::subheadings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subheadings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
