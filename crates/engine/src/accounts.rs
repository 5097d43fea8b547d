//! Accounts: the leaf posting targets of the chart.
//!
//! Every journal line debits or credits exactly one account. Accounts are
//! scoped to an entity, keyed by `(entity_id, code)`, and optionally linked
//! to a standard account for cross-tenant reporting roll-up.
//!
//! Amounts throughout the ledger are signed integer **minor units** (cents
//! for two-decimal currencies); an account's `normal_balance` names the side
//! on which its balance is conventionally positive.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// High-level account kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The normal balance side this kind of account must carry.
    ///
    /// Getting this wrong does not break posting mechanically, but it flips
    /// report sign conventions, so it is enforced at creation time.
    pub fn expected_normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }
}

impl TryFrom<&str> for AccountType {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::InvalidScope(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

/// The side on which an account's balance is conventionally positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    Debit,
    Credit,
}

impl NormalBalance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl TryFrom<&str> for NormalBalance {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(LedgerError::InvalidNormalBalance(format!(
                "invalid normal balance: {other}"
            ))),
        }
    }
}

/// Input for the strict account creation path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAccount {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub sub_type: Option<String>,
    pub normal_balance: NormalBalance,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_id: Uuid,
    pub standard_id: Option<Uuid>,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub sub_type: Option<String>,
    pub normal_balance: String,
    pub is_leaf: bool,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entities::Entity",
        from = "Column::EntityId",
        to = "super::entities::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Entities,
    #[sea_orm(
        belongs_to = "super::standard_accounts::Entity",
        from = "Column::StandardId",
        to = "super::standard_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    StandardAccounts,
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::entities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entities.def()
    }
}

impl Related<super::standard_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StandardAccounts.def()
    }
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
