//! Journal lines.
//!
//! One debit or credit against one account, within one journal. `line_no` is
//! 1-based and only order-significant for display; the journal-level balance
//! invariant (`Σ debit == Σ credit`) is enforced by the poster, not per line.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of a `JournalDraft`.
///
/// Amounts are non-negative integer minor units; conventional usage sets
/// exactly one of `debit_minor`/`credit_minor` non-zero, but the model only
/// forbids negatives — balance is validated at the journal level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    pub account_id: Uuid,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub description: Option<String>,
}

impl LineInput {
    pub fn debit(account_id: Uuid, amount_minor: i64) -> Self {
        Self {
            account_id,
            debit_minor: amount_minor,
            credit_minor: 0,
            description: None,
        }
    }

    pub fn credit(account_id: Uuid, amount_minor: i64) -> Self {
        Self {
            account_id,
            debit_minor: 0,
            credit_minor: amount_minor,
            description: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_journal_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub journal_id: Uuid,
    pub entity_id: Uuid,
    pub line_no: i32,
    pub account_id: Uuid,
    pub description: Option<String>,
    pub debit_minor: i64,
    pub credit_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journals::Entity",
        from = "Column::JournalId",
        to = "super::journals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Journals,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::journals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journals.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
