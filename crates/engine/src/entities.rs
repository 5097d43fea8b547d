//! Accounting entities.
//!
//! An entity is one independent set of books. Exactly one entity exists per
//! `(scope, company_id)` pair: the single global book has `scope = global`
//! and no company id, every tenant book has `scope = company` and the id of
//! its company. Entities are created lazily on first use and never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Which layer of books an entity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityScope {
    Global,
    Company,
}

impl EntityScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Company => "company",
        }
    }
}

impl TryFrom<&str> for EntityScope {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "global" => Ok(Self::Global),
            "company" => Ok(Self::Company),
            other => Err(LedgerError::InvalidScope(format!(
                "invalid entity scope: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_entities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub scope: String,
    pub company_id: Option<Uuid>,
    pub name: String,
    pub base_currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
    #[sea_orm(has_many = "super::journals::Entity")]
    Journals,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::journals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
