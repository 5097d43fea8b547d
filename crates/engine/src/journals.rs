//! Journal headers.
//!
//! A journal is one atomic, balanced, immutable posting event. There is no
//! draft state in this core: a journal row exists iff it was posted, and no
//! update or delete path exists. Corrections are new journals with reversing
//! lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::journal_lines::LineInput;

/// Input for `post_journal`: everything a journal needs besides the entity
/// that owns it.
///
/// When `reference` is set it doubles as the journal number, so posting the
/// same reference twice raises `DuplicateJournalNumber` instead of silently
/// double-booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalDraft {
    pub journal_type: String,
    pub date: Date,
    pub description: Option<String>,
    pub reference: Option<String>,
    /// Overrides the entity's base currency when set.
    pub currency: Option<String>,
    pub lines: Vec<LineInput>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_journals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_id: Uuid,
    pub journal_no: String,
    pub journal_type: String,
    pub date: Date,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub currency: String,
    pub is_posted: bool,
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
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::entities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entities.def()
    }
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
