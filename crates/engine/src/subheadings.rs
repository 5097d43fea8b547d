//! Chart-of-accounts subheadings (second level of the hierarchy).
//!
//! Same two-layer override model as headings, keyed by
//! `(head_code, subhead_code)`. The `head_code` half of the key is reached
//! through `heading_id`: an override row is parented under the heading that
//! was effective for its company when the override was created.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_subheadings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub heading_id: Uuid,
    pub subhead_code: i32,
    pub name: String,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::headings::Entity",
        from = "Column::HeadingId",
        to = "super::headings::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Headings,
    #[sea_orm(has_many = "super::groups::Entity")]
    Groups,
}

impl Related<super::headings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Headings.def()
    }
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
