//! Chart-of-accounts groups (third level of the hierarchy).
//!
//! Groups are the unit a tenant customizes when adding its own accounts;
//! global rows only exist as the template `import_standard_chart` clones.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subheading_id: Uuid,
    pub group_code: i32,
    pub name: String,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subheadings::Entity",
        from = "Column::SubheadingId",
        to = "super::subheadings::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Subheadings,
}

impl Related<super::subheadings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subheadings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
