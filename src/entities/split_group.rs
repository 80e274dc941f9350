//! Split group entity - The aggregate root for shared expenses.
//!
//! A group owns its member records and its expenses. The creator is an
//! implicit, permanent participant and never appears in `group_members`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Split group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "split_groups")]
pub struct Model {
    /// Unique identifier for the group
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group name (e.g., "Flat 3B", "Lisbon trip")
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// User ID of the creator
    pub created_by: i64,
    /// Whether settling a debt also records a personal transaction for the payer
    pub auto_settle_transaction: bool,
    /// Optimistic concurrency counter, bumped by every mutation of the group
    pub version: i64,
    /// When the group was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between a group and its owned records
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One group has many member records
    #[sea_orm(has_many = "super::group_member::Entity")]
    Members,
    /// One group has many expenses
    #[sea_orm(has_many = "super::group_expense::Entity")]
    Expenses,
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::group_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
