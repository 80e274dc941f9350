//! User entity - The directory of people known to the ledger.
//!
//! Users are linked to a Discord account and identified across groups by their
//! email address, which is how invites address them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID this directory entry belongs to
    #[sea_orm(unique)]
    pub discord_id: String,
    /// Display name shown in group views
    pub name: String,
    /// Lower-cased email address used for invites
    #[sea_orm(unique)]
    pub email: String,
    /// When the user registered
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
