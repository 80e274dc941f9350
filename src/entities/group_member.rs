//! Group member entity - An invited user's membership record in a group.
//!
//! Records start out `pending` and are answered exactly once. Leaving or being
//! removed deletes the record.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership status of an invited user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Invite sent, not answered yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Invite accepted, user participates in new expenses
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Invite declined
    #[sea_orm(string_value = "declined")]
    Declined,
}

impl MemberStatus {
    /// Lower-case label used in replies and notification payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

/// Group member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    /// Unique identifier for the membership record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group this record belongs to
    pub group_id: i64,
    /// Invited user
    pub user_id: i64,
    /// Current status of the invite
    pub status: MemberStatus,
    /// User who sent the (latest) invite
    pub invited_by: i64,
    /// When the (latest) invite was sent
    pub invited_at: DateTimeUtc,
    /// When the invite was accepted
    pub joined_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each member record belongs to one group
    #[sea_orm(
        belongs_to = "super::split_group::Entity",
        from = "Column::GroupId",
        to = "super::split_group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
}

impl Related<super::split_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
