//! Notification entity - Messages left for users about group activity.
//!
//! Notifications are written after the change they describe has committed and
//! are never part of that change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a notification is about
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone invited the user to a group
    #[sea_orm(string_value = "group_invite")]
    GroupInvite,
    /// An invitee accepted the user's invite
    #[sea_orm(string_value = "invite_accepted")]
    InviteAccepted,
    /// An invitee declined the user's invite
    #[sea_orm(string_value = "invite_declined")]
    InviteDeclined,
    /// A new expense includes the user
    #[sea_orm(string_value = "expense_added")]
    ExpenseAdded,
    /// Someone settled a debt with the user
    #[sea_orm(string_value = "debt_settled")]
    DebtSettled,
    /// A member left the user's group
    #[sea_orm(string_value = "member_left")]
    MemberLeft,
    /// A group the user belonged to was deleted
    #[sea_orm(string_value = "group_deleted")]
    GroupDeleted,
    /// The user was removed from a group
    #[sea_orm(string_value = "member_removed")]
    MemberRemoved,
}

/// Notification database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipient user ID
    pub user_id: i64,
    /// What happened
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Full message text
    pub message: String,
    /// Structured payload (group id, expense id, amounts)
    pub data: Option<Json>,
    /// Whether the recipient has seen it
    pub is_read: bool,
    /// When the notification was created
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
