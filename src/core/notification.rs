//! Notification sink - Stores messages for users about group activity.
//!
//! Sending a notification never fails the operation that triggered it:
//! [`notify`] logs delivery problems and carries on.

use crate::{
    entities::{Notification, NotificationKind, notification},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, warn};

/// A notification waiting to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    /// Recipient user ID
    pub user_id: i64,
    /// What happened
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Full message text
    pub message: String,
    /// Structured payload
    pub data: Option<serde_json::Value>,
}

impl NewNotification {
    /// Builds a notification without a payload.
    pub fn new(
        user_id: i64,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches a structured payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Stores a notification, propagating any database error.
pub async fn create_notification<C>(db: &C, new: NewNotification) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    notification::ActiveModel {
        user_id: Set(new.user_id),
        kind: Set(new.kind),
        title: Set(new.title),
        message: Set(new.message),
        data: Set(new.data),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Fire-and-forget delivery: failures are logged and swallowed.
pub async fn notify(db: &DatabaseConnection, new: NewNotification) {
    let user_id = new.user_id;
    let kind = new.kind;
    match create_notification(db, new).await {
        Ok(stored) => debug!(user_id, ?kind, notification_id = stored.id, "Notification stored"),
        Err(e) => warn!(user_id, ?kind, "Failed to store notification: {e}"),
    }
}

/// Sends one notification per recipient, built by `build`.
pub async fn notify_all<F>(db: &DatabaseConnection, recipients: &[i64], build: F)
where
    F: Fn(i64) -> NewNotification,
{
    for user_id in recipients {
        notify(db, build(*user_id)).await;
    }
}

/// Retrieves a user's unread notifications, newest first.
pub async fn list_unread_notifications(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks every unread notification of a user as read and returns how many
/// were updated.
pub async fn mark_notifications_read(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_notify_swallows_database_errors() {
        // No query results configured: the insert fails inside the mock.
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        notify(
            &db,
            NewNotification::new(1, NotificationKind::GroupInvite, "t", "m"),
        )
        .await;
    }

    #[tokio::test]
    async fn test_notifications_round_trip_through_read_state() -> Result<()> {
        let db = setup_test_db().await?;

        notify(
            &db,
            NewNotification::new(7, NotificationKind::ExpenseAdded, "New expense", "Pizza")
                .with_data(serde_json::json!({ "expense_id": 3 })),
        )
        .await;
        notify(
            &db,
            NewNotification::new(7, NotificationKind::DebtSettled, "Settled", "Paid back"),
        )
        .await;
        notify(
            &db,
            NewNotification::new(8, NotificationKind::GroupInvite, "Invite", "Join us"),
        )
        .await;

        let unread = list_unread_notifications(&db, 7).await?;
        assert_eq!(unread.len(), 2);
        assert_eq!(unread[0].kind, NotificationKind::DebtSettled);
        assert_eq!(
            unread[1].data,
            Some(serde_json::json!({ "expense_id": 3 }))
        );

        assert_eq!(mark_notifications_read(&db, 7).await?, 2);
        assert!(list_unread_notifications(&db, 7).await?.is_empty());
        assert_eq!(list_unread_notifications(&db, 8).await?.len(), 1);
        Ok(())
    }
}
