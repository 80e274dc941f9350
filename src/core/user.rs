//! User directory - Registration and lookup of the people the ledger knows.
//!
//! Group operations only ever store user ids. This module is the one place
//! that maps Discord accounts and email addresses onto those ids, and ids
//! back onto display names for read-side views.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Lower-cases and trims an email address for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers the Discord account `discord_id`, or updates its name and email
/// if it is already registered.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or the email has no `@`
/// - The email already belongs to another user
/// - The database operation fails
#[instrument(skip(db))]
pub async fn register_user(
    db: &DatabaseConnection,
    discord_id: &str,
    name: &str,
    email: &str,
) -> Result<user::Model> {
    let name = name.trim();
    let email = normalize_email(email);

    if name.is_empty() {
        return Err(Error::invalid_input("Name cannot be empty"));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(Error::invalid_input(format!(
            "'{email}' is not a valid email address"
        )));
    }

    let existing = find_user_by_discord_id(db, discord_id).await?;

    if let Some(owner) = find_user_by_email(db, &email).await? {
        if existing.as_ref().is_none_or(|me| me.id != owner.id) {
            return Err(Error::invalid_input(format!(
                "The email '{email}' is already registered to another user"
            )));
        }
    }

    let model = match existing {
        Some(current) => {
            let mut active: user::ActiveModel = current.into();
            active.name = Set(name.to_string());
            active.email = Set(email);
            active.update(db).await?
        }
        None => {
            let created = user::ActiveModel {
                discord_id: Set(discord_id.to_string()),
                name: Set(name.to_string()),
                email: Set(email),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!(user_id = created.id, "Registered new user");
            created
        }
    };

    Ok(model)
}

/// Finds a user by email (case-insensitive).
pub async fn find_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by their Discord user ID.
pub async fn find_user_by_discord_id<C>(db: &C, discord_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::DiscordId.eq(discord_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`find_user_by_discord_id`], but a missing registration is an error.
pub async fn require_user_by_discord_id(
    db: &DatabaseConnection,
    discord_id: &str,
) -> Result<user::Model> {
    find_user_by_discord_id(db, discord_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            lookup: format!("Discord account {discord_id} (use /register first)"),
        })
}

/// Retrieves a user by id.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Resolves a set of user ids to their directory entries. Unknown ids are
/// simply absent from the map.
pub async fn get_users_by_ids(
    db: &DatabaseConnection,
    user_ids: &[i64],
) -> Result<HashMap<i64, user::Model>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = User::find()
        .filter(user::Column::Id.is_in(user_ids.iter().copied()))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_register_user_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = register_user(&db, "1", "  ", "a@example.com").await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let result = register_user(&db, "1", "Alice", "not-an-email").await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_and_find_user() -> Result<()> {
        let db = setup_test_db().await?;

        let alice = register_user(&db, "111", "Alice", "  Alice@Example.COM ").await?;
        assert_eq!(alice.email, "alice@example.com");

        let by_email = find_user_by_email(&db, "ALICE@example.com").await?;
        assert_eq!(by_email, Some(alice.clone()));

        let by_discord = find_user_by_discord_id(&db, "111").await?;
        assert_eq!(by_discord, Some(alice.clone()));

        assert!(find_user_by_email(&db, "bob@example.com").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_register_again_updates_profile() -> Result<()> {
        let db = setup_test_db().await?;

        let first = register_user(&db, "111", "Alice", "alice@example.com").await?;
        let second = register_user(&db, "111", "Alice B", "alice.b@example.com").await?;

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Alice B");
        assert!(find_user_by_email(&db, "alice@example.com").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_email_cannot_be_taken_twice() -> Result<()> {
        let db = setup_test_db().await?;
        register_user(&db, "111", "Alice", "alice@example.com").await?;

        let result = register_user(&db, "222", "Mallory", "alice@example.com").await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_require_user_by_discord_id() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;

        assert_eq!(
            require_user_by_discord_id(&db, "discord-alice").await?.id,
            alice.id
        );
        assert!(matches!(
            require_user_by_discord_id(&db, "nobody").await,
            Err(Error::UserNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_users_by_ids() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;

        let users = get_users_by_ids(&db, &[alice.id, bob.id, 999]).await?;
        assert_eq!(users.len(), 2);
        assert_eq!(users[&bob.id].name, "bob");

        assert!(get_users_by_ids(&db, &[]).await?.is_empty());
        Ok(())
    }
}
