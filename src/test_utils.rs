//! Shared test utilities for `SplitBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults. The [`fixtures`] module
//! builds in-memory snapshots for the pure ledger tests.

use crate::{
    core::{group, membership, user},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a test user with sensible defaults.
///
/// # Defaults
/// * `discord_id`: `"discord-<name>"`
/// * `email`: `"<name>@example.com"`
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::user::Model> {
    user::register_user(
        db,
        &format!("discord-{name}"),
        name,
        &format!("{name}@example.com"),
    )
    .await
}

/// Creates a group owned by `creator` with automatic settlement bookkeeping
/// turned off.
pub async fn create_test_group(
    db: &DatabaseConnection,
    creator: &entities::user::Model,
) -> Result<entities::split_group::Model> {
    group::create_group(db, "Test Group", None, creator.id, false).await
}

/// Invites `member` into `group` on behalf of the creator and accepts the
/// invite.
pub async fn add_accepted_member(
    db: &DatabaseConnection,
    group: &entities::split_group::Model,
    member: &entities::user::Model,
) -> Result<()> {
    membership::invite_member(db, group.id, group.created_by, &member.email).await?;
    membership::respond_to_invite(db, group.id, member.id, true).await?;
    Ok(())
}

/// Sets up a complete test environment: users with the given names, the
/// first of which creates a group that all others have joined.
/// Returns (db, group, users).
pub async fn setup_with_group(
    names: &[&str],
) -> Result<(
    DatabaseConnection,
    entities::split_group::Model,
    Vec<entities::user::Model>,
)> {
    let db = setup_test_db().await?;
    let mut users = Vec::with_capacity(names.len());
    for name in names {
        users.push(create_test_user(&db, name).await?);
    }
    let group = create_test_group(&db, &users[0]).await?;
    for member in &users[1..] {
        add_accepted_member(&db, &group, member).await?;
    }
    Ok((db, group, users))
}

/// Builders for in-memory ledger snapshots.
pub mod fixtures {
    use crate::{
        entities::{MemberStatus, SplitType, expense_split, group_expense, group_member, split_group},
        ledger::{ExpenseEntry, GroupState, UserId},
    };
    use chrono::{DateTime, Utc};

    /// A fixed point in time so snapshots compare equal.
    #[must_use]
    pub fn fixed_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    /// A group row with id 1 created by `creator`.
    #[must_use]
    pub fn group_model(creator: UserId) -> split_group::Model {
        split_group::Model {
            id: 1,
            name: "Fixture Group".to_string(),
            description: None,
            created_by: creator,
            auto_settle_transaction: false,
            version: 0,
            created_at: fixed_time(),
        }
    }

    /// A snapshot of group 1 with the given member records and no expenses.
    #[must_use]
    pub fn state_with_members(creator: UserId, members: &[(UserId, MemberStatus)]) -> GroupState {
        let members = members
            .iter()
            .zip(1..)
            .map(|((user_id, status), id)| group_member::Model {
                id,
                group_id: 1,
                user_id: *user_id,
                status: *status,
                invited_by: creator,
                invited_at: fixed_time(),
                joined_at: (*status == MemberStatus::Accepted).then(fixed_time),
            })
            .collect();

        GroupState {
            group: group_model(creator),
            members,
            expenses: Vec::new(),
        }
    }

    /// Appends an expense recorded by its payer with unsettled custom splits.
    pub fn push_expense(state: &mut GroupState, paid_by: UserId, amount: f64, splits: &[(UserId, f64)]) {
        push_expense_by(state, paid_by, paid_by, amount, splits);
    }

    /// Appends an expense recorded by `created_by` with unsettled custom splits.
    pub fn push_expense_by(
        state: &mut GroupState,
        paid_by: UserId,
        created_by: UserId,
        amount: f64,
        splits: &[(UserId, f64)],
    ) {
        let expense_id = i64::try_from(state.expenses.len()).unwrap_or_default() + 1;
        let first_split_id = i64::try_from(
            state
                .expenses
                .iter()
                .map(|e| e.splits.len())
                .sum::<usize>(),
        )
        .unwrap_or_default()
            + 1;

        let splits = splits
            .iter()
            .zip(first_split_id..)
            .map(|((user_id, share), id)| expense_split::Model {
                id,
                expense_id,
                user_id: *user_id,
                amount: *share,
                percentage: None,
                settled: false,
                settled_at: None,
            })
            .collect();

        state.expenses.push(ExpenseEntry {
            expense: group_expense::Model {
                id: expense_id,
                group_id: state.group.id,
                description: format!("Expense {expense_id}"),
                amount,
                paid_by,
                split_type: SplitType::Custom,
                date: fixed_time(),
                created_by,
            },
            splits,
        });
    }
}
