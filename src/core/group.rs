//! Group business logic - Creating, loading, updating, and deleting groups.
//!
//! Every mutating operation follows the same shape: open a database
//! transaction, load a [`GroupState`] snapshot, validate it with the pure
//! ledger, claim the group's version, write, commit, and only then notify.
//! [`claim_group_version`] is what keeps two writers on the same group from
//! interleaving: the second one finds the version already moved and fails
//! with `ConcurrentModification` before writing anything.

use crate::{
    core::{
        notification::{self, NewNotification},
        user,
    },
    entities::{
        ExpenseSplit, GroupExpense, GroupMember, MemberStatus, NotificationKind, SplitGroup,
        expense_split, group_expense, group_member, split_group,
    },
    errors::{Error, Result},
    ledger::{ExpenseEntry, GroupState, membership},
};
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

/// Changes to apply to a group. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    /// New name
    pub name: Option<String>,
    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,
    /// New automatic settlement bookkeeping flag
    pub auto_settle_transaction: Option<bool>,
}

/// Creates a new group owned by `creator_id`.
///
/// The creator becomes an implicit, permanent participant and is not added to
/// the member list.
///
/// # Errors
/// Returns an error if the name is empty, the creator is not registered, or
/// the insert fails.
#[instrument(skip(db, description))]
pub async fn create_group(
    db: &DatabaseConnection,
    name: &str,
    description: Option<String>,
    creator_id: i64,
    auto_settle_transaction: bool,
) -> Result<split_group::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_input("Group name cannot be empty"));
    }

    if user::get_user_by_id(db, creator_id).await?.is_none() {
        return Err(Error::UserNotFound {
            lookup: creator_id.to_string(),
        });
    }

    let group = split_group::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description.filter(|d| !d.trim().is_empty())),
        created_by: Set(creator_id),
        auto_settle_transaction: Set(auto_settle_transaction),
        version: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(group_id = group.id, "Created group");
    Ok(group)
}

/// Finds a group by id.
pub async fn get_group_by_id<C>(db: &C, group_id: i64) -> Result<Option<split_group::Model>>
where
    C: ConnectionTrait,
{
    SplitGroup::find_by_id(group_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads the full aggregate snapshot of a group: the group row, its member
/// records ordered by id, and its expenses (oldest first) with their splits.
pub async fn load_group_state<C>(db: &C, group_id: i64) -> Result<GroupState>
where
    C: ConnectionTrait,
{
    let group = get_group_by_id(db, group_id)
        .await?
        .ok_or_else(|| Error::GroupNotFound {
            group: group_id.to_string(),
        })?;

    let members = GroupMember::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .order_by_asc(group_member::Column::Id)
        .all(db)
        .await?;

    let expenses = GroupExpense::find()
        .filter(group_expense::Column::GroupId.eq(group_id))
        .order_by_asc(group_expense::Column::Id)
        .find_with_related(ExpenseSplit)
        .order_by_asc(expense_split::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|(expense, splits)| ExpenseEntry { expense, splits })
        .collect();

    Ok(GroupState {
        group,
        members,
        expenses,
    })
}

/// Atomically bumps the group's version, failing if it no longer matches the
/// snapshot the caller validated against.
///
/// Performs `UPDATE split_groups SET version = version + 1 WHERE id = ? AND
/// version = ?`; zero affected rows means another writer got there first.
pub async fn claim_group_version<C>(db: &C, group: &split_group::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = SplitGroup::update_many()
        .col_expr(
            split_group::Column::Version,
            Expr::col(split_group::Column::Version).add(1),
        )
        .filter(split_group::Column::Id.eq(group.id))
        .filter(split_group::Column::Version.eq(group.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ConcurrentModification { group_id: group.id });
    }
    Ok(())
}

/// Updates a group's name, description, or settlement bookkeeping flag.
/// Only the creator may do this.
#[instrument(skip(db))]
pub async fn update_group(
    db: &DatabaseConnection,
    group_id: i64,
    requester: i64,
    changes: GroupUpdate,
) -> Result<split_group::Model> {
    if let Some(name) = &changes.name {
        if name.trim().is_empty() {
            return Err(Error::invalid_input("Group name cannot be empty"));
        }
    }

    let txn = db.begin().await?;
    let state = load_group_state(&txn, group_id).await?;
    membership::ensure_creator(&state, requester, "update the group")?;
    claim_group_version(&txn, &state.group).await?;

    let mut active: split_group::ActiveModel = state.group.into();
    if let Some(name) = changes.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        active.description = Set(description.filter(|d| !d.trim().is_empty()));
    }
    if let Some(flag) = changes.auto_settle_transaction {
        active.auto_settle_transaction = Set(flag);
    }
    if active.is_changed() {
        active.update(&txn).await?;
    }

    let updated = get_group_by_id(&txn, group_id)
        .await?
        .ok_or_else(|| Error::GroupNotFound {
            group: group_id.to_string(),
        })?;
    txn.commit().await?;

    info!(group_id, "Updated group");
    Ok(updated)
}

/// Deletes a group together with its members, expenses, and splits.
///
/// Only the creator may delete a group. Every accepted member is notified
/// before the group is removed.
#[instrument(skip(db))]
pub async fn delete_group(db: &DatabaseConnection, group_id: i64, requester: i64) -> Result<()> {
    let state = load_group_state(db, group_id).await?;
    let recipients = membership::plan_group_deletion(&state, requester)?;

    let group_name = state.group.name.clone();
    notification::notify_all(db, &recipients, |user_id| {
        NewNotification::new(
            user_id,
            NotificationKind::GroupDeleted,
            "Group deleted",
            format!("The group '{group_name}' was deleted by its creator"),
        )
        .with_data(serde_json::json!({ "group_id": group_id }))
    })
    .await;

    let txn = db.begin().await?;
    claim_group_version(&txn, &state.group).await?;

    let expense_ids: Vec<i64> = state.expenses.iter().map(|e| e.expense.id).collect();
    if !expense_ids.is_empty() {
        ExpenseSplit::delete_many()
            .filter(expense_split::Column::ExpenseId.is_in(expense_ids))
            .exec(&txn)
            .await?;
    }
    GroupExpense::delete_many()
        .filter(group_expense::Column::GroupId.eq(group_id))
        .exec(&txn)
        .await?;
    GroupMember::delete_many()
        .filter(group_member::Column::GroupId.eq(group_id))
        .exec(&txn)
        .await?;
    SplitGroup::delete_by_id(group_id).exec(&txn).await?;
    txn.commit().await?;

    info!(group_id, "Deleted group");
    Ok(())
}

/// Groups the user created or has accepted membership in, ordered by id.
pub async fn list_groups_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<split_group::Model>> {
    let member_of: Vec<i64> = GroupMember::find()
        .select_only()
        .column(group_member::Column::GroupId)
        .filter(group_member::Column::UserId.eq(user_id))
        .filter(group_member::Column::Status.eq(MemberStatus::Accepted))
        .into_tuple()
        .all(db)
        .await?;

    SplitGroup::find()
        .filter(
            Condition::any()
                .add(split_group::Column::CreatedBy.eq(user_id))
                .add(split_group::Column::Id.is_in(member_of)),
        )
        .order_by_asc(split_group::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds one of the user's groups by name (case-insensitive) or by id.
pub async fn find_group_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    name_or_id: &str,
) -> Result<split_group::Model> {
    let wanted = name_or_id.trim();
    let groups = list_groups_for_user(db, user_id).await?;

    let by_name = groups
        .iter()
        .find(|g| g.name.eq_ignore_ascii_case(wanted))
        .cloned();
    let by_id = || {
        wanted
            .parse::<i64>()
            .ok()
            .and_then(|id| groups.iter().find(|g| g.id == id).cloned())
    };

    by_name.or_else(by_id).ok_or_else(|| Error::GroupNotFound {
        group: wanted.to_string(),
    })
}

/// Pending invites addressed to the user, with the group each belongs to.
pub async fn list_pending_invites(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<(group_member::Model, split_group::Model)>> {
    let invites = GroupMember::find()
        .filter(group_member::Column::UserId.eq(user_id))
        .filter(group_member::Column::Status.eq(MemberStatus::Pending))
        .order_by_asc(group_member::Column::Id)
        .find_also_related(SplitGroup)
        .all(db)
        .await?;

    Ok(invites
        .into_iter()
        .filter_map(|(member, group)| group.map(|g| (member, g)))
        .collect())
}

/// Finds a pending invite for the user by group name (case-insensitive) or id.
pub async fn find_pending_invite(
    db: &DatabaseConnection,
    user_id: i64,
    name_or_id: &str,
) -> Result<split_group::Model> {
    let wanted = name_or_id.trim();
    list_pending_invites(db, user_id)
        .await?
        .into_iter()
        .map(|(_, group)| group)
        .find(|g| g.name.eq_ignore_ascii_case(wanted) || g.id.to_string() == wanted)
        .ok_or_else(|| Error::GroupNotFound {
            group: wanted.to_string(),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{expense, membership as membership_ops, notification as notes};
    use crate::ledger::SplitRequest;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_group_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_group(&db, "   ", None, 1, false).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_group_requires_registered_creator() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_group(&db, "Trip", None, 42, false).await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_load_group() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;

        let group = create_group(
            &db,
            " Lisbon trip ",
            Some("Flights and food".to_string()),
            alice.id,
            true,
        )
        .await?;
        assert_eq!(group.name, "Lisbon trip");
        assert_eq!(group.created_by, alice.id);
        assert!(group.auto_settle_transaction);
        assert_eq!(group.version, 0);

        let state = load_group_state(&db, group.id).await?;
        assert_eq!(state.group, group);
        assert!(state.members.is_empty());
        assert!(state.expenses.is_empty());
        assert_eq!(state.participants(), vec![alice.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_group() -> Result<()> {
        let db = setup_test_db().await?;
        let result = load_group_state(&db, 404).await;
        assert!(matches!(result, Err(Error::GroupNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_group_version_detects_stale_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let group = create_test_group(&db, &alice).await?;

        claim_group_version(&db, &group).await?;
        let stale = claim_group_version(&db, &group).await;
        assert!(matches!(
            stale,
            Err(Error::ConcurrentModification { group_id }) if group_id == group.id
        ));

        let fresh = get_group_by_id(&db, group.id).await?.unwrap();
        assert_eq!(fresh.version, 1);
        claim_group_version(&db, &fresh).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_group_is_creator_only() -> Result<()> {
        let (db, group, users) = setup_with_group(&["alice", "bob"]).await?;

        let denied = update_group(
            &db,
            group.id,
            users[1].id,
            GroupUpdate {
                name: Some("Bob's".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(denied, Err(Error::Forbidden { .. })));

        let updated = update_group(
            &db,
            group.id,
            users[0].id,
            GroupUpdate {
                name: Some("Flat".to_string()),
                description: Some(Some("Rent and bills".to_string())),
                auto_settle_transaction: Some(true),
            },
        )
        .await?;
        assert_eq!(updated.name, "Flat");
        assert_eq!(updated.description.as_deref(), Some("Rent and bills"));
        assert!(updated.auto_settle_transaction);
        assert_eq!(updated.version, group.version + 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_group_is_creator_only() -> Result<()> {
        let (db, group, users) = setup_with_group(&["alice", "bob"]).await?;

        let result = delete_group(&db, group.id, users[1].id).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        assert!(get_group_by_id(&db, group.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_group_removes_everything_and_notifies_members() -> Result<()> {
        let (db, group, users) = setup_with_group(&["alice", "bob", "carol"]).await?;
        let dave = create_test_user(&db, "dave").await?;
        membership_ops::invite_member(&db, group.id, users[0].id, &dave.email).await?;
        expense::add_expense(
            &db,
            group.id,
            users[0].id,
            expense::NewExpense::new("Groceries", 30.0, SplitRequest::Equal),
        )
        .await?;

        delete_group(&db, group.id, users[0].id).await?;

        assert!(matches!(
            load_group_state(&db, group.id).await,
            Err(Error::GroupNotFound { .. })
        ));
        assert!(ExpenseSplit::find().all(&db).await?.is_empty());
        assert!(GroupMember::find().all(&db).await?.is_empty());

        for member in [&users[1], &users[2]] {
            let unread = notes::list_unread_notifications(&db, member.id).await?;
            assert_eq!(unread[0].kind, NotificationKind::GroupDeleted);
        }
        // Dave was only pending: invited, but not told about the deletion.
        let dave_notes = notes::list_unread_notifications(&db, dave.id).await?;
        assert!(
            dave_notes
                .iter()
                .all(|n| n.kind != NotificationKind::GroupDeleted)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_find_groups_for_user() -> Result<()> {
        let (db, group, users) = setup_with_group(&["alice", "bob"]).await?;
        let carol = create_test_user(&db, "carol").await?;
        let other = create_group(&db, "Book Club", None, carol.id, false).await?;
        membership_ops::invite_member(&db, other.id, carol.id, &users[1].email).await?;

        let alice_groups = list_groups_for_user(&db, users[0].id).await?;
        assert_eq!(alice_groups, vec![group.clone()]);

        // Bob is accepted in the first group and only invited to the second.
        let bob_groups = list_groups_for_user(&db, users[1].id).await?;
        assert_eq!(bob_groups.len(), 1);

        let found = find_group_for_user(&db, users[1].id, "test group").await?;
        assert_eq!(found.id, group.id);
        let found = find_group_for_user(&db, users[1].id, &group.id.to_string()).await?;
        assert_eq!(found.id, group.id);
        assert!(matches!(
            find_group_for_user(&db, users[1].id, "Book Club").await,
            Err(Error::GroupNotFound { .. })
        ));

        let invites = list_pending_invites(&db, users[1].id).await?;
        assert_eq!(invites.len(), 1);
        assert_eq!(invites[0].1.id, other.id);
        assert_eq!(
            find_pending_invite(&db, users[1].id, "book club").await?.id,
            other.id
        );
        Ok(())
    }
}
