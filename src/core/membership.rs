//! Membership business logic - Invites, responses, leaving, and removal.

use crate::{
    core::{
        group::{claim_group_version, load_group_state},
        notification::{self, NewNotification},
        user,
    },
    entities::{GroupMember, MemberStatus, NotificationKind, group_member},
    errors::{Error, Result},
    ledger::{InvitePlan, membership},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde_json::json;
use tracing::{info, instrument};

/// Invites the registered user with `email` into the group.
///
/// The inviter must be the creator or an accepted member. A user who
/// previously declined can be invited again; their record goes back to
/// `pending`.
///
/// # Errors
/// Returns `UserNotFound` for an unknown email, `Forbidden` for an inviter
/// who does not participate, `InvalidInvite` when inviting the creator, and
/// `AlreadyMember` for a pending or accepted invitee.
#[instrument(skip(db))]
pub async fn invite_member(
    db: &DatabaseConnection,
    group_id: i64,
    inviter: i64,
    email: &str,
) -> Result<group_member::Model> {
    let invitee = user::find_user_by_email(db, email)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            lookup: email.trim().to_string(),
        })?;

    let txn = db.begin().await?;
    let state = load_group_state(&txn, group_id).await?;
    let plan = membership::plan_invite(&state, inviter, invitee.id)?;
    claim_group_version(&txn, &state.group).await?;

    let now = chrono::Utc::now();
    let record = match plan {
        InvitePlan::NewMember => {
            group_member::ActiveModel {
                group_id: Set(group_id),
                user_id: Set(invitee.id),
                status: Set(MemberStatus::Pending),
                invited_by: Set(inviter),
                invited_at: Set(now),
                joined_at: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
        InvitePlan::Reinvite { member_id } => {
            group_member::ActiveModel {
                id: Set(member_id),
                status: Set(MemberStatus::Pending),
                invited_by: Set(inviter),
                invited_at: Set(now),
                joined_at: Set(None),
                ..Default::default()
            }
            .update(&txn)
            .await?
        }
    };
    txn.commit().await?;

    info!(group_id, invitee = invitee.id, "Invited member");

    let inviter_name = user::get_user_by_id(db, inviter)
        .await?
        .map_or_else(|| "Someone".to_string(), |u| u.name);
    notification::notify(
        db,
        NewNotification::new(
            invitee.id,
            NotificationKind::GroupInvite,
            "Group invite",
            format!(
                "{inviter_name} invited you to join '{}'",
                state.group.name
            ),
        )
        .with_data(json!({ "group_id": group_id, "invited_by": inviter })),
    )
    .await;

    Ok(record)
}

/// Accepts or declines the user's pending invite. Accepting records the join
/// time; the inviter is notified either way.
#[instrument(skip(db))]
pub async fn respond_to_invite(
    db: &DatabaseConnection,
    group_id: i64,
    user_id: i64,
    accept: bool,
) -> Result<group_member::Model> {
    let txn = db.begin().await?;
    let state = load_group_state(&txn, group_id).await?;
    let pending = membership::plan_response(&state, user_id)?;
    let inviter = pending.invited_by;
    let member_id = pending.id;
    claim_group_version(&txn, &state.group).await?;

    let (status, joined_at) = if accept {
        (MemberStatus::Accepted, Some(chrono::Utc::now()))
    } else {
        (MemberStatus::Declined, None)
    };
    let record = group_member::ActiveModel {
        id: Set(member_id),
        status: Set(status),
        joined_at: Set(joined_at),
        ..Default::default()
    }
    .update(&txn)
    .await?;
    txn.commit().await?;

    info!(group_id, user_id, status = status.as_str(), "Answered invite");

    let name = user::get_user_by_id(db, user_id)
        .await?
        .map_or_else(|| "Someone".to_string(), |u| u.name);
    let (kind, title, verb) = if accept {
        (NotificationKind::InviteAccepted, "Invite accepted", "accepted")
    } else {
        (NotificationKind::InviteDeclined, "Invite declined", "declined")
    };
    notification::notify(
        db,
        NewNotification::new(
            inviter,
            kind,
            title,
            format!(
                "{name} {verb} your invite to '{}'",
                state.group.name
            ),
        )
        .with_data(json!({ "group_id": group_id, "user_id": user_id })),
    )
    .await;

    Ok(record)
}

/// Removes the user's own membership record, whatever its status. Their
/// existing expense splits stay in the ledger. The creator is notified.
#[instrument(skip(db))]
pub async fn leave_group(db: &DatabaseConnection, group_id: i64, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let state = load_group_state(&txn, group_id).await?;
    let member_id = membership::plan_leave(&state, user_id)?.id;
    claim_group_version(&txn, &state.group).await?;
    GroupMember::delete_by_id(member_id).exec(&txn).await?;
    txn.commit().await?;

    info!(group_id, user_id, "Member left group");

    let name = user::get_user_by_id(db, user_id)
        .await?
        .map_or_else(|| "Someone".to_string(), |u| u.name);
    notification::notify(
        db,
        NewNotification::new(
            state.creator(),
            NotificationKind::MemberLeft,
            "Member left",
            format!("{name} left '{}'", state.group.name),
        )
        .with_data(json!({ "group_id": group_id, "user_id": user_id })),
    )
    .await;

    Ok(())
}

/// Removes another user's membership record. Only the creator may do this;
/// the removed user is notified.
#[instrument(skip(db))]
pub async fn remove_member(
    db: &DatabaseConnection,
    group_id: i64,
    requester: i64,
    user_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;
    let state = load_group_state(&txn, group_id).await?;
    let member_id = membership::plan_removal(&state, requester, user_id)?.id;
    claim_group_version(&txn, &state.group).await?;
    GroupMember::delete_by_id(member_id).exec(&txn).await?;
    txn.commit().await?;

    info!(group_id, user_id, "Removed member");

    notification::notify(
        db,
        NewNotification::new(
            user_id,
            NotificationKind::MemberRemoved,
            "Removed from group",
            format!("You were removed from '{}'", state.group.name),
        )
        .with_data(json!({ "group_id": group_id })),
    )
    .await;

    Ok(())
}
