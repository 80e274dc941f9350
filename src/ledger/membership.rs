//! Membership state machine.
//!
//! Per (group, user) pair: `pending -> accepted`, `pending -> declined`, and
//! any record can be removed by leaving. A `declined` record can be reset to
//! `pending` by a fresh invite; `pending` and `accepted` records cannot. The
//! creator is never in the member list, so none of these transitions apply
//! to them.

use super::{GroupState, UserId};
use crate::{
    entities::{MemberStatus, group_member},
    errors::{Error, Result},
};

/// What an accepted invite should do to the member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitePlan {
    /// Append a new pending record
    NewMember,
    /// Reset an existing declined record to pending
    Reinvite {
        /// Id of the declined record
        member_id: i64,
    },
}

/// Validates an invite of `invitee` by `inviter`.
pub fn plan_invite(state: &GroupState, inviter: UserId, invitee: UserId) -> Result<InvitePlan> {
    if !state.is_participant(inviter) {
        return Err(Error::forbidden(
            "only the group creator and accepted members can invite",
        ));
    }
    if state.is_creator(invitee) {
        return Err(Error::InvalidInvite {
            reason: "the group creator is already part of the group".to_string(),
        });
    }

    match state.member(invitee) {
        None => Ok(InvitePlan::NewMember),
        Some(member) if member.status == MemberStatus::Declined => {
            Ok(InvitePlan::Reinvite {
                member_id: member.id,
            })
        }
        Some(member) => Err(Error::AlreadyMember {
            status: member.status,
        }),
    }
}

/// Finds the pending record `user_id` is answering.
pub fn plan_response(state: &GroupState, user_id: UserId) -> Result<&group_member::Model> {
    state
        .member(user_id)
        .filter(|m| m.status == MemberStatus::Pending)
        .ok_or(Error::MembershipNotFound {
            user_id,
            expected: "pending",
        })
}

/// Finds the record `user_id` is leaving. The creator cannot leave.
pub fn plan_leave(state: &GroupState, user_id: UserId) -> Result<&group_member::Model> {
    if state.is_creator(user_id) {
        return Err(Error::forbidden(
            "the group creator cannot leave; delete the group instead",
        ));
    }
    state.member(user_id).ok_or(Error::MembershipNotFound {
        user_id,
        expected: "any",
    })
}

/// Finds the record the creator wants to remove.
pub fn plan_removal(
    state: &GroupState,
    requester: UserId,
    user_id: UserId,
) -> Result<&group_member::Model> {
    if !state.is_creator(requester) {
        return Err(Error::forbidden("only the group creator can remove members"));
    }
    if state.is_creator(user_id) {
        return Err(Error::forbidden("the group creator cannot be removed"));
    }
    state.member(user_id).ok_or(Error::MembershipNotFound {
        user_id,
        expected: "any",
    })
}

/// Checks that `requester` created the group.
pub fn ensure_creator(state: &GroupState, requester: UserId, action: &str) -> Result<()> {
    if state.is_creator(requester) {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "only the group creator can {action}"
        )))
    }
}

/// Validates a group deletion and returns the accepted members to notify.
pub fn plan_group_deletion(state: &GroupState, requester: UserId) -> Result<Vec<UserId>> {
    ensure_creator(state, requester, "delete the group")?;
    Ok(state
        .members
        .iter()
        .filter(|m| m.status == MemberStatus::Accepted)
        .map(|m| m.user_id)
        .collect())
}
