//! Group view generation.
//!
//! Builds the read-side projection of a group: who is in it, what has been
//! spent, and who owes whom. The money math happens on the raw snapshot;
//! names are resolved afterwards so the bot layer can print them directly.

use crate::{
    core::{group::load_group_state, user},
    entities::{MemberStatus, split_group},
    errors::Result,
    ledger::{ExpenseEntry, UserId, calculate_balances, simplify_debts},
};
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, fmt::Write};

/// One person shown in a group view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewMember {
    /// User ID
    pub user_id: UserId,
    /// Display name, or the id if the user is unknown
    pub name: String,
    /// Membership status; `None` for the creator
    pub status: Option<MemberStatus>,
    /// Current net balance; `None` for members who do not participate
    pub balance: Option<f64>,
}

/// A suggested payment with names resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDebt {
    /// Paying user
    pub from: UserId,
    /// Paying user's name
    pub from_name: String,
    /// Receiving user
    pub to: UserId,
    /// Receiving user's name
    pub to_name: String,
    /// Amount in cents precision
    pub amount: f64,
}

/// Everything needed to display a group.
#[derive(Debug, Clone)]
pub struct GroupView {
    /// The group row
    pub group: split_group::Model,
    /// Creator first, then member records in invite order
    pub members: Vec<ViewMember>,
    /// Expenses, oldest first, with their splits
    pub expenses: Vec<ExpenseEntry>,
    /// Net balance per participant
    pub balances: HashMap<UserId, f64>,
    /// Simplified list of payments that clears every balance
    pub debts: Vec<ViewDebt>,
    /// Names of every user referenced by the group
    pub names: HashMap<UserId, String>,
}

impl GroupView {
    /// Resolves a user id to a display name.
    #[must_use]
    pub fn name_of(&self, user_id: UserId) -> String {
        display_name(&self.names, user_id)
    }
}

fn display_name(names: &HashMap<UserId, String>, user_id: UserId) -> String {
    names
        .get(&user_id)
        .cloned()
        .unwrap_or_else(|| format!("user #{user_id}"))
}

/// Builds the view of a group for `requester`.
///
/// # Errors
/// Returns `GroupNotFound` for an unknown group and `Forbidden` when the
/// requester is neither the creator nor an accepted member.
pub async fn get_group_view(
    db: &DatabaseConnection,
    group_id: i64,
    requester: UserId,
) -> Result<GroupView> {
    let state = load_group_state(db, group_id).await?;
    state.ensure_participant(requester)?;

    let balances = calculate_balances(&state);
    let debts = simplify_debts(&balances);

    let mut ids: Vec<UserId> = std::iter::once(state.creator())
        .chain(state.members.iter().map(|m| m.user_id))
        .chain(state.expenses.iter().flat_map(|e| {
            std::iter::once(e.expense.paid_by).chain(e.splits.iter().map(|s| s.user_id))
        }))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let names: HashMap<UserId, String> = user::get_users_by_ids(db, &ids)
        .await?
        .into_iter()
        .map(|(id, u)| (id, u.name))
        .collect();

    let members = std::iter::once(ViewMember {
        user_id: state.creator(),
        name: display_name(&names, state.creator()),
        status: None,
        balance: balances.get(&state.creator()).copied(),
    })
    .chain(state.members.iter().map(|m| ViewMember {
        user_id: m.user_id,
        name: display_name(&names, m.user_id),
        status: Some(m.status),
        balance: balances.get(&m.user_id).copied(),
    }))
    .collect();

    let debts = debts
        .into_iter()
        .map(|d| ViewDebt {
            from: d.from,
            from_name: display_name(&names, d.from),
            to: d.to,
            to_name: display_name(&names, d.to),
            amount: d.amount,
        })
        .collect();

    Ok(GroupView {
        group: state.group,
        members,
        expenses: state.expenses,
        balances: balances.into_iter().collect(),
        debts,
        names,
    })
}

/// Formats a group view as a Discord message body.
///
/// # Errors
/// Returns an error if writing to the string fails.
pub fn format_group_view(view: &GroupView, currency: &str) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "**{}**", view.group.name)?;
    if let Some(description) = &view.group.description {
        writeln!(out, "_{description}_")?;
    }
    writeln!(out)?;

    writeln!(out, "**Members**")?;
    for member in &view.members {
        let role = member.status.map_or("creator", MemberStatus::as_str);
        match member.balance {
            Some(balance) => writeln!(
                out,
                "• {} ({role}): {}{currency}{:.2}",
                member.name,
                if balance < 0.0 { "-" } else { "" },
                balance.abs()
            )?,
            None => writeln!(out, "• {} ({role})", member.name)?,
        }
    }

    writeln!(out)?;
    writeln!(out, "**Expenses**")?;
    if view.expenses.is_empty() {
        writeln!(out, "_No expenses yet_")?;
    }
    for entry in &view.expenses {
        let open = entry.splits.iter().filter(|s| !s.settled).count();
        writeln!(
            out,
            "• #{} {} - {currency}{:.2} paid by {} ({}, {open}/{} open)",
            entry.expense.id,
            entry.expense.description,
            entry.expense.amount,
            view.name_of(entry.expense.paid_by),
            entry.expense.split_type,
            entry.splits.len()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "**Settle up**")?;
    if view.debts.is_empty() {
        writeln!(out, "_Everyone is square_")?;
    }
    for debt in &view.debts {
        writeln!(
            out,
            "• {} → {}: {currency}{:.2}",
            debt.from_name, debt.to_name, debt.amount
        )?;
    }

    Ok(out)
}
