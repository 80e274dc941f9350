//! Expense business logic - Recording and deleting shared expenses.

use crate::{
    core::{
        group::{claim_group_version, load_group_state},
        notification::{self, NewNotification},
        user,
    },
    entities::{ExpenseSplit, GroupExpense, NotificationKind, expense_split, group_expense},
    errors::{Error, Result},
    ledger::{ExpenseEntry, SplitRequest, UserId, splits},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde_json::json;
use tracing::{info, instrument};

/// A shared expense waiting to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// What the money was spent on
    pub description: String,
    /// Total amount
    pub amount: f64,
    /// How the amount is divided
    pub split: SplitRequest,
    /// Who paid; defaults to the requester
    pub paid_by: Option<UserId>,
    /// When it happened; defaults to now
    pub date: Option<DateTime<Utc>>,
}

impl NewExpense {
    /// An expense paid by the requester, dated now.
    pub fn new(description: impl Into<String>, amount: f64, split: SplitRequest) -> Self {
        Self {
            description: description.into(),
            amount,
            split,
            paid_by: None,
            date: None,
        }
    }

    /// Records the expense as paid by someone other than the requester.
    #[must_use]
    pub const fn paid_by(mut self, user_id: UserId) -> Self {
        self.paid_by = Some(user_id);
        self
    }
}

/// Records an expense in the group and splits it across every current
/// participant.
///
/// Pending and declined members are never included. Participants other than
/// the payer are notified once the expense is stored.
///
/// # Errors
/// Returns `InvalidInput` for an empty description, `InvalidAmount` for a
/// non-positive amount, `Forbidden` when the requester or payer does not
/// participate, and `InvalidSplit` when percentages or amounts do not
/// reconcile.
#[instrument(skip(db, new), fields(amount = new.amount))]
pub async fn add_expense(
    db: &DatabaseConnection,
    group_id: i64,
    requester: UserId,
    new: NewExpense,
) -> Result<ExpenseEntry> {
    let description = new.description.trim().to_string();
    if description.is_empty() {
        return Err(Error::invalid_input("Expense description cannot be empty"));
    }

    let txn = db.begin().await?;
    let state = load_group_state(&txn, group_id).await?;
    let plan = splits::plan_expense(&state, requester, new.paid_by, new.amount, &new.split)?;
    claim_group_version(&txn, &state.group).await?;

    let expense = group_expense::ActiveModel {
        group_id: Set(group_id),
        description: Set(description),
        amount: Set(new.amount),
        paid_by: Set(plan.paid_by),
        split_type: Set(plan.split_type),
        date: Set(new.date.unwrap_or_else(Utc::now)),
        created_by: Set(requester),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut stored = Vec::with_capacity(plan.splits.len());
    for split in &plan.splits {
        let row = expense_split::ActiveModel {
            expense_id: Set(expense.id),
            user_id: Set(split.user_id),
            amount: Set(split.amount),
            percentage: Set(split.percentage),
            settled: Set(false),
            settled_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        stored.push(row);
    }
    txn.commit().await?;

    info!(group_id, expense_id = expense.id, "Added expense");

    let payer_name = user::get_user_by_id(db, plan.paid_by)
        .await?
        .map_or_else(|| "Someone".to_string(), |u| u.name);
    notification::notify_all(db, &plan.notify, |user_id| {
        let share = stored
            .iter()
            .find(|s| s.user_id == user_id)
            .map_or(0.0, |s| s.amount);
        NewNotification::new(
            user_id,
            NotificationKind::ExpenseAdded,
            "New expense",
            format!(
                "{payer_name} paid {:.2} for '{}' in '{}'. Your share is {share:.2}",
                expense.amount, expense.description, state.group.name
            ),
        )
        .with_data(json!({
            "group_id": group_id,
            "expense_id": expense.id,
            "share": share,
        }))
    })
    .await;

    Ok(ExpenseEntry {
        expense,
        splits: stored,
    })
}

/// Deletes an expense and its splits. Allowed for whoever recorded the
/// expense and for the group creator.
#[instrument(skip(db))]
pub async fn delete_expense(
    db: &DatabaseConnection,
    group_id: i64,
    requester: UserId,
    expense_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;
    let state = load_group_state(&txn, group_id).await?;
    splits::plan_expense_deletion(&state, requester, expense_id)?;
    claim_group_version(&txn, &state.group).await?;

    ExpenseSplit::delete_many()
        .filter(expense_split::Column::ExpenseId.eq(expense_id))
        .exec(&txn)
        .await?;
    GroupExpense::delete_by_id(expense_id).exec(&txn).await?;
    txn.commit().await?;

    info!(group_id, expense_id, "Deleted expense");
    Ok(())
}
