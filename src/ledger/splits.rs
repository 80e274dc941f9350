//! Expense split computation and expense validation.

use super::{GroupState, UserId, ensure_positive_amount, reconciles, round_to_cents};
use crate::{
    entities::SplitType,
    errors::{Error, Result},
};
use std::collections::HashSet;

/// A caller-supplied share: a percentage for percentage splits, an amount for
/// custom splits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShareInput {
    /// User the share belongs to
    pub user_id: UserId,
    /// Percentage or amount, depending on the split type
    pub value: f64,
}

/// How the caller wants an expense divided.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRequest {
    /// Divide evenly between all participants
    Equal,
    /// Divide by percentages that must add up to 100
    Percentage(Vec<ShareInput>),
    /// Divide by explicit amounts that must add up to the expense amount
    Custom(Vec<ShareInput>),
}

impl SplitRequest {
    /// The stored split type for this request.
    #[must_use]
    pub const fn split_type(&self) -> SplitType {
        match self {
            Self::Equal => SplitType::Equal,
            Self::Percentage(_) => SplitType::Percentage,
            Self::Custom(_) => SplitType::Custom,
        }
    }
}

/// One computed share of a new expense.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSplit {
    /// User who owes the share
    pub user_id: UserId,
    /// Share amount
    pub amount: f64,
    /// Percentage, for percentage splits
    pub percentage: Option<f64>,
}

/// A validated expense, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpensePlan {
    /// Participant who paid
    pub paid_by: UserId,
    /// Stored split type
    pub split_type: SplitType,
    /// Computed shares, all unsettled
    pub splits: Vec<PlannedSplit>,
    /// Participants to notify (everyone except the payer)
    pub notify: Vec<UserId>,
}

/// Divides `amount` between `participants` according to `request`.
///
/// Equal shares are rounded to cents individually and the leftover cent is
/// not redistributed: 100 split three ways is three shares of 33.33.
pub fn compute_splits(
    participants: &[UserId],
    amount: f64,
    request: &SplitRequest,
) -> Result<Vec<PlannedSplit>> {
    match request {
        SplitRequest::Equal => {
            if participants.is_empty() {
                return Err(Error::invalid_split("the group has no participants"));
            }
            #[allow(clippy::cast_precision_loss)] // Group sizes are tiny
            let share = round_to_cents(amount / participants.len() as f64);
            Ok(participants
                .iter()
                .map(|user_id| PlannedSplit {
                    user_id: *user_id,
                    amount: share,
                    percentage: None,
                })
                .collect())
        }
        SplitRequest::Percentage(shares) => {
            validate_shares(participants, shares)?;
            let total: f64 = shares.iter().map(|s| s.value).sum();
            if !reconciles(total, 100.0) {
                return Err(Error::invalid_split(format!(
                    "percentages add up to {total:.2}, not 100"
                )));
            }
            Ok(shares
                .iter()
                .map(|s| PlannedSplit {
                    user_id: s.user_id,
                    amount: round_to_cents(amount * s.value / 100.0),
                    percentage: Some(s.value),
                })
                .collect())
        }
        SplitRequest::Custom(shares) => {
            validate_shares(participants, shares)?;
            let total: f64 = shares.iter().map(|s| s.value).sum();
            if !reconciles(total, amount) {
                return Err(Error::invalid_split(format!(
                    "split amounts add up to {total:.2}, not {amount:.2}"
                )));
            }
            Ok(shares
                .iter()
                .map(|s| PlannedSplit {
                    user_id: s.user_id,
                    amount: s.value,
                    percentage: None,
                })
                .collect())
        }
    }
}

fn validate_shares(participants: &[UserId], shares: &[ShareInput]) -> Result<()> {
    if shares.is_empty() {
        return Err(Error::invalid_split("at least one share is required"));
    }
    let mut seen = HashSet::with_capacity(shares.len());
    for share in shares {
        if !share.value.is_finite() || share.value < 0.0 {
            return Err(Error::invalid_split(format!(
                "share {} for user {} is not a valid number",
                share.value, share.user_id
            )));
        }
        if !participants.contains(&share.user_id) {
            return Err(Error::invalid_split(format!(
                "user {} is not a participant of this group",
                share.user_id
            )));
        }
        if !seen.insert(share.user_id) {
            return Err(Error::invalid_split(format!(
                "user {} appears more than once",
                share.user_id
            )));
        }
    }
    Ok(())
}

/// Validates a new expense against the group snapshot and computes its splits.
///
/// `paid_by` defaults to the requester. Both must be participants.
pub fn plan_expense(
    state: &GroupState,
    requester: UserId,
    paid_by: Option<UserId>,
    amount: f64,
    request: &SplitRequest,
) -> Result<ExpensePlan> {
    state.ensure_participant(requester)?;
    ensure_positive_amount(amount)?;

    let paid_by = paid_by.unwrap_or(requester);
    if !state.is_participant(paid_by) {
        return Err(Error::forbidden(
            "the payer must be the group creator or an accepted member",
        ));
    }

    let participants = state.participants();
    let splits = compute_splits(&participants, amount, request)?;
    let notify = participants
        .into_iter()
        .filter(|user_id| *user_id != paid_by)
        .collect();

    Ok(ExpensePlan {
        paid_by,
        split_type: request.split_type(),
        splits,
        notify,
    })
}

/// Checks that `requester` may delete `expense_id`: they must have recorded
/// the expense or created the group.
pub fn plan_expense_deletion(
    state: &GroupState,
    requester: UserId,
    expense_id: i64,
) -> Result<()> {
    let entry = state
        .expense(expense_id)
        .ok_or(Error::ExpenseNotFound { expense_id })?;

    if entry.expense.created_by == requester || state.is_creator(requester) {
        Ok(())
    } else {
        Err(Error::forbidden(
            "only the expense creator or the group creator can delete this expense",
        ))
    }
}
