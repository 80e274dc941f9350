//! Settlement planning.
//!
//! A settlement pays back whole splits only. The payer's unsettled splits on
//! expenses the other member paid are taken oldest first; each one that fits
//! in what is left of the requested amount is marked settled, and any split
//! that would only be partly covered stays open.

use super::{GroupState, UserId, ensure_positive_amount, round_to_cents};
use crate::errors::{Error, Result};

/// Tolerance for float noise when checking whether a split fits.
const FIT_EPSILON: f64 = 1e-9;

/// The splits a settlement will mark as settled.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementPlan {
    /// Ids of the splits to mark settled, in scan order
    pub split_ids: Vec<i64>,
    /// Sum of the chosen splits, rounded to cents
    pub settled_amount: f64,
}

impl SettlementPlan {
    /// Returns true if nothing will be settled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.split_ids.is_empty()
    }
}

/// Chooses which of `payer`'s splits owed to `member` to settle with `amount`.
///
/// The settled amount can be less than `amount` when there is not enough
/// unsettled debt, or when the next split would not fit whole.
pub fn plan_settlement(
    state: &GroupState,
    payer: UserId,
    member: UserId,
    amount: f64,
) -> Result<SettlementPlan> {
    ensure_positive_amount(amount)?;
    state.ensure_participant(payer)?;
    if payer == member {
        return Err(Error::forbidden("you cannot settle a debt with yourself"));
    }

    let mut remaining = amount;
    let mut split_ids = Vec::new();
    let mut settled = 0.0;

    for entry in state.expenses.iter().filter(|e| e.expense.paid_by == member) {
        let open = entry
            .splits
            .iter()
            .filter(|s| s.user_id == payer && !s.settled);
        for split in open {
            if split.amount <= remaining + FIT_EPSILON {
                split_ids.push(split.id);
                settled += split.amount;
                remaining -= split.amount;
            }
        }
    }

    Ok(SettlementPlan {
        split_ids,
        settled_amount: round_to_cents(settled),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::MemberStatus;
    use crate::ledger::balance::outstanding_between;
    use crate::test_utils::fixtures::*;

    fn owes_25_and_15() -> GroupState {
        let mut state = state_with_members(1, &[(2, MemberStatus::Accepted)]);
        push_expense(&mut state, 2, 50.0, &[(1, 25.0), (2, 25.0)]);
        push_expense(&mut state, 2, 30.0, &[(1, 15.0), (2, 15.0)]);
        state
    }

    #[test]
    fn test_partial_split_stays_open() {
        let state = owes_25_and_15();
        let first_split = state.expenses[0].splits[0].id;

        let plan = plan_settlement(&state, 1, 2, 30.0).unwrap();

        assert_eq!(plan.split_ids, vec![first_split]);
        assert_eq!(plan.settled_amount, 25.0);
    }

    #[test]
    fn test_exact_amount_settles_everything() {
        let state = owes_25_and_15();
        let plan = plan_settlement(&state, 1, 2, 40.0).unwrap();

        assert_eq!(plan.split_ids.len(), 2);
        assert_eq!(plan.settled_amount, outstanding_between(&state, 1, 2));
    }

    #[test]
    fn test_later_smaller_split_still_fits() {
        let state = owes_25_and_15();
        let plan = plan_settlement(&state, 1, 2, 20.0).unwrap();

        assert_eq!(plan.split_ids, vec![state.expenses[1].splits[0].id]);
        assert_eq!(plan.settled_amount, 15.0);
    }

    #[test]
    fn test_overpaying_settles_only_what_is_owed() {
        let state = owes_25_and_15();
        let plan = plan_settlement(&state, 1, 2, 500.0).unwrap();

        assert_eq!(plan.settled_amount, 40.0);
    }

    #[test]
    fn test_already_settled_splits_are_skipped() {
        let mut state = owes_25_and_15();
        state.expenses[0].splits[0].settled = true;

        let plan = plan_settlement(&state, 1, 2, 40.0).unwrap();

        assert_eq!(plan.split_ids, vec![state.expenses[1].splits[0].id]);
        assert_eq!(plan.settled_amount, 15.0);
    }

    #[test]
    fn test_nothing_owed_settles_nothing() {
        let state = owes_25_and_15();
        let plan = plan_settlement(&state, 2, 1, 10.0).unwrap();

        assert!(plan.is_empty());
        assert_eq!(plan.settled_amount, 0.0);
    }

    #[test]
    fn test_invalid_settlements() {
        let state = owes_25_and_15();
        assert!(matches!(
            plan_settlement(&state, 1, 2, 0.0),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            plan_settlement(&state, 1, 1, 10.0),
            Err(Error::Forbidden { .. })
        ));
        assert!(matches!(
            plan_settlement(&state, 99, 2, 10.0),
            Err(Error::Forbidden { .. })
        ));
    }
}
