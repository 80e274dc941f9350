//! Per-member balance computation.
//!
//! Balances are derived on every read from the live expense list and are
//! never stored, so editing or deleting an expense can never leave a stale
//! total behind.

use super::{GroupState, UserId};
use std::collections::BTreeMap;

/// Net balance per user: positive means the group owes the user money,
/// negative means the user owes the group.
pub type Balances = BTreeMap<UserId, f64>;

/// Computes every participant's net balance from the unsettled splits.
///
/// 1. Seeds zero for the creator and every accepted member.
/// 2. For each unsettled split owed by someone other than the payer, credits
///    the payer and debits the split's user.
/// 3. Settled splits count for nothing.
///
/// A split is only counted when both its payer and its user are seeded. Splits
/// that reference someone who has left the group drop out of the totals
/// entirely, which keeps the balances summing to zero.
#[must_use]
pub fn calculate_balances(state: &GroupState) -> Balances {
    let mut balances: Balances = state
        .participants()
        .into_iter()
        .map(|user_id| (user_id, 0.0))
        .collect();

    for entry in &state.expenses {
        let payer = entry.expense.paid_by;
        for split in entry.splits.iter().filter(|s| !s.settled) {
            if split.user_id == payer {
                continue;
            }
            if !balances.contains_key(&payer) || !balances.contains_key(&split.user_id) {
                continue;
            }
            if let Some(credit) = balances.get_mut(&payer) {
                *credit += split.amount;
            }
            if let Some(debit) = balances.get_mut(&split.user_id) {
                *debit -= split.amount;
            }
        }
    }

    balances
}

/// Total still owed by `debtor` to `creditor` through unsettled splits on
/// expenses `creditor` paid. This is the amount a settlement between the two
/// can consume.
#[must_use]
pub fn outstanding_between(state: &GroupState, debtor: UserId, creditor: UserId) -> f64 {
    let total: f64 = state
        .expenses
        .iter()
        .filter(|entry| entry.expense.paid_by == creditor)
        .flat_map(|entry| entry.splits.iter())
        .filter(|split| split.user_id == debtor && !split.settled)
        .map(|split| split.amount)
        .sum();
    super::round_to_cents(total)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::MemberStatus;
    use crate::test_utils::fixtures::*;

    fn three_person_group() -> GroupState {
        state_with_members(
            1,
            &[(2, MemberStatus::Accepted), (3, MemberStatus::Accepted)],
        )
    }

    #[test]
    fn test_empty_group_has_zero_balances() {
        let state = three_person_group();
        let balances = calculate_balances(&state);

        assert_eq!(balances.len(), 3);
        assert!(balances.values().all(|b| *b == 0.0));
    }

    #[test]
    fn test_equal_split_balances() {
        let mut state = three_person_group();
        push_expense(&mut state, 1, 100.0, &[(1, 33.33), (2, 33.33), (3, 33.33)]);

        let balances = calculate_balances(&state);

        assert!((balances[&1] - 66.66).abs() < 1e-9);
        assert!((balances[&2] + 33.33).abs() < 1e-9);
        assert!((balances[&3] + 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_settled_splits_do_not_count() {
        let mut state = three_person_group();
        push_expense(&mut state, 1, 60.0, &[(1, 20.0), (2, 20.0), (3, 20.0)]);
        state.expenses[0].splits[1].settled = true;

        let balances = calculate_balances(&state);

        assert_eq!(balances[&1], 20.0);
        assert_eq!(balances[&2], 0.0);
        assert_eq!(balances[&3], -20.0);
    }

    #[test]
    fn test_pending_and_declined_members_are_not_seeded() {
        let state = state_with_members(
            1,
            &[(2, MemberStatus::Pending), (3, MemberStatus::Declined)],
        );
        let balances = calculate_balances(&state);

        assert_eq!(balances.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_departed_member_splits_are_invisible() {
        let mut state = three_person_group();
        push_expense(&mut state, 1, 90.0, &[(1, 30.0), (2, 30.0), (3, 30.0)]);
        push_expense(&mut state, 3, 30.0, &[(1, 15.0), (3, 15.0)]);
        // User 3 leaves: their record disappears but the splits stay.
        state.members.retain(|m| m.user_id != 3);

        let balances = calculate_balances(&state);

        assert!(!balances.contains_key(&3));
        assert_eq!(balances[&1], 30.0);
        assert_eq!(balances[&2], -30.0);
        assert!(balances.values().sum::<f64>().abs() < 1e-9);
    }

    #[test]
    fn test_balances_always_sum_to_zero() {
        let mut state = state_with_members(
            1,
            &[
                (2, MemberStatus::Accepted),
                (3, MemberStatus::Accepted),
                (4, MemberStatus::Accepted),
            ],
        );
        push_expense(
            &mut state,
            1,
            100.0,
            &[(1, 25.0), (2, 25.0), (3, 25.0), (4, 25.0)],
        );
        push_expense(&mut state, 2, 47.5, &[(2, 20.0), (3, 27.5)]);
        push_expense(&mut state, 4, 12.99, &[(1, 6.5), (4, 6.49)]);
        push_expense(&mut state, 3, 100.0, &[(1, 33.33), (2, 33.33), (3, 33.33)]);
        state.expenses[1].splits[1].settled = true;

        let balances = calculate_balances(&state);

        assert!(balances.values().sum::<f64>().abs() < 1e-9);
    }

    #[test]
    fn test_outstanding_between() {
        let mut state = three_person_group();
        push_expense(&mut state, 3, 50.0, &[(1, 25.0), (3, 25.0)]);
        push_expense(&mut state, 3, 30.0, &[(1, 15.0), (3, 15.0)]);
        push_expense(&mut state, 2, 10.0, &[(1, 10.0)]);

        assert_eq!(outstanding_between(&state, 1, 3), 40.0);
        assert_eq!(outstanding_between(&state, 1, 2), 10.0);
        assert_eq!(outstanding_between(&state, 3, 1), 0.0);
    }
}
