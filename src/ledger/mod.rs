//! Pure group ledger - balances, debt simplification, and validation of every
//! group mutation.
//!
//! Nothing in this module performs I/O. Core operations load a [`GroupState`]
//! snapshot inside a database transaction, hand it to the functions here, and
//! apply whatever plan comes back. This keeps the money math testable without
//! a database and makes every rule a plain function of the snapshot.

pub mod balance;
pub mod debts;
pub mod membership;
pub mod settlement;
pub mod splits;

pub use balance::{Balances, calculate_balances};
pub use debts::{Debt, simplify_debts};
pub use membership::InvitePlan;
pub use settlement::SettlementPlan;
pub use splits::{ExpensePlan, PlannedSplit, ShareInput, SplitRequest};

use crate::entities::{
    MemberStatus, expense_split, group_expense, group_member, split_group,
};

/// Identifier of a user in the directory.
pub type UserId = i64;

/// An expense together with its splits, in stored order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEntry {
    /// The expense row
    pub expense: group_expense::Model,
    /// Its splits, ordered by id
    pub splits: Vec<expense_split::Model>,
}

/// Snapshot of a group aggregate: the group, its member records, and its
/// expenses. All ledger rules are evaluated against one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupState {
    /// The group row
    pub group: split_group::Model,
    /// Member records, ordered by id
    pub members: Vec<group_member::Model>,
    /// Expenses, ordered by id (oldest first)
    pub expenses: Vec<ExpenseEntry>,
}

impl GroupState {
    /// The group creator.
    #[must_use]
    pub const fn creator(&self) -> UserId {
        self.group.created_by
    }

    /// Returns true if `user_id` created the group.
    #[must_use]
    pub const fn is_creator(&self, user_id: UserId) -> bool {
        self.group.created_by == user_id
    }

    /// Finds the membership record for `user_id`, whatever its status.
    #[must_use]
    pub fn member(&self, user_id: UserId) -> Option<&group_member::Model> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    /// The creator followed by every accepted member, in record order.
    ///
    /// Pending and declined members never participate.
    #[must_use]
    pub fn participants(&self) -> Vec<UserId> {
        std::iter::once(self.group.created_by)
            .chain(
                self.members
                    .iter()
                    .filter(|m| m.status == MemberStatus::Accepted)
                    .map(|m| m.user_id),
            )
            .collect()
    }

    /// Returns true if `user_id` is the creator or an accepted member.
    #[must_use]
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.is_creator(user_id)
            || self
                .member(user_id)
                .is_some_and(|m| m.status == MemberStatus::Accepted)
    }

    /// Finds an expense by id.
    #[must_use]
    pub fn expense(&self, expense_id: i64) -> Option<&ExpenseEntry> {
        self.expenses.iter().find(|e| e.expense.id == expense_id)
    }

    /// Fails with `Forbidden` unless `user_id` may act on the group.
    pub fn ensure_participant(&self, user_id: UserId) -> crate::errors::Result<()> {
        if self.is_participant(user_id) {
            Ok(())
        } else {
            Err(crate::errors::Error::forbidden(
                "only the group creator and accepted members can do that",
            ))
        }
    }
}

/// Rounds a money value to two decimal places.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns true if `actual` and `expected` agree to the cent: their difference,
/// measured in hundredths, rounds to zero.
///
/// Float noise such as `0.1 + 0.2` passes; a full cent of drift (`100.01`
/// against `100`) does not.
#[must_use]
pub fn reconciles(actual: f64, expected: f64) -> bool {
    ((actual - expected) * 100.0).round() == 0.0
}

/// Fails with `InvalidAmount` unless `amount` is finite and positive.
pub fn ensure_positive_amount(amount: f64) -> crate::errors::Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(crate::errors::Error::InvalidAmount { amount })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::fixtures::*;

    #[test]
    fn test_participants_are_creator_plus_accepted_members() {
        let state = state_with_members(
            1,
            &[
                (2, MemberStatus::Accepted),
                (3, MemberStatus::Pending),
                (4, MemberStatus::Declined),
                (5, MemberStatus::Accepted),
            ],
        );

        assert_eq!(state.participants(), vec![1, 2, 5]);
        assert!(state.is_participant(1));
        assert!(state.is_participant(2));
        assert!(!state.is_participant(3));
        assert!(!state.is_participant(4));
        assert!(!state.is_participant(99));
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(100.0 / 3.0), 33.33);
        assert_eq!(round_to_cents(2.0 / 3.0), 0.67);
        assert_eq!(round_to_cents(-12.345_6), -12.35);
    }

    #[test]
    fn test_reconciles_to_the_cent() {
        assert!(reconciles(100.0, 100.0));
        assert!(reconciles(0.1 + 0.2, 0.3));
        assert!(reconciles(100.004, 100.0));
        assert!(!reconciles(100.01, 100.0));
        assert!(!reconciles(99.99, 100.0));
    }

    #[test]
    fn test_ensure_positive_amount() {
        assert!(ensure_positive_amount(0.01).is_ok());
        assert!(ensure_positive_amount(0.0).is_err());
        assert!(ensure_positive_amount(-5.0).is_err());
        assert!(ensure_positive_amount(f64::NAN).is_err());
        assert!(ensure_positive_amount(f64::INFINITY).is_err());
    }
}
