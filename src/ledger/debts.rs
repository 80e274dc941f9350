//! Debt simplification.
//!
//! Turns a balance map into a short list of payments that clears every
//! balance, matching the largest creditor with the largest debtor until one
//! side runs out.

use super::{Balances, UserId, round_to_cents};
use serde::Serialize;

/// Remainders smaller than half a cent are treated as settled.
const HALF_CENT: f64 = 0.005;

/// A single payment that moves money from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Debt {
    /// User who pays
    pub from: UserId,
    /// User who receives
    pub to: UserId,
    /// Amount, rounded to cents
    pub amount: f64,
}

#[derive(Debug)]
struct Party {
    user_id: UserId,
    remaining: f64,
}

/// Reduces `balances` to at most `creditors + debtors - 1` payments.
///
/// The result settles every balance, but it is not guaranteed to be the
/// smallest possible set of payments.
#[must_use]
pub fn simplify_debts(balances: &Balances) -> Vec<Debt> {
    let mut creditors: Vec<Party> = balances
        .iter()
        .filter(|(_, balance)| **balance >= HALF_CENT)
        .map(|(user_id, balance)| Party {
            user_id: *user_id,
            remaining: *balance,
        })
        .collect();
    let mut debtors: Vec<Party> = balances
        .iter()
        .filter(|(_, balance)| **balance <= -HALF_CENT)
        .map(|(user_id, balance)| Party {
            user_id: *user_id,
            remaining: -*balance,
        })
        .collect();

    // Stable sort: equal amounts keep ascending user id order.
    creditors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));
    debtors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));

    let mut debts = Vec::with_capacity(creditors.len() + debtors.len());
    let (mut c, mut d) = (0, 0);

    while c < creditors.len() && d < debtors.len() {
        let creditor = &mut creditors[c];
        let debtor = &mut debtors[d];
        let amount = creditor.remaining.min(debtor.remaining);

        if amount > 0.0 {
            debts.push(Debt {
                from: debtor.user_id,
                to: creditor.user_id,
                amount: round_to_cents(amount),
            });
        }

        creditor.remaining -= amount;
        debtor.remaining -= amount;

        if creditor.remaining < HALF_CENT {
            c += 1;
        }
        if debtor.remaining < HALF_CENT {
            d += 1;
        }
    }

    debts
}
