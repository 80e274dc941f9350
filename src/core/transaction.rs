//! Personal transaction ledger - The payer-side record of settled debts.
//!
//! When a group has automatic settlement bookkeeping enabled, settling a debt
//! writes an expense entry here for the payer. The entry is written with the
//! same connection (usually the open database transaction) as the settlement
//! itself, so both land or neither does.

use crate::{
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Transaction type used for money leaving the user's pocket.
pub const EXPENSE: &str = "expense";

/// A personal ledger entry waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Ledger owner
    pub user_id: i64,
    /// `"expense"` or `"income"`
    pub transaction_type: String,
    /// Positive amount
    pub amount: f64,
    /// Human-readable description
    pub description: String,
    /// Spending category
    pub category: String,
    /// When it happened
    pub date: DateTime<Utc>,
}

/// Records a personal transaction.
///
/// # Errors
/// Returns an error if the amount is not a positive finite number or the
/// insert fails.
pub async fn record_transaction<C>(db: &C, new: NewTransaction) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(Error::InvalidAmount { amount: new.amount });
    }

    transaction::ActiveModel {
        user_id: Set(new.user_id),
        transaction_type: Set(new.transaction_type),
        amount: Set(new.amount),
        description: Set(new.description),
        category: Set(new.category),
        date: Set(new.date),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves all transactions of a user, newest first.
pub async fn get_transactions_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
