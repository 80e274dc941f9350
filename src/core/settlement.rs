//! Settlement business logic - Paying back another member.

use crate::{
    core::{
        group::{claim_group_version, load_group_state},
        notification::{self, NewNotification},
        transaction::{self, NewTransaction},
        user,
    },
    entities::{ExpenseSplit, NotificationKind, expense_split},
    errors::Result,
    ledger::{UserId, settlement},
};
use sea_orm::{TransactionTrait, prelude::*, sea_query::Expr};
use serde_json::json;
use tracing::{info, instrument};

/// Settles `payer`'s debt to `member` with up to `amount`, oldest splits
/// first, and returns the amount actually settled.
///
/// Only whole splits are settled: the result is at most `amount` and may be
/// zero. When the group records settlements in personal ledgers and something
/// was settled, an expense entry in `settlement_category` is written for the
/// payer in the same database transaction. The member is notified of any
/// nonzero settlement.
///
/// # Errors
/// Returns `InvalidAmount` for a non-positive amount and `Forbidden` when the
/// payer does not participate or tries to settle with themselves.
#[instrument(skip(db))]
pub async fn settle_with_member(
    db: &DatabaseConnection,
    group_id: i64,
    payer: UserId,
    member: UserId,
    amount: f64,
    settlement_category: &str,
) -> Result<f64> {
    let txn = db.begin().await?;
    let state = load_group_state(&txn, group_id).await?;
    let plan = settlement::plan_settlement(&state, payer, member, amount)?;

    if plan.is_empty() {
        txn.commit().await?;
        info!(group_id, payer, member, "Nothing to settle");
        return Ok(0.0);
    }

    claim_group_version(&txn, &state.group).await?;

    let now = chrono::Utc::now();
    ExpenseSplit::update_many()
        .col_expr(expense_split::Column::Settled, Expr::value(true))
        .col_expr(expense_split::Column::SettledAt, Expr::value(now))
        .filter(expense_split::Column::Id.is_in(plan.split_ids.clone()))
        .exec(&txn)
        .await?;

    let member_name = user::get_user_by_id(&txn, member)
        .await?
        .map_or_else(|| "a group member".to_string(), |u| u.name);

    if state.group.auto_settle_transaction && plan.settled_amount > 0.0 {
        transaction::record_transaction(
            &txn,
            NewTransaction {
                user_id: payer,
                transaction_type: transaction::EXPENSE.to_string(),
                amount: plan.settled_amount,
                description: format!(
                    "Settlement with {member_name} in '{}'",
                    state.group.name
                ),
                category: settlement_category.to_string(),
                date: now,
            },
        )
        .await?;
    }
    txn.commit().await?;

    info!(
        group_id,
        payer,
        member,
        settled = plan.settled_amount,
        splits = plan.split_ids.len(),
        "Settled debt"
    );

    let payer_name = user::get_user_by_id(db, payer)
        .await?
        .map_or_else(|| "Someone".to_string(), |u| u.name);
    notification::notify(
        db,
        NewNotification::new(
            member,
            NotificationKind::DebtSettled,
            "Debt settled",
            format!(
                "{payer_name} settled {:.2} with you in '{}'",
                plan.settled_amount, state.group.name
            ),
        )
        .with_data(json!({
            "group_id": group_id,
            "payer": payer,
            "amount": plan.settled_amount,
        })),
    )
    .await;

    Ok(plan.settled_amount)
}
