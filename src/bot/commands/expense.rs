//! Expense Discord commands - `/expense add`, `/expense delete`, and `/settle`.

use crate::errors::{Error, Result};

/// Parses shares written as `email:value` pairs separated by commas.
/// `=` works as a separator too.
///
/// # Errors
/// Returns `InvalidInput` for an entry without a separator or with a value
/// that is not a number.
pub fn parse_shares(text: &str) -> Result<Vec<(String, f64)>> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (email, value) = entry
                .rsplit_once(':')
                .or_else(|| entry.rsplit_once('='))
                .ok_or_else(|| {
                    Error::invalid_input(format!("share '{entry}' should look like email:value"))
                })?;
            let value = value.trim().trim_end_matches('%').trim();
            let value: f64 = value.parse().map_err(|_| {
                Error::invalid_input(format!("'{value}' in share '{entry}' is not a number"))
            })?;
            Ok((email.trim().to_string(), value))
        })
        .collect()
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::parse_shares;
    use crate::{
        bot::{BotData, current_user, handlers::autocomplete, registered_user},
        core::{
            expense::{self, NewExpense},
            group, settlement, user,
        },
        entities::SplitType,
        errors::{Error, Result},
        ledger::{ShareInput, SplitRequest},
    };
    use poise::serenity_prelude as serenity;
    use sea_orm::DatabaseConnection;

    async fn resolve_shares(db: &DatabaseConnection, text: &str) -> Result<Vec<ShareInput>> {
        let mut shares = Vec::new();
        for (email, value) in parse_shares(text)? {
            let owner = user::find_user_by_email(db, &email)
                .await?
                .ok_or(Error::UserNotFound { lookup: email })?;
            shares.push(ShareInput {
                user_id: owner.id,
                value,
            });
        }
        Ok(shares)
    }

    async fn build_split_request(
        db: &DatabaseConnection,
        split: Option<&str>,
        shares: Option<&str>,
    ) -> Result<SplitRequest> {
        let split_type = split
            .map(str::parse::<SplitType>)
            .transpose()
            .map_err(Error::invalid_split)?
            .unwrap_or(SplitType::Equal);

        match (split_type, shares) {
            (SplitType::Equal, _) => Ok(SplitRequest::Equal),
            (SplitType::Percentage, Some(text)) => {
                Ok(SplitRequest::Percentage(resolve_shares(db, text).await?))
            }
            (SplitType::Custom, Some(text)) => {
                Ok(SplitRequest::Custom(resolve_shares(db, text).await?))
            }
            (_, None) => Err(Error::invalid_split(format!(
                "{split_type} splits need shares, e.g. `alice@example.com:60, bob@example.com:40`"
            ))),
        }
    }

    /// Parent command for recording and deleting shared expenses.
    #[poise::command(slash_command, subcommands("expense_add", "expense_delete"))]
    pub async fn expense(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Expense command. Available subcommands:\n\
            `/expense add` - Record a shared expense\n\
            `/expense delete` - Delete an expense";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records a shared expense, split across everyone currently in the group.
    #[poise::command(slash_command, rename = "add")]
    pub async fn expense_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group the expense belongs to"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
        #[description = "What was bought"] description: String,
        #[description = "Total amount"] amount: f64,
        #[description = "equal (default), percentage, or custom"]
        #[autocomplete = "autocomplete::autocomplete_split_type"]
        split: Option<String>,
        #[description = "For percentage/custom: email:value pairs separated by commas"]
        shares: Option<String>,
        #[description = "Who paid (defaults to you)"] paid_by: Option<serenity::User>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let settings = &ctx.data().settings;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;

        let request = build_split_request(db, split.as_deref(), shares.as_deref()).await?;
        let mut new = NewExpense::new(description, amount, request);
        if let Some(payer) = &paid_by {
            new = new.paid_by(registered_user(ctx, payer).await?.id);
        }

        let entry = expense::add_expense(db, target.id, caller.id, new).await?;

        let caller_share = entry
            .splits
            .iter()
            .find(|s| s.user_id == caller.id)
            .map_or(0.0, |s| s.amount);
        ctx.say(format!(
            "✅ Recorded **{}** for {} in **{}**, split {} ways ({}). Your share: {} (Expense ID: {})",
            entry.expense.description,
            settings.money(entry.expense.amount),
            target.name,
            entry.splits.len(),
            entry.expense.split_type,
            settings.money(caller_share),
            entry.expense.id
        ))
        .await?;
        Ok(())
    }

    /// Deletes an expense you recorded, or any expense in a group you created.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn expense_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group the expense belongs to"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
        #[description = "Expense ID (shown by /group view)"] expense_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;

        expense::delete_expense(db, target.id, caller.id, expense_id).await?;

        ctx.say(format!(
            "🗑️ Deleted expense #{expense_id} from **{}**.",
            target.name
        ))
        .await?;
        Ok(())
    }

    /// Pays back what you owe a member. Only whole expense shares are settled.
    #[poise::command(slash_command, prefix_command)]
    pub async fn settle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group the debt belongs to"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
        #[description = "Member you are paying"] member: serenity::User,
        #[description = "Amount you are paying"] amount: f64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let settings = &ctx.data().settings;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;
        let creditor = registered_user(ctx, &member).await?;

        let settled = settlement::settle_with_member(
            db,
            target.id,
            caller.id,
            creditor.id,
            amount,
            &settings.ledger.settlement_category,
        )
        .await?;

        let message = if settled <= 0.0 {
            format!(
                "ℹ️ Nothing settled: you have no open share owed to **{}** that fits in {}.",
                creditor.name,
                settings.money(amount)
            )
        } else if settled < amount {
            format!(
                "✅ Settled {} with **{}** (only whole shares can be settled, so {} was not applied).",
                settings.money(settled),
                creditor.name,
                settings.money(amount - settled)
            )
        } else {
            format!(
                "✅ Settled {} with **{}**.",
                settings.money(settled),
                creditor.name
            )
        };
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_shares() {
        let shares = parse_shares("alice@example.com:60, bob@example.com = 40%").unwrap();
        assert_eq!(
            shares,
            vec![
                ("alice@example.com".to_string(), 60.0),
                ("bob@example.com".to_string(), 40.0),
            ]
        );
    }

    #[test]
    fn test_parse_shares_ignores_empty_entries() {
        let shares = parse_shares("a@example.com:12.5,, ").unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].1, 12.5);
    }

    #[test]
    fn test_parse_shares_rejects_malformed_entries() {
        assert!(matches!(
            parse_shares("alice@example.com 60"),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            parse_shares("alice@example.com:sixty"),
            Err(Error::InvalidInput { .. })
        ));
    }
}
