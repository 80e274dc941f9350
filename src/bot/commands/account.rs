//! Account Discord commands - `register` and `notifications`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, current_user},
        core::{notification, user},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Registers you in the user directory so others can invite you by email.
    ///
    /// Running it again updates your name and email.
    #[poise::command(slash_command, prefix_command)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Email address others will invite you with"] email: String,
        #[description = "Display name (defaults to your Discord name)"] name: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let name = name.unwrap_or_else(|| ctx.author().name.clone());

        let registered =
            user::register_user(db, &ctx.author().id.to_string(), &name, &email).await?;

        ctx.say(format!(
            "✅ Registered as **{}** ({}).",
            registered.name, registered.email
        ))
        .await?;
        Ok(())
    }

    /// Shows your unread notifications and marks them as read.
    #[poise::command(slash_command, prefix_command)]
    pub async fn notifications(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;

        let unread = notification::list_unread_notifications(db, caller.id).await?;
        if unread.is_empty() {
            ctx.say("📭 No new notifications.").await?;
            return Ok(());
        }

        let mut response = format!("📬 **{} new notification(s)**\n\n", unread.len());
        for note in &unread {
            writeln!(
                &mut response,
                "• **{}** - {} _({})_",
                note.title,
                note.message,
                note.created_at.format("%Y-%m-%d %H:%M")
            )?;
        }
        notification::mark_notifications_read(db, caller.id).await?;

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
