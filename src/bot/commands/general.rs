//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**SplitBuddy Help**\n\
        Share expenses with friends and work out who owes whom.\n\n\
        **Getting Started**\n\
        • `/register <email> [name]` - Registers you so others can invite you by email.\n\n\
        **Groups**\n\
        • `/group create <name> [description] [auto_settle]` - Creates a group you own.\n\
        • `/group invite <group> <email>` - Invites a registered user.\n\
        • `/group invites` - Lists your pending invites.\n\
        • `/group respond <group> <accept>` - Accepts or declines an invite.\n\
        • `/group view <group>` - Shows members, expenses, balances, and who owes whom.\n\
        • `/group list` - Lists your groups.\n\
        • `/group leave <group>` - Leaves a group.\n\
        • `/group remove <group> <user>` - Removes a member (creator only).\n\
        • `/group update <group> ...` - Renames or reconfigures a group (creator only).\n\
        • `/group delete <group>` - Deletes a group (creator only).\n\n\
        **Expenses**\n\
        • `/expense add <group> <description> <amount> [split] [shares] [paid_by]` - Records an expense.\n\
        • `/expense delete <group> <expense_id>` - Deletes an expense.\n\
        • `/settle <group> <member> <amount>` - Pays back what you owe a member.\n\n\
        **Utility Commands**\n\
        • `/notifications` - Shows and clears your unread notifications.\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        Shares are written as `email:value`, separated by commas, e.g. \
        `alice@example.com:60, bob@example.com:40`.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
