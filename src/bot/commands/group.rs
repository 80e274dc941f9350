//! Group Discord commands - `/group` and its subcommands.
//!
//! Groups are addressed by name (autocompleted from the caller's groups) or by
//! numeric id.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, current_user, handlers::autocomplete, registered_user},
        core::{
            group::{self, GroupUpdate},
            membership, view,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for creating, joining, and managing expense groups.
    #[poise::command(
        slash_command,
        subcommands(
            "group_create",
            "group_invite",
            "group_invites",
            "group_respond",
            "group_view",
            "group_list",
            "group_leave",
            "group_remove",
            "group_update",
            "group_delete"
        )
    )]
    pub async fn group(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Group command. Available subcommands:\n\
            `/group create` - Create a group\n\
            `/group invite` - Invite a registered user by email\n\
            `/group invites` - List your pending invites\n\
            `/group respond` - Accept or decline an invite\n\
            `/group view` - Show balances and debts\n\
            `/group list` - List your groups\n\
            `/group leave` - Leave a group\n\
            `/group remove` - Remove a member\n\
            `/group update` - Change a group's settings\n\
            `/group delete` - Delete a group";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a new group owned by you.
    #[poise::command(slash_command, rename = "create")]
    pub async fn group_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the group"] name: String,
        #[description = "Optional description"] description: Option<String>,
        #[description = "Record settlements in your personal ledger? (default: false)"]
        auto_settle: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;

        let created = group::create_group(
            db,
            &name,
            description,
            caller.id,
            auto_settle.unwrap_or(false),
        )
        .await?;

        ctx.say(format!(
            "✅ Created group **{}** (id {}). Invite people with `/group invite`.",
            created.name, created.id
        ))
        .await?;
        Ok(())
    }

    /// Invites a registered user to one of your groups by email.
    #[poise::command(slash_command, rename = "invite")]
    pub async fn group_invite(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to invite to"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
        #[description = "Email the invitee registered with"] email: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;

        membership::invite_member(db, target.id, caller.id, &email).await?;

        ctx.say(format!("✉️ Invited {email} to **{}**.", target.name))
            .await?;
        Ok(())
    }

    /// Lists the group invites waiting for your answer.
    #[poise::command(slash_command, rename = "invites")]
    pub async fn group_invites(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;

        let invites = group::list_pending_invites(db, caller.id).await?;
        if invites.is_empty() {
            ctx.say("📭 You have no pending invites.").await?;
            return Ok(());
        }

        let mut response = String::from("✉️ **Pending Invites**\n\n");
        for (record, invited_to) in invites {
            writeln!(
                &mut response,
                "• **{}** (id {}) - invited {}",
                invited_to.name,
                invited_to.id,
                record.invited_at.format("%Y-%m-%d")
            )?;
        }
        response.push_str("\nAnswer with `/group respond`.");

        ctx.say(response).await?;
        Ok(())
    }

    /// Accepts or declines a pending group invite.
    #[poise::command(slash_command, rename = "respond")]
    pub async fn group_respond(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group you were invited to"]
        #[autocomplete = "autocomplete::autocomplete_pending_invite"]
        group_name: String,
        #[description = "Accept the invite?"] accept: bool,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;
        let target = group::find_pending_invite(db, caller.id, &group_name).await?;

        membership::respond_to_invite(db, target.id, caller.id, accept).await?;

        let message = if accept {
            format!("🎉 You joined **{}**.", target.name)
        } else {
            format!("👋 You declined the invite to **{}**.", target.name)
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Shows a group's members, expenses, balances, and suggested payments.
    #[poise::command(slash_command, rename = "view")]
    pub async fn group_view(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to show"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;

        let group_view = view::get_group_view(db, target.id, caller.id).await?;
        let text = view::format_group_view(
            &group_view,
            &ctx.data().settings.ledger.currency_symbol,
        )?;

        ctx.say(text).await?;
        Ok(())
    }

    /// Lists the groups you created or joined.
    #[poise::command(slash_command, rename = "list")]
    pub async fn group_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;

        let groups = group::list_groups_for_user(db, caller.id).await?;
        if groups.is_empty() {
            ctx.say("📂 You are not in any groups yet. Create one with `/group create`!")
                .await?;
            return Ok(());
        }

        let mut response = String::from("📂 **Your Groups**\n\n");
        for g in groups {
            let role = if g.created_by == caller.id {
                "👑"
            } else {
                "👥"
            };
            writeln!(&mut response, "{role} **{}** (id {})", g.name, g.id)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Leaves a group. Your past expense shares stay on the books.
    #[poise::command(slash_command, rename = "leave")]
    pub async fn group_leave(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to leave"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;

        membership::leave_group(db, target.id, caller.id).await?;

        ctx.say(format!("👋 You left **{}**.", target.name)).await?;
        Ok(())
    }

    /// Removes a member from a group you created.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn group_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to remove the member from"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
        #[description = "Member to remove"] member: serenity::User,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;
        let removed = registered_user(ctx, &member).await?;

        membership::remove_member(db, target.id, caller.id, removed.id).await?;

        ctx.say(format!(
            "✅ Removed **{}** from **{}**.",
            removed.name, target.name
        ))
        .await?;
        Ok(())
    }

    /// Changes the name, description, or settlement bookkeeping of a group you
    /// created.
    #[poise::command(slash_command, rename = "update")]
    pub async fn group_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to update"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
        #[description = "New name"] name: Option<String>,
        #[description = "New description (empty text clears it)"] description: Option<String>,
        #[description = "Record settlements in personal ledgers?"] auto_settle: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;

        let changes = GroupUpdate {
            name,
            description: description.map(Some),
            auto_settle_transaction: auto_settle,
        };
        if changes == GroupUpdate::default() {
            ctx.say("ℹ️ Nothing to update.").await?;
            return Ok(());
        }

        let updated = group::update_group(db, target.id, caller.id, changes).await?;

        ctx.say(format!(
            "✅ Updated **{}**. Settlements {} recorded in personal ledgers.",
            updated.name,
            if updated.auto_settle_transaction {
                "are"
            } else {
                "are not"
            }
        ))
        .await?;
        Ok(())
    }

    /// Deletes a group you created, along with all its expenses.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn group_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to delete"]
        #[autocomplete = "autocomplete::autocomplete_group_name"]
        group_name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = current_user(ctx).await?;
        let target = group::find_group_for_user(db, caller.id, &group_name).await?;

        group::delete_group(db, target.id, caller.id).await?;

        ctx.say(format!("🗑️ Deleted **{}**.", target.name)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
