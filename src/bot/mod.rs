//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the `SplitBuddy` application,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (account, group, expense, settle, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::Settings,
    core::user,
    entities::user::Model as UserModel,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the loaded settings.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings loaded from config.toml
    pub settings: Arc<Settings>,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection
    /// and settings.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: Arc<Settings>) -> Self {
        Self { database, settings }
    }
}

/// Looks up the directory entry of the user who invoked the command.
///
/// # Errors
/// Returns `UserNotFound` if the caller has not used `/register` yet.
pub async fn current_user(ctx: poise::Context<'_, BotData, Error>) -> Result<UserModel> {
    user::require_user_by_discord_id(&ctx.data().database, &ctx.author().id.to_string()).await
}

/// Looks up the directory entry of a mentioned Discord user.
pub async fn registered_user(
    ctx: poise::Context<'_, BotData, Error>,
    discord_user: &serenity::User,
) -> Result<UserModel> {
    user::require_user_by_discord_id(&ctx.data().database, &discord_user.id.to_string()).await
}

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::register(),
        commands::notifications(),
        commands::group(),
        commands::expense(),
        commands::settle(),
    ]
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = if error.is_user_error() {
                warn!(command = %ctx.command().name, "Rejected command: {error}");
                format!("❌ {error}")
            } else {
                error!("Error in command `{}`: {:?}", ctx.command().name, error);
                "❌ Something went wrong. Please try again later.".to_string()
            };
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// # Errors
/// Returns an error if the client cannot be created or the connection fails.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
