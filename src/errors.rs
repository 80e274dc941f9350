//! Unified error type for the ledger, its persistence layer, and the bot surface.
//!
//! Every core operation returns [`Result`]. Validation failures carry enough
//! context to be shown to the user verbatim; infrastructure failures wrap the
//! underlying error.

use crate::entities::group_member::MemberStatus;
use thiserror::Error;

/// All errors produced by `SplitBuddy`.
#[derive(Debug, Error)]
pub enum Error {
    /// The group does not exist.
    #[error("Group '{group}' not found")]
    GroupNotFound {
        /// Requested group id or name
        group: String,
    },

    /// The expense does not exist in the group.
    #[error("Expense {expense_id} not found in this group")]
    ExpenseNotFound {
        /// Requested expense id
        expense_id: i64,
    },

    /// The user has no membership record in the group.
    #[error("No {expected} membership found for user {user_id}")]
    MembershipNotFound {
        /// User whose membership was looked up
        user_id: i64,
        /// What kind of record was expected (e.g. "pending")
        expected: &'static str,
    },

    /// No registered user matches the lookup.
    #[error("User not found: {lookup}")]
    UserNotFound {
        /// Email, Discord id, or user id that was searched for
        lookup: String,
    },

    /// The actor is not allowed to perform the mutation.
    #[error("Forbidden: {reason}")]
    Forbidden {
        /// Human-readable reason
        reason: String,
    },

    /// The invitee already has an active membership record.
    #[error("{}", already_member_message(*status))]
    AlreadyMember {
        /// Status of the existing record
        status: MemberStatus,
    },

    /// The invite target is not a valid invitee.
    #[error("Invalid invite: {reason}")]
    InvalidInvite {
        /// Human-readable reason
        reason: String,
    },

    /// Split percentages or amounts do not reconcile with the expense.
    #[error("Invalid split: {reason}")]
    InvalidSplit {
        /// Human-readable reason
        reason: String,
    },

    /// Amount is non-positive or not a finite number.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending amount
        amount: f64,
    },

    /// Malformed user input that is not an amount or split problem.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable message
        message: String,
    },

    /// Another writer changed the group between read and write.
    #[error("Group {group_id} was modified concurrently, please retry")]
    ConcurrentModification {
        /// Contended group id
        group_id: i64,
    },

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable message
        message: String,
    },

    /// Database error from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting a reply failed.
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Integer conversion failed.
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Serenity/Poise framework error.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

const fn already_member_message(status: MemberStatus) -> &'static str {
    match status {
        MemberStatus::Accepted => "User is already a member of this group",
        MemberStatus::Pending => "User already has a pending invite to this group",
        MemberStatus::Declined => "User has declined an invite to this group",
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::Forbidden`] with the given reason.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Error::InvalidSplit`] with the given reason.
    pub fn invalid_split(reason: impl Into<String>) -> Self {
        Self::InvalidSplit {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Error::InvalidInput`] with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Returns true for errors caused by the caller's request rather than the
    /// infrastructure. The bot shows these to users without logging them as
    /// failures.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::GroupNotFound { .. }
                | Self::ExpenseNotFound { .. }
                | Self::MembershipNotFound { .. }
                | Self::UserNotFound { .. }
                | Self::Forbidden { .. }
                | Self::AlreadyMember { .. }
                | Self::InvalidInvite { .. }
                | Self::InvalidSplit { .. }
                | Self::InvalidAmount { .. }
                | Self::InvalidInput { .. }
                | Self::ConcurrentModification { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
