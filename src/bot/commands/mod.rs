//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Registration and notification commands
pub mod account;

/// Expense and settlement commands
pub mod expense;

/// General utility commands
pub mod general;

/// Group management commands
pub mod group;

// Export commands
pub use account::*;
pub use expense::*;
pub use general::*;
pub use group::*;
