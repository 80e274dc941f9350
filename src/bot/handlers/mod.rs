//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for group names, pending invites, and split types
pub mod autocomplete;
