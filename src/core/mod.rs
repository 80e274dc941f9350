//! Core operations - Database-backed group ledger operations.
//!
//! Functions here know nothing about Discord. They take a SeaORM connection,
//! load group snapshots, run them through [`crate::ledger`], persist the
//! outcome, and send notifications.

pub mod expense;
pub mod group;
pub mod membership;
pub mod notification;
pub mod settlement;
pub mod transaction;
pub mod user;
pub mod view;
