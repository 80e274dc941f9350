//! Transaction entity - A user's personal ledger entry.
//!
//! The group ledger only writes here when a group has automatic settlement
//! bookkeeping enabled: settling a debt then shows up as an expense in the
//! payer's own ledger.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User whose ledger this entry belongs to
    pub user_id: i64,
    /// Type of transaction: `"expense"` or `"income"`
    pub transaction_type: String,
    /// Transaction amount, always positive
    pub amount: f64,
    /// Human-readable description of the transaction
    pub description: String,
    /// Spending category (e.g. `"Settlement"`)
    pub category: String,
    /// When the transaction happened
    pub date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
