//! Expense split entity - One participant's share of an expense.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense split database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    /// Unique identifier for the split
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Expense this share belongs to
    pub expense_id: i64,
    /// User who owes this share
    pub user_id: i64,
    /// Share of the expense amount
    pub amount: f64,
    /// Percentage of the expense, for percentage splits
    pub percentage: Option<f64>,
    /// Whether the share has been paid back to the payer
    pub settled: bool,
    /// When the share was settled
    pub settled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each split belongs to one expense
    #[sea_orm(
        belongs_to = "super::group_expense::Entity",
        from = "Column::ExpenseId",
        to = "super::group_expense::Column::Id",
        on_delete = "Cascade"
    )]
    Expense,
}

impl Related<super::group_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
