//! Group expense entity - A shared expense paid by one participant.
//!
//! How the amount is divided lives in `expense_splits`; an expense and its
//! splits are always written and deleted together.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How an expense amount is divided between participants
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Everyone pays the same share
    #[sea_orm(string_value = "equal")]
    Equal,
    /// Shares are given as percentages of the amount
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// Shares are given as explicit amounts
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Custom => "custom",
        })
    }
}

impl FromStr for SplitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equal" => Ok(Self::Equal),
            "percentage" | "percent" => Ok(Self::Percentage),
            "custom" | "exact" => Ok(Self::Custom),
            other => Err(format!("unknown split type '{other}'")),
        }
    }
}

/// Group expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group the expense was recorded in
    pub group_id: i64,
    /// What the money was spent on
    pub description: String,
    /// Total amount paid
    pub amount: f64,
    /// User ID of the participant who paid
    pub paid_by: i64,
    /// How the amount was divided
    pub split_type: SplitType,
    /// When the expense happened
    pub date: DateTimeUtc,
    /// User ID of whoever recorded the expense
    pub created_by: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense belongs to one group
    #[sea_orm(
        belongs_to = "super::split_group::Entity",
        from = "Column::GroupId",
        to = "super::split_group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
    /// One expense has many splits
    #[sea_orm(has_many = "super::expense_split::Entity")]
    Splits,
}

impl Related<super::split_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::expense_split::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
