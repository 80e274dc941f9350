//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod expense_split;
pub mod group_expense;
pub mod group_member;
pub mod notification;
pub mod split_group;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use expense_split::{
    Column as ExpenseSplitColumn, Entity as ExpenseSplit, Model as ExpenseSplitModel,
};
pub use group_expense::{
    Column as GroupExpenseColumn, Entity as GroupExpense, Model as GroupExpenseModel, SplitType,
};
pub use group_member::{
    Column as GroupMemberColumn, Entity as GroupMember, MemberStatus, Model as GroupMemberModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
    NotificationKind,
};
pub use split_group::{Column as SplitGroupColumn, Entity as SplitGroup, Model as SplitGroupModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
