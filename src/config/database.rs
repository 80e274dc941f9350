//! Database configuration module for `SplitBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::{
    ExpenseSplit, GroupExpense, GroupMember, Notification, SplitGroup, Transaction, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

/// Default database location when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/split_buddy.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to [`DEFAULT_DATABASE_URL`] if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Tables are created in dependency order (users and groups before the rows
/// that reference them) and only if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(SplitGroup),
        schema.create_table_from_entity(GroupMember),
        schema.create_table_from_entity(GroupExpense),
        schema.create_table_from_entity(ExpenseSplit),
        schema.create_table_from_entity(Notification),
        schema.create_table_from_entity(Transaction),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    info!("Database tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        expense_split::Model as ExpenseSplitModel, group_expense::Model as GroupExpenseModel,
        group_member::Model as GroupMemberModel, notification::Model as NotificationModel,
        split_group::Model as SplitGroupModel, transaction::Model as TransactionModel,
        user::Model as UserModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<SplitGroupModel> = SplitGroup::find().limit(1).all(&db).await?;
        let _: Vec<GroupMemberModel> = GroupMember::find().limit(1).all(&db).await?;
        let _: Vec<GroupExpenseModel> = GroupExpense::find().limit(1).all(&db).await?;
        let _: Vec<ExpenseSplitModel> = ExpenseSplit::find().limit(1).all(&db).await?;
        let _: Vec<NotificationModel> = Notification::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
