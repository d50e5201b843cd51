//! Code for creating the application's database schema.

use rusqlite::Connection;

use crate::{
    savings_goal::create_savings_goal_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for the domain models in the application database.
///
/// Table creation is idempotent, so calling this function on an existing
/// database is safe.
///
/// # Errors
///
/// This function will return an error if any of the SQL queries failed.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_user_table(connection)?;
    create_transaction_table(connection)?;
    create_budget_goal_table(connection)?;
    create_savings_goal_table(connection)?;

    Ok(())
}

/// Create the budget goals table.
///
/// The table is part of the application schema but is not read or written by
/// any endpoint yet.
fn create_budget_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget_goals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                limit_amount REAL NOT NULL,
                month TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id)
                )",
        (),
    )?;

    Ok(())
}
