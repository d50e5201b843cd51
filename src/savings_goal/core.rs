//! The savings goal model and its database access functions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{DatabaseID, Error, user::UserID};

/// An amount of money a user wants to put aside, e.g. for a laptop or a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    /// The goal's ID in the application database.
    pub id: DatabaseID,
    /// The ID of the user that owns the goal.
    pub user_id: UserID,
    /// What the user is saving for.
    pub name: String,
    /// The amount of money the user wants to reach.
    pub target_amount: f64,
    /// The amount of money put aside so far.
    pub current_amount: f64,
    /// The date the user wants to reach the goal by, if they set one.
    pub deadline: Option<Date>,
    /// When the goal was created, as recorded by the database.
    pub created_at: String,
}

/// The client-provided fields for creating or overwriting a savings goal.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SavingsGoalData {
    /// What the user is saving for. Required and must be non-empty.
    pub name: Option<String>,
    /// The amount of money the user wants to reach. Required.
    pub target_amount: Option<f64>,
    /// The amount of money put aside so far. Defaults to zero.
    pub current_amount: Option<f64>,
    /// The date the user wants to reach the goal by.
    pub deadline: Option<Date>,
}

/// The validated fields for creating or overwriting a savings goal.
pub struct ValidatedSavingsGoalData {
    /// What the user is saving for. Non-empty.
    pub name: String,
    /// The amount of money the user wants to reach.
    pub target_amount: f64,
    /// The amount of money put aside so far.
    pub current_amount: f64,
    /// The date the user wants to reach the goal by.
    pub deadline: Option<Date>,
}

impl TryFrom<SavingsGoalData> for ValidatedSavingsGoalData {
    type Error = Error;

    fn try_from(data: SavingsGoalData) -> Result<Self, Self::Error> {
        let name = data.name.unwrap_or_default().trim().to_string();
        if name.is_empty() {
            return Err(Error::MissingGoalFields);
        }

        let target_amount = data.target_amount.ok_or(Error::MissingGoalFields)?;

        Ok(Self {
            name,
            target_amount,
            current_amount: data.current_amount.unwrap_or(0.0),
            deadline: data.deadline,
        })
    }
}

/// Create the savings goals table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_savings_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS savings_goals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                target_amount REAL NOT NULL,
                current_amount REAL DEFAULT 0,
                deadline DATE,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users (id)
                )",
        (),
    )?;

    Ok(())
}

const SAVINGS_GOAL_COLUMNS: &str =
    "id, user_id, name, target_amount, current_amount, deadline, created_at";

/// Insert a new savings goal owned by `user_id` into the database.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn insert_savings_goal(
    user_id: UserID,
    data: ValidatedSavingsGoalData,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO savings_goals (user_id, name, target_amount, current_amount, deadline)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {SAVINGS_GOAL_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                &data.name,
                data.target_amount,
                data.current_amount,
                data.deadline,
            ),
            map_savings_goal_row,
        )
        .map_err(|error| error.into())
}

/// Get all savings goals owned by `user_id`, most recently created first.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_savings_goals(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SAVINGS_GOAL_COLUMNS} FROM savings_goals
             WHERE user_id = ?1 ORDER BY created_at DESC"
        ))?
        .query_map([user_id.as_i64()], map_savings_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the savings goal with `goal_id` owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist or belongs to another
/// user, or [Error::SqlError] if an SQL related error occurred.
pub fn update_savings_goal(
    goal_id: DatabaseID,
    user_id: UserID,
    data: ValidatedSavingsGoalData,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    connection
        .prepare(&format!(
            "UPDATE savings_goals
             SET name = ?1, target_amount = ?2, current_amount = ?3, deadline = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING {SAVINGS_GOAL_COLUMNS}"
        ))?
        .query_row(
            (
                &data.name,
                data.target_amount,
                data.current_amount,
                data.deadline,
                goal_id,
                user_id.as_i64(),
            ),
            map_savings_goal_row,
        )
        .map_err(|error| error.into())
}

/// Delete the savings goal with `goal_id` owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist or belongs to another
/// user, or [Error::SqlError] if an SQL related error occurred.
pub fn delete_savings_goal(
    goal_id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM savings_goals WHERE id = ?1 AND user_id = ?2",
        (goal_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_savings_goal_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    Ok(SavingsGoal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        deadline: row.get(5)?,
        created_at: row.get(6)?,
    })
}
