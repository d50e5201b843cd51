//! Code for creating the users table, fetching users from the database, and
//! the current-user profile endpoints.

use std::fmt::Display;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, Error, PasswordHash};

/// The monthly budget assigned to users that have not set one.
pub const DEFAULT_MONTHLY_BUDGET: f64 = 1000.0;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user registered with. Unique across users.
    pub username: String,
    /// The user's email address. Unique across users.
    pub email: String,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// The user's monthly spending budget.
    pub monthly_budget: f64,
    /// When the user registered, as recorded by the database.
    pub created_at: String,
}

/// Create the users table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                monthly_budget REAL DEFAULT 1000.00
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateUser] if the username or email is already taken,
/// or [Error::SqlError] if another SQL related error occurred.
pub fn create_user(
    username: &str,
    email: &EmailAddress,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
        (username, email.to_string(), password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    get_user_by_id(id, connection)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, username, email, password_hash, monthly_budget, created_at
             FROM users WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no user with the specified email, or
/// [Error::SqlError] if there was an SQL related error.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, username, email, password_hash, monthly_budget, created_at
             FROM users WHERE email = :email",
        )?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Set the monthly budget of the user with `user_id` to `monthly_budget`.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn set_monthly_budget(
    user_id: UserID,
    monthly_budget: f64,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE users SET monthly_budget = ?1 WHERE id = ?2",
        (monthly_budget, user_id.as_i64()),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let username = row.get(1)?;
    let email = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let monthly_budget = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(User {
        id: UserID::new(raw_id),
        username,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        monthly_budget,
        created_at,
    })
}

/// A route handler for getting the current user's profile.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_user_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().unwrap();
    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "monthly_budget": user.monthly_budget,
        "created_at": user.created_at,
    })))
}

/// The data for updating the current user's monthly budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetData {
    /// The new monthly budget. Resets to the default when omitted.
    pub monthly_budget: Option<f64>,
}

/// A route handler for updating the current user's monthly budget.
///
/// A request body without a budget resets the budget to
/// [DEFAULT_MONTHLY_BUDGET].
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_budget_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Json(data): Json<BudgetData>,
) -> Result<impl IntoResponse, Error> {
    let monthly_budget = data.monthly_budget.unwrap_or(DEFAULT_MONTHLY_BUDGET);

    let connection = state.db_connection.lock().unwrap();
    set_monthly_budget(user_id, monthly_budget, &connection)?;

    Ok(Json(json!({
        "message": "Budget updated",
        "monthly_budget": monthly_budget,
    })))
}

#[cfg(test)]
mod user_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        user::{DEFAULT_MONTHLY_BUDGET, UserID, get_user_by_email, set_monthly_budget},
    };

    use super::{Error, create_user, create_user_table, get_user_by_id};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create users table");

        conn
    }

    fn test_email() -> EmailAddress {
        EmailAddress::from_str("hello@world.com").unwrap()
    }

    #[test]
    fn insert_user_succeeds() {
        let connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user =
            create_user("alice", &test_email(), password_hash.clone(), &connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.username, "alice");
        assert_eq!(inserted_user.email, "hello@world.com");
        assert_eq!(inserted_user.password_hash, password_hash);
        assert_eq!(inserted_user.monthly_budget, DEFAULT_MONTHLY_BUDGET);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let connection = get_db_connection();

        create_user(
            "alice",
            &test_email(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let result = create_user(
            "bob",
            &test_email(),
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateUser));
    }

    #[test]
    fn insert_user_fails_on_duplicate_username() {
        let connection = get_db_connection();

        create_user(
            "alice",
            &test_email(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let result = create_user(
            "alice",
            &EmailAddress::from_str("alice@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateUser));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let connection = get_db_connection();
        let test_user = create_user(
            "alice",
            &test_email(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_succeeds_with_existing_email() {
        let connection = get_db_connection();
        let test_user = create_user(
            "alice",
            &test_email(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_email("hello@world.com", &connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn set_monthly_budget_overwrites_budget() {
        let connection = get_db_connection();
        let test_user = create_user(
            "alice",
            &test_email(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        set_monthly_budget(test_user.id, 250.0, &connection).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &connection).unwrap();
        assert_eq!(retrieved_user.monthly_budget, 250.0);
    }
}
