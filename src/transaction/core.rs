//! The transaction model and its database access functions.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{DatabaseID, Error, user::UserID};

/// Whether a transaction adds to or subtracts from the user's balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. an allowance or part-time job wages.
    Income,
    /// Money going out. The default when the client does not say otherwise.
    #[default]
    Expense,
}

impl TransactionType {
    /// The string stored in the database for this transaction type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// An income or expense recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The transaction's ID in the application database.
    pub id: DatabaseID,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// The amount of money, in the user's currency.
    pub amount: f64,
    /// A free-text label grouping related transactions, e.g. "food".
    pub category: String,
    /// An optional note describing the transaction.
    pub description: String,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The calendar date the transaction happened on.
    pub date: Date,
    /// When the transaction was recorded, as recorded by the database.
    pub created_at: String,
}

/// The client-provided fields for creating or overwriting a transaction.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionData {
    /// The amount of money. Required and must be non-zero.
    pub amount: Option<f64>,
    /// The category label. Required and must be non-empty.
    pub category: Option<String>,
    /// An optional note describing the transaction.
    pub description: Option<String>,
    /// Defaults to [TransactionType::Expense] when omitted.
    pub transaction_type: Option<TransactionType>,
    /// Defaults to today when omitted.
    pub date: Option<Date>,
}

/// The validated fields for creating or overwriting a transaction.
pub struct ValidatedTransactionData {
    /// The amount of money. Non-zero.
    pub amount: f64,
    /// The category label. Non-empty.
    pub category: String,
    /// A note describing the transaction, possibly empty.
    pub description: String,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The calendar date the transaction happened on.
    pub date: Date,
}

impl TryFrom<TransactionData> for ValidatedTransactionData {
    type Error = Error;

    /// Validate the client-provided fields.
    ///
    /// A missing or zero amount and a missing or blank category are rejected,
    /// matching the presence checks the API has always done. Everything else
    /// gets a default.
    fn try_from(data: TransactionData) -> Result<Self, Self::Error> {
        let amount = match data.amount {
            Some(amount) if amount != 0.0 => amount,
            _ => return Err(Error::MissingTransactionFields),
        };

        let category = data.category.unwrap_or_default().trim().to_string();
        if category.is_empty() {
            return Err(Error::MissingTransactionFields);
        }

        Ok(Self {
            amount,
            category,
            description: data.description.unwrap_or_default().trim().to_string(),
            transaction_type: data.transaction_type.unwrap_or_default(),
            date: data.date.unwrap_or_else(|| OffsetDateTime::now_utc().date()),
        })
    }
}

/// The optional filters for listing transactions.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Include transactions on or before this date.
    pub end_date: Option<Date>,
    /// Include transactions with exactly this category label.
    pub category: Option<String>,
    /// Include only income or only expense transactions.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
}

/// Create the transactions table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                transaction_type TEXT NOT NULL,
                date DATE NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users (id)
                )",
        (),
    )?;

    Ok(())
}

const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, category, description, transaction_type, date, created_at";

/// Insert a new transaction owned by `user_id` into the database.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn insert_transaction(
    user_id: UserID,
    data: ValidatedTransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO transactions (user_id, amount, category, description, transaction_type, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                data.amount,
                &data.category,
                &data.description,
                data.transaction_type.as_str(),
                data.date,
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Get the transaction with `transaction_id` owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// another user, or [Error::SqlError] if an SQL related error occurred.
pub fn get_transaction(
    transaction_id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((transaction_id, user_id.as_i64()), map_transaction_row)
        .map_err(|error| error.into())
}

/// Get all transactions owned by `user_id` that match `filter`, ordered by
/// date and then creation time, newest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn query_transactions(
    user_id: UserID,
    filter: TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query_string_parts = vec![format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = ?1"
    )];
    let mut query_parameters = vec![Value::Integer(user_id.as_i64())];

    if let Some(start_date) = filter.start_date {
        query_string_parts.push(format!("AND date >= ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = filter.end_date {
        query_string_parts.push(format!("AND date <= ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(end_date.to_string()));
    }

    // A blank category, e.g. from an empty `?category=` query parameter,
    // means no filter rather than matching nothing.
    if let Some(category) = filter.category.filter(|category| !category.trim().is_empty()) {
        query_string_parts.push(format!("AND category = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(category));
    }

    if let Some(transaction_type) = filter.transaction_type {
        query_string_parts.push(format!(
            "AND transaction_type = ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Text(transaction_type.as_str().to_string()));
    }

    query_string_parts.push("ORDER BY date DESC, created_at DESC".to_string());

    let query_string = query_string_parts.join(" ");
    let params = params_from_iter(query_parameters.iter());

    connection
        .prepare(&query_string)?
        .query_map(params, map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the transaction with `transaction_id` owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// another user, or [Error::SqlError] if an SQL related error occurred.
pub fn update_transaction(
    transaction_id: DatabaseID,
    user_id: UserID,
    data: ValidatedTransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "UPDATE transactions
             SET amount = ?1, category = ?2, description = ?3, transaction_type = ?4, date = ?5
             WHERE id = ?6 AND user_id = ?7
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                data.amount,
                &data.category,
                &data.description,
                data.transaction_type.as_str(),
                data.date,
                transaction_id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Delete the transaction with `transaction_id` owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// another user, or [Error::SqlError] if an SQL related error occurred.
pub fn delete_transaction(
    transaction_id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_transaction_type: String = row.get(5)?;
    let transaction_type = match raw_transaction_type.as_str() {
        "income" => TransactionType::Income,
        _ => TransactionType::Expense,
    };

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        transaction_type,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}
