//! The route handlers for the transaction API.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    AppState, DatabaseID, Error,
    transaction::core::{
        TransactionData, TransactionFilter, delete_transaction, get_transaction,
        insert_transaction, query_transactions, update_transaction,
    },
    user::UserID,
};

/// A route handler for creating a new transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Json(data): Json<TransactionData>,
) -> Result<impl IntoResponse, Error> {
    let data = data.try_into()?;

    let connection = state.db_connection.lock().unwrap();
    let transaction = insert_transaction(user_id, data, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for listing the current user's transactions.
///
/// Accepts optional `start_date`, `end_date`, `category` and `type` query
/// parameters. Transactions are returned newest first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transactions_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Query(filter): Query<TransactionFilter>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().unwrap();
    let transactions = query_transactions(user_id, filter, &connection)?;

    Ok(Json(transactions))
}

/// A route handler for getting a single transaction by its ID.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().unwrap();
    let transaction = get_transaction(transaction_id, user_id, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for overwriting a transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<DatabaseID>,
    Json(data): Json<TransactionData>,
) -> Result<impl IntoResponse, Error> {
    let data = data.try_into()?;

    let connection = state.db_connection.lock().unwrap();
    let transaction = update_transaction(transaction_id, user_id, data, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for deleting a transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().unwrap();
    delete_transaction(transaction_id, user_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted" })))
}
