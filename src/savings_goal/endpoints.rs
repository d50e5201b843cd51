//! The route handlers for the savings goal API.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    AppState, DatabaseID, Error,
    savings_goal::core::{
        SavingsGoalData, delete_savings_goal, get_savings_goals, insert_savings_goal,
        update_savings_goal,
    },
    user::UserID,
};

/// A route handler for listing the current user's savings goals, most
/// recently created first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_savings_goals_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().unwrap();
    let goals = get_savings_goals(user_id, &connection)?;

    Ok(Json(goals))
}

/// A route handler for creating a new savings goal.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_savings_goal_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Json(data): Json<SavingsGoalData>,
) -> Result<impl IntoResponse, Error> {
    let data = data.try_into()?;

    let connection = state.db_connection.lock().unwrap();
    let goal = insert_savings_goal(user_id, data, &connection)?;

    Ok((StatusCode::CREATED, Json(goal)))
}

/// A route handler for overwriting a savings goal.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_savings_goal_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<DatabaseID>,
    Json(data): Json<SavingsGoalData>,
) -> Result<impl IntoResponse, Error> {
    let data = data.try_into()?;

    let connection = state.db_connection.lock().unwrap();
    let goal = update_savings_goal(goal_id, user_id, data, &connection)?;

    Ok(Json(goal))
}

/// A route handler for deleting a savings goal.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_savings_goal_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<DatabaseID>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().unwrap();
    delete_savings_goal(goal_id, user_id, &connection)?;

    Ok(Json(json!({ "message": "Goal deleted" })))
}
