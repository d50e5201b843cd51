//! Daily spending totals for the current month.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{AppState, Error, analytics::month_start, user::UserID};

/// The total amount spent on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// The day the money was spent.
    pub date: Date,
    /// The total amount spent that day.
    pub total: f64,
}

/// Get the expense totals per day of `user_id` for the month `today` falls
/// in, in date order. Days without expenses are skipped.
pub(crate) fn get_daily_spending(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<DailyTotal>, Error> {
    connection
        .prepare(
            "SELECT date, SUM(amount) AS total FROM transactions
             WHERE user_id = ?1 AND transaction_type = 'expense' AND date >= ?2
             GROUP BY date
             ORDER BY date",
        )?
        .query_map((user_id.as_i64(), month_start(today)), |row| {
            Ok(DailyTotal {
                date: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

/// A route handler for daily spending totals for the current month.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn daily_spending_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let today = OffsetDateTime::now_utc().date();

    let connection = state.db_connection.lock().unwrap();
    let daily_totals = get_daily_spending(user_id, today, &connection)?;

    Ok(Json(daily_totals))
}
