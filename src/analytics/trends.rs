//! Income and expense totals over the last six calendar months.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    analytics::{last_six_month_starts, month_label, next_month_start},
    transaction::TransactionType,
    user::UserID,
};

/// The income and expense totals for a single calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotals {
    /// A short label for the month, e.g. "Mar 2024".
    pub month: String,
    /// The total income for the month.
    pub income: f64,
    /// The total expenses for the month.
    pub expenses: f64,
    /// The income minus the expenses for the month.
    pub savings: f64,
}

/// Sum the transactions of `transaction_type` owned by `user_id` dated within
/// `[month_start, month_end)`.
fn sum_transactions_in_month(
    user_id: UserID,
    transaction_type: TransactionType,
    month_start: Date,
    month_end: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions
             WHERE user_id = ?1 AND transaction_type = ?2
             AND date >= ?3 AND date < ?4",
        )?
        .query_row(
            (
                user_id.as_i64(),
                transaction_type.as_str(),
                month_start,
                month_end,
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the income and expense totals of `user_id` for each of the six
/// calendar months ending with the month `today` falls in, oldest first.
pub(crate) fn get_trends(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<MonthTotals>, Error> {
    last_six_month_starts(today)
        .into_iter()
        .map(|month_start| {
            let month_end = next_month_start(month_start);

            let income = sum_transactions_in_month(
                user_id,
                TransactionType::Income,
                month_start,
                month_end,
                connection,
            )?;
            let expenses = sum_transactions_in_month(
                user_id,
                TransactionType::Expense,
                month_start,
                month_end,
                connection,
            )?;

            Ok(MonthTotals {
                month: month_label(month_start),
                income,
                expenses,
                savings: income - expenses,
            })
        })
        .collect()
}

/// A route handler for income and expense totals over the last six months.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn trends_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let today = OffsetDateTime::now_utc().date();

    let connection = state.db_connection.lock().unwrap();
    let trends = get_trends(user_id, today, &connection)?;

    Ok(Json(trends))
}

#[cfg(test)]
mod trends_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        analytics::trends::get_trends,
        db::initialize,
        transaction::{TransactionData, TransactionType, core::insert_transaction},
        user::{UserID, create_user},
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        initialize(&conn).expect("Could not initialize database");

        conn
    }

    fn create_test_user(connection: &Connection) -> UserID {
        create_user(
            "alice",
            &EmailAddress::from_str("alice@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            connection,
        )
        .unwrap()
        .id
    }

    fn insert(
        user_id: UserID,
        amount: f64,
        transaction_type: TransactionType,
        date: time::Date,
        connection: &Connection,
    ) {
        let data = TransactionData {
            amount: Some(amount),
            category: Some("misc".to_string()),
            transaction_type: Some(transaction_type),
            date: Some(date),
            ..Default::default()
        };

        insert_transaction(user_id, data.try_into().unwrap(), connection).unwrap();
    }

    #[test]
    fn trends_cover_six_months_oldest_first() {
        let connection = get_db_connection();
        let user_id = create_test_user(&connection);

        let trends = get_trends(user_id, date!(2024 - 03 - 17), &connection).unwrap();

        let labels: Vec<&str> = trends.iter().map(|entry| entry.month.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Oct 2023", "Nov 2023", "Dec 2023", "Jan 2024", "Feb 2024", "Mar 2024"
            ]
        );
    }

    #[test]
    fn trends_total_each_month_separately() {
        let connection = get_db_connection();
        let user_id = create_test_user(&connection);

        insert(
            user_id,
            500.0,
            TransactionType::Income,
            date!(2024 - 02 - 05),
            &connection,
        );
        insert(
            user_id,
            200.0,
            TransactionType::Expense,
            date!(2024 - 02 - 10),
            &connection,
        );
        insert(
            user_id,
            50.0,
            TransactionType::Expense,
            date!(2024 - 03 - 01),
            &connection,
        );
        // Outside the six month window.
        insert(
            user_id,
            999.0,
            TransactionType::Expense,
            date!(2023 - 09 - 30),
            &connection,
        );

        let trends = get_trends(user_id, date!(2024 - 03 - 17), &connection).unwrap();

        let february = &trends[4];
        assert_eq!(february.month, "Feb 2024");
        assert_eq!(february.income, 500.0);
        assert_eq!(february.expenses, 200.0);
        assert_eq!(february.savings, 300.0);

        let march = &trends[5];
        assert_eq!(march.expenses, 50.0);
        assert_eq!(march.savings, -50.0);

        let october = &trends[0];
        assert_eq!(october.income, 0.0);
        assert_eq!(october.expenses, 0.0);
    }

    #[test]
    fn transactions_on_month_boundaries_count_once() {
        let connection = get_db_connection();
        let user_id = create_test_user(&connection);

        insert(
            user_id,
            100.0,
            TransactionType::Expense,
            date!(2024 - 02 - 01),
            &connection,
        );
        insert(
            user_id,
            100.0,
            TransactionType::Expense,
            date!(2024 - 02 - 29),
            &connection,
        );

        let trends = get_trends(user_id, date!(2024 - 03 - 17), &connection).unwrap();

        let total_expenses: f64 = trends.iter().map(|entry| entry.expenses).sum();
        assert_eq!(total_expenses, 200.0);
        assert_eq!(trends[4].expenses, 200.0);
    }
}
