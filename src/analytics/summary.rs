//! The financial summary for the current month.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, analytics::month_start, transaction::TransactionType,
    user::{UserID, get_user_by_id},
};

/// The total amount spent on a category this month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// The total amount spent on the category.
    pub total: f64,
}

/// A summary of the user's finances for the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The total income this month.
    pub total_income: f64,
    /// The total expenses this month.
    pub total_expenses: f64,
    /// The income minus the expenses this month.
    pub balance: f64,
    /// The user's monthly spending budget.
    pub monthly_budget: f64,
    /// The budget minus the expenses this month. Negative when over budget.
    pub budget_remaining: f64,
    /// The expenses as a percentage of the budget, or zero when the budget is
    /// not positive.
    pub budget_percentage: f64,
    /// The expense totals per category this month, largest first.
    pub category_breakdown: Vec<CategoryTotal>,
}

/// Sum the transactions of `transaction_type` owned by `user_id` dated on or
/// after `from_date`.
fn sum_transactions(
    user_id: UserID,
    transaction_type: TransactionType,
    from_date: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions
             WHERE user_id = ?1 AND transaction_type = ?2 AND date >= ?3",
        )?
        .query_row(
            (user_id.as_i64(), transaction_type.as_str(), from_date),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the expense totals per category owned by `user_id` dated on or after
/// `from_date`, largest first.
fn category_breakdown(
    user_id: UserID,
    from_date: Date,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) AS total FROM transactions
             WHERE user_id = ?1 AND transaction_type = 'expense' AND date >= ?2
             GROUP BY category
             ORDER BY total DESC",
        )?
        .query_map((user_id.as_i64(), from_date), |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

/// Build the summary of the finances of `user_id` for the month `today` falls
/// in.
pub(crate) fn get_summary(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Summary, Error> {
    let from_date = month_start(today);

    let total_income = sum_transactions(user_id, TransactionType::Income, from_date, connection)?;
    let total_expenses =
        sum_transactions(user_id, TransactionType::Expense, from_date, connection)?;
    let monthly_budget = get_user_by_id(user_id, connection)?.monthly_budget;

    let budget_percentage = if monthly_budget > 0.0 {
        total_expenses / monthly_budget * 100.0
    } else {
        0.0
    };

    Ok(Summary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        monthly_budget,
        budget_remaining: monthly_budget - total_expenses,
        budget_percentage,
        category_breakdown: category_breakdown(user_id, from_date, connection)?,
    })
}

/// A route handler for the current month's financial summary.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn summary_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let today = OffsetDateTime::now_utc().date();

    let connection = state.db_connection.lock().unwrap();
    let summary = get_summary(user_id, today, &connection)?;

    Ok(Json(summary))
}

#[cfg(test)]
mod summary_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        analytics::summary::{CategoryTotal, get_summary},
        db::initialize,
        transaction::{TransactionData, TransactionType},
        user::{UserID, create_user, set_monthly_budget},
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
        category: &str,
        transaction_type: TransactionType,
        date: time::Date,
        connection: &Connection,
    ) {
        let data = TransactionData {
            amount: Some(amount),
            category: Some(category.to_string()),
            transaction_type: Some(transaction_type),
            date: Some(date),
            ..Default::default()
        };

        crate::transaction::core::insert_transaction(
            user_id,
            data.try_into().unwrap(),
            connection,
        )
        .unwrap();
    }

    #[test]
    fn summary_totals_income_and_expenses_for_current_month() {
        let connection = get_db_connection();
        let user_id = create_test_user(&connection);
        let today = date!(2024 - 03 - 17);

        insert(
            user_id,
            500.0,
            "wages",
            TransactionType::Income,
            date!(2024 - 03 - 05),
            &connection,
        );
        insert(
            user_id,
            120.0,
            "food",
            TransactionType::Expense,
            date!(2024 - 03 - 10),
            &connection,
        );
        insert(
            user_id,
            80.0,
            "travel",
            TransactionType::Expense,
            date!(2024 - 03 - 12),
            &connection,
        );
        // A transaction from last month should not be counted.
        insert(
            user_id,
            999.0,
            "food",
            TransactionType::Expense,
            date!(2024 - 02 - 28),
            &connection,
        );

        let summary = get_summary(user_id, today, &connection).unwrap();

        assert_eq!(summary.total_income, 500.0);
        assert_eq!(summary.total_expenses, 200.0);
        assert_eq!(summary.balance, 300.0);
        assert_eq!(summary.monthly_budget, 1000.0);
        assert_eq!(summary.budget_remaining, 800.0);
        assert_eq!(summary.budget_percentage, 20.0);
        assert_eq!(
            summary.category_breakdown,
            vec![
                CategoryTotal {
                    category: "food".to_string(),
                    total: 120.0
                },
                CategoryTotal {
                    category: "travel".to_string(),
                    total: 80.0
                },
            ]
        );
    }

    #[test]
    fn summary_is_all_zeroes_with_no_transactions() {
        let connection = get_db_connection();
        let user_id = create_test_user(&connection);

        let summary = get_summary(user_id, date!(2024 - 03 - 17), &connection).unwrap();

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.budget_percentage, 0.0);
        assert!(summary.category_breakdown.is_empty());
    }

    #[test]
    fn budget_percentage_is_zero_when_budget_is_zero() {
        let connection = get_db_connection();
        let user_id = create_test_user(&connection);
        set_monthly_budget(user_id, 0.0, &connection).unwrap();

        insert(
            user_id,
            50.0,
            "food",
            TransactionType::Expense,
            date!(2024 - 03 - 10),
            &connection,
        );

        let summary = get_summary(user_id, date!(2024 - 03 - 17), &connection).unwrap();

        assert_eq!(summary.budget_percentage, 0.0);
        assert_eq!(summary.budget_remaining, -50.0);
    }
}
