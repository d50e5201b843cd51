//! Summaries of a user's finances: monthly totals, six month trends and
//! daily spending.

use time::{Date, Month};

mod daily;
mod summary;
mod trends;

pub(crate) use daily::daily_spending_endpoint;
pub(crate) use summary::summary_endpoint;
pub(crate) use trends::trends_endpoint;

/// The first day of the month that `date` falls in.
fn month_start(date: Date) -> Date {
    // Day 1 is valid for every month, so this cannot fail.
    date.replace_day(1).unwrap()
}

/// The first day of the month after the one that `date` falls in.
fn next_month_start(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        month => (date.year(), month.next()),
    };

    // Day 1 is valid for every month, so this cannot fail.
    Date::from_calendar_date(year, month, 1).unwrap()
}

/// The first day of the month before the one that `date` falls in.
fn previous_month_start(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::January => (date.year() - 1, Month::December),
        month => (date.year(), month.previous()),
    };

    // Day 1 is valid for every month, so this cannot fail.
    Date::from_calendar_date(year, month, 1).unwrap()
}

/// The first days of the six calendar months ending with the month that
/// `today` falls in, oldest first.
fn last_six_month_starts(today: Date) -> Vec<Date> {
    let mut starts = Vec::with_capacity(6);
    let mut start = month_start(today);

    for _ in 0..6 {
        starts.push(start);
        start = previous_month_start(start);
    }

    starts.reverse();
    starts
}

/// A short, human-readable label for the month that `date` falls in, e.g.
/// "Mar 2024".
fn month_label(date: Date) -> String {
    let month_name = date.month().to_string();

    // Month names are ASCII and at least three characters long.
    format!("{} {}", &month_name[..3], date.year())
}

#[cfg(test)]
mod analytics_endpoint_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::OffsetDateTime;

    use crate::{AppState, build_router, endpoints};

    fn new_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().expect("Could not create in-memory SQLite database"),
            "42",
        )
        .expect("Could not create app state");

        let mut server =
            TestServer::new(build_router(state));
        server.save_cookies();

        server
    }

    async fn set_up_user_with_transactions(server: &TestServer) {
        server
            .post(endpoints::REGISTER)
            .json(&json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "hunter22",
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let today = OffsetDateTime::now_utc().date().to_string();

        for body in [
            json!({ "amount": 500.0, "category": "wages", "transaction_type": "income", "date": today }),
            json!({ "amount": 50.0, "category": "food", "transaction_type": "expense", "date": today }),
        ] {
            server
                .post(endpoints::TRANSACTIONS)
                .json(&body)
                .await
                .assert_status(axum::http::StatusCode::CREATED);
        }
    }

    #[tokio::test]
    async fn summary_counts_transactions_created_today() {
        let server = new_test_server();
        set_up_user_with_transactions(&server).await;

        let response = server.get(endpoints::ANALYTICS_SUMMARY).await;

        response.assert_status_ok();
        let summary: Value = response.json();
        assert_eq!(summary["total_income"], 500.0);
        assert_eq!(summary["total_expenses"], 50.0);
        assert_eq!(summary["balance"], 450.0);
        assert_eq!(summary["monthly_budget"], 1000.0);
        assert_eq!(summary["budget_remaining"], 950.0);
        assert_eq!(summary["budget_percentage"], 5.0);
        assert_eq!(summary["category_breakdown"][0]["category"], "food");
        assert_eq!(summary["category_breakdown"][0]["total"], 50.0);
    }

    #[tokio::test]
    async fn trends_return_six_entries_with_current_month_last() {
        let server = new_test_server();
        set_up_user_with_transactions(&server).await;

        let response = server.get(endpoints::ANALYTICS_TRENDS).await;

        response.assert_status_ok();
        let trends: Vec<Value> = response.json();
        assert_eq!(trends.len(), 6);

        let current_month = &trends[5];
        assert_eq!(current_month["income"], 500.0);
        assert_eq!(current_month["expenses"], 50.0);
        assert_eq!(current_month["savings"], 450.0);
    }

    #[tokio::test]
    async fn daily_spending_reports_today() {
        let server = new_test_server();
        set_up_user_with_transactions(&server).await;

        let response = server.get(endpoints::ANALYTICS_DAILY).await;

        response.assert_status_ok();
        let daily: Vec<Value> = response.json();
        assert_eq!(daily.len(), 1);
        assert_eq!(
            daily[0]["date"],
            OffsetDateTime::now_utc().date().to_string()
        );
        assert_eq!(daily[0]["total"], 50.0);
    }
}
