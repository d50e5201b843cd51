//! Defines the routes for the API and glues the route handlers to them.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post, put},
};

use crate::{
    AppState, analytics, auth,
    endpoints,
    register_user::register_user_endpoint,
    savings_goal, state::AuthState, transaction,
    user::{get_user_endpoint, update_budget_endpoint},
};

/// Create the router for the application.
///
/// Routes that access user data are protected by an auth guard that checks
/// for a valid session cookie and makes the user's ID available to the
/// handlers.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::REGISTER, post(register_user_endpoint))
        .route(endpoints::LOG_IN, post(auth::log_in_endpoint))
        .route(endpoints::LOG_OUT, post(auth::log_out_endpoint));

    let protected_routes = Router::new()
        .route(endpoints::USER, get(get_user_endpoint))
        .route(endpoints::USER_BUDGET, put(update_budget_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(transaction::get_transactions_endpoint)
                .post(transaction::create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(transaction::get_transaction_endpoint)
                .put(transaction::update_transaction_endpoint)
                .delete(transaction::delete_transaction_endpoint),
        )
        .route(
            endpoints::SAVINGS_GOALS,
            get(savings_goal::get_savings_goals_endpoint)
                .post(savings_goal::create_savings_goal_endpoint),
        )
        .route(
            endpoints::SAVINGS_GOAL,
            put(savings_goal::update_savings_goal_endpoint)
                .delete(savings_goal::delete_savings_goal_endpoint),
        )
        .route(endpoints::ANALYTICS_SUMMARY, get(analytics::summary_endpoint))
        .route(endpoints::ANALYTICS_TRENDS, get(analytics::trends_endpoint))
        .route(endpoints::ANALYTICS_DAILY, get(analytics::daily_spending_endpoint))
        .route_layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth::auth_guard,
        ));

    Router::new()
        .merge(unprotected_routes)
        .merge(protected_routes)
        .with_state(state)
}
