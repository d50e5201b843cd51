//! The log in endpoint for starting an authenticated session.

use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, Error, auth::set_auth_cookie, user::get_user_by_email};

/// The credentials a user logs in with.
#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    /// The email the user registered with.
    pub email: String,
    /// The user's plain-text password.
    pub password: String,
}

/// A route handler for logging in a user.
///
/// Verifies the password against the stored hash and, on success, adds the
/// auth cookies to the response. Unknown emails and wrong passwords both
/// produce the same 401 response so that the client cannot probe for
/// registered emails.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn log_in_endpoint(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error> {
    let email = credentials.email.trim().to_lowercase();

    let user = {
        let connection = state.db_connection.lock().unwrap();

        get_user_by_email(&email, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    // Verifying the hash is deliberately done outside the database lock since
    // bcrypt verification takes on the order of 100ms.
    let password_is_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "user": {
                "id": user.id,
                "username": user.username,
                "email": user.email,
                "monthly_budget": user.monthly_budget,
            },
        })),
    ))
}
