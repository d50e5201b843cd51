//! The registration endpoint for creating a new user account.

use std::str::FromStr;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, Error, PasswordHash, ValidatedPassword, auth::set_auth_cookie, user};

/// The data a user registers with.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterData {
    /// The display name for the new account. Must be unique.
    #[serde(default)]
    pub username: String,
    /// The email address for the new account. Must be unique.
    #[serde(default)]
    pub email: String,
    /// The plain-text password for the new account.
    #[serde(default)]
    pub password: String,
}

/// A route handler for registering a new user.
///
/// On success the new user is logged in straight away: the auth cookies are
/// added to the 201 response.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_user_endpoint(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(data): Json<RegisterData>,
) -> Result<impl IntoResponse, Error> {
    let username = data.username.trim().to_string();
    let email = data.email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() || data.password.is_empty() {
        return Err(Error::MissingRegistrationFields);
    }

    let email = EmailAddress::from_str(&email).map_err(|_| Error::InvalidEmail(email))?;
    let password = ValidatedPassword::new(&data.password)?;
    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let user = {
        let connection = state.db_connection.lock().unwrap();
        user::create_user(&username, &email, password_hash, &connection)?
    };

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "message": "Registration successful",
            "user": {
                "id": user.id,
                "username": user.username,
                "email": user.email,
            },
        })),
    ))
}
