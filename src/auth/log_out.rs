//! The log out endpoint for ending an authenticated session.

use axum::{Json, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::invalidate_auth_cookie;

/// A route handler for logging out the current user.
///
/// Invalidates the auth cookies so that the client deletes them.
pub async fn log_out_endpoint(jar: PrivateCookieJar) -> impl IntoResponse {
    let jar = invalidate_auth_cookie(jar);

    (jar, Json(json!({ "message": "Logged out successfully" })))
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use sha2::Digest;

    use crate::{auth::COOKIE_USER_ID, state::AuthState};

    use super::log_out_endpoint;

    #[tokio::test]
    async fn log_out_invalidates_auth_cookie() {
        let hash = sha2::Sha512::digest("nafstenoas");
        let state = AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration: time::Duration::minutes(5),
        };
        let app = Router::new()
            .route("/log_out", post(log_out_endpoint))
            .with_state(state);
        let server = TestServer::new(app);

        let response = server.post("/log_out").await;

        response.assert_status_ok();
        let cookie = response.cookie(COOKIE_USER_ID);
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
