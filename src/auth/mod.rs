//! User authentication: session cookies, the auth middleware guard, and the
//! log in/out endpoints.

mod cookie;
mod log_in;
mod log_out;
mod middleware;

pub(crate) use cookie::{
    COOKIE_USER_ID, DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie,
};
pub(crate) use log_in::log_in_endpoint;
pub(crate) use log_out::log_out_endpoint;
pub(crate) use middleware::auth_guard;
