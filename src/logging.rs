//! Middleware for logging requests and responses.

use axum::{extract::Request, middleware::Next, response::Response};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the response body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged at the `debug` level.
///
/// Password fields in request bodies are redacted before logging. Redaction
/// is applied regardless of the declared content type, since requests with a
/// wrong or missing content type still reach this middleware with their
/// password intact.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    let display_text = redact_password(&body_text, "password");
    log_request(&headers, &display_text);

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

/// Replace the string value of `field_name` in the JSON text `body_text` with
/// asterisks. Returns the text unchanged if the field is not present.
fn redact_password(body_text: &str, field_name: &str) -> String {
    let key = format!("\"{field_name}\"");

    let key_start = match body_text.find(&key) {
        Some(key_start) => key_start,
        None => return body_text.to_string(),
    };

    let after_key = key_start + key.len();
    let value_start = match body_text[after_key..].find('"') {
        Some(quote_offset) => after_key + quote_offset + 1,
        None => return body_text.to_string(),
    };

    // Scan for the closing quote, skipping escaped quotes.
    let mut previous_was_backslash = false;
    let mut value_end = None;

    for (offset, character) in body_text[value_start..].char_indices() {
        if character == '"' && !previous_was_backslash {
            value_end = Some(value_start + offset);
            break;
        }

        previous_was_backslash = character == '\\' && !previous_was_backslash;
    }

    match value_end {
        Some(value_end) => format!(
            "{}********{}",
            &body_text[..value_start],
            &body_text[value_end..]
        ),
        None => body_text.to_string(),
    }
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Truncate `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without slicing
/// through a multi-byte character.
fn truncate_body(body: &str) -> &str {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return body;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod truncate_body_tests {
    use super::{LOG_BODY_LENGTH_LIMIT, truncate_body};

    #[test]
    fn short_body_is_unchanged() {
        assert_eq!(truncate_body("hello"), "hello");
    }

    #[test]
    fn long_ascii_body_is_cut_at_the_limit() {
        let body = "a".repeat(LOG_BODY_LENGTH_LIMIT * 2);

        assert_eq!(truncate_body(&body), "a".repeat(LOG_BODY_LENGTH_LIMIT));
    }

    #[test]
    fn multi_byte_character_straddling_the_limit_is_dropped_whole() {
        // The 'é' is two bytes and starts at index 63, straddling the limit.
        let mut body = "a".repeat(LOG_BODY_LENGTH_LIMIT - 1);
        body.push('é');
        body.push_str(&"a".repeat(LOG_BODY_LENGTH_LIMIT));

        let truncated = truncate_body(&body);

        assert_eq!(truncated, "a".repeat(LOG_BODY_LENGTH_LIMIT - 1));
    }
}

#[cfg(test)]
mod redact_password_tests {
    use super::redact_password;

    #[test]
    fn redacts_password_value() {
        let body = r#"{"email":"alice@example.com","password":"hunter22"}"#;

        let redacted = redact_password(body, "password");

        assert_eq!(
            redacted,
            r#"{"email":"alice@example.com","password":"********"}"#
        );
    }

    #[test]
    fn redacts_password_with_escaped_quote() {
        let body = r#"{"password":"hun\"ter22"}"#;

        let redacted = redact_password(body, "password");

        assert_eq!(redacted, r#"{"password":"********"}"#);
    }

    #[test]
    fn leaves_body_without_password_unchanged() {
        let body = r#"{"amount":12.5,"category":"food"}"#;

        let redacted = redact_password(body, "password");

        assert_eq!(redacted, body);
    }
}
