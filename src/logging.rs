//! Middleware for logging requests and responses.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// The maximum number of body bytes included in an `info`-level log line.
const LOG_BODY_LENGTH_LIMIT: usize = 256;

/// Log each request with its body and each response with its status and
/// timing.
///
/// Password and token fields in JSON bodies are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let body_text = String::from_utf8_lossy(&body_bytes).to_string();

    let display_text = redact_field(&body_text, "password");
    let display_text = redact_field(&display_text, "refreshToken");

    let method = parts.method.clone();
    let uri = parts.uri.clone();

    if display_text.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Request: {method} {uri} body: {}...",
            &display_text[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {display_text}");
    } else {
        tracing::info!("Request: {method} {uri} body: {display_text}");
    }

    let start_time = Instant::now();
    let response = next.run(Request::from_parts(parts, body_bytes.into())).await;
    let elapsed = start_time.elapsed();

    tracing::info!(
        "Response: {method} {uri} status: {} ({} ms)",
        response.status(),
        elapsed.as_millis()
    );

    response
}

/// Replace the string value of `field_name` in a JSON `body_text` with
/// asterisks.
///
/// The replacement is textual, values containing escaped quotes are not
/// handled.
fn redact_field(body_text: &str, field_name: &str) -> String {
    let needle = format!("\"{field_name}\"");

    let Some(field_start) = body_text.find(&needle) else {
        return body_text.to_string();
    };

    let value_section = &body_text[field_start + needle.len()..];

    let Some(opening_quote) = value_section.find('"') else {
        return body_text.to_string();
    };

    let Some(closing_quote) = value_section[opening_quote + 1..].find('"') else {
        return body_text.to_string();
    };

    let value_start = field_start + needle.len() + opening_quote + 1;
    let value_end = value_start + closing_quote;

    format!(
        "{}********{}",
        &body_text[..value_start],
        &body_text[value_end..]
    )
}

#[cfg(test)]
mod redact_field_tests {
    use super::redact_field;

    #[test]
    fn password_values_are_redacted() {
        let body = r#"{"email":"foo@bar.baz","password":"hunter2"}"#;

        let redacted = redact_field(body, "password");

        assert_eq!(redacted, r#"{"email":"foo@bar.baz","password":"********"}"#);
    }

    #[test]
    fn refresh_token_values_are_redacted() {
        let body = r#"{"refreshToken":"abc.def.ghi"}"#;

        let redacted = redact_field(body, "refreshToken");

        assert_eq!(redacted, r#"{"refreshToken":"********"}"#);
    }

    #[test]
    fn bodies_without_the_field_are_untouched() {
        let body = r#"{"amount":42.0}"#;

        assert_eq!(redact_field(body, "password"), body);
    }

    #[test]
    fn empty_bodies_are_untouched() {
        assert_eq!(redact_field("", "password"), "");
    }
}
