//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The number of bytes of a request or response body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";
const SECRET_FIELDS: [&str; 1] = ["password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords in form and JSON request bodies are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    log_request(&parts, &redact_body(&parts, &body_text));

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match to_bytes(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn to_bytes(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, usize::MAX).await
}

fn redact_body(parts: &request::Parts, body_text: &str) -> String {
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        redact_form(body_text)
    } else if content_type.starts_with("application/json") {
        redact_json(body_text)
    } else {
        body_text.to_owned()
    }
}

fn redact_form(form_text: &str) -> String {
    let Ok(fields) = serde_urlencoded::from_str::<Vec<(String, String)>>(form_text) else {
        return REDACTED.to_owned();
    };

    let fields = fields
        .into_iter()
        .map(|(name, value)| {
            if SECRET_FIELDS.contains(&name.as_str()) {
                (name, REDACTED.to_owned())
            } else {
                (name, value)
            }
        })
        .collect::<Vec<_>>();

    serde_urlencoded::to_string(fields).unwrap_or_else(|_| REDACTED.to_owned())
}

fn redact_json(json_text: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<Value>(json_text) else {
        // Malformed JSON may still hold a password.
        return if SECRET_FIELDS.iter().any(|field| json_text.contains(field)) {
            REDACTED.to_owned()
        } else {
            json_text.to_owned()
        };
    };

    if let Value::Object(object) = &mut value {
        for field in SECRET_FIELDS {
            if let Some(secret) = object.get_mut(field) {
                *secret = Value::String(REDACTED.to_owned());
            }
        }
    }

    value.to_string()
}

/// The longest prefix of `text` that is at most `limit` bytes and ends on a char boundary.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_request(parts: &request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::json;

    use super::{logging_middleware, redact_form, redact_json, truncate};

    #[test]
    fn redacts_form_password() {
        let redacted = redact_form("email=john%40example.com&password=hunter2&role=employee");

        assert_eq!(
            redacted,
            "email=john%40example.com&password=********&role=employee"
        );
    }

    #[test]
    fn leaves_other_form_fields() {
        let redacted = redact_form("employee=all&type=inbound&search=INV");

        assert_eq!(redacted, "employee=all&type=inbound&search=INV");
    }

    #[test]
    fn redacts_json_password() {
        let redacted = redact_json(r#"{"email":"john@example.com","password":"hunter2"}"#);

        assert!(!redacted.contains("hunter2"), "got {redacted}");
        assert!(redacted.contains("john@example.com"), "got {redacted}");
    }

    #[test]
    fn redacts_malformed_json_with_password() {
        let redacted = redact_json(r#"{"password":"hunter2""#);

        assert_eq!(redacted, "********");
    }

    #[test]
    fn truncate_keeps_whole_characters() {
        // '₱' is three bytes long.
        let text = "₱₱₱";

        assert_eq!(truncate(text, 4), "₱");
        assert_eq!(truncate(text, 9), text);
    }

    #[tokio::test]
    async fn passes_body_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.post("/echo").json(&json!({"password": "hunter2"})).await;

        response.assert_status(StatusCode::OK);
        response.assert_text(r#"{"password":"hunter2"}"#);
    }
}
