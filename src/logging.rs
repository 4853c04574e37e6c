//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderMap,
        header::{CONTENT_TYPE, HeaderValue},
    },
    middleware::Next,
    response::Response,
};

/// The number of bytes of a request or response body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values never appear in the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Only text bodies are logged; uploads and spreadsheet downloads are summarised by size.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return next.run(Request::from_parts(parts, Body::empty())).await;
        }
    };

    let body_text = describe_body(&parts.headers, &body_bytes);
    let body_text = if is_form(&parts.headers) {
        REDACTED_FIELDS
            .iter()
            .fold(body_text, |text, field| redact_field(&text, field))
    } else {
        body_text
    };
    log_body("Received request", &format!("{parts:#?}"), &body_text);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return Response::from_parts(parts, Body::empty());
        }
    };
    log_body(
        "Sending response",
        &format!("{parts:#?}"),
        &describe_body(&parts.headers, &body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers.get(CONTENT_TYPE) == Some(&HeaderValue::from_static("application/x-www-form-urlencoded"))
}

fn is_text(headers: &HeaderMap) -> bool {
    match headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()) {
        Some(content_type) => {
            content_type.starts_with("text/")
                || content_type.starts_with("application/x-www-form-urlencoded")
                || content_type.starts_with("application/json")
        }
        None => true,
    }
}

fn describe_body(headers: &HeaderMap, bytes: &[u8]) -> String {
    if is_text(headers) {
        String::from_utf8_lossy(bytes).to_string()
    } else {
        format!("<{} bytes of binary data>", bytes.len())
    }
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == field_name => format!("{field_name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
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

fn log_body(prefix: &str, headers: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{prefix}: {headers}\nbody: {}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{prefix}: {headers}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::{redact_field, truncate};

    #[test]
    fn redacts_password_field() {
        let form = "username=admin&password=hunter2&remember_me=on";

        assert_eq!(
            redact_field(form, "password"),
            "username=admin&password=********&remember_me=on"
        );
    }

    #[test]
    fn redact_leaves_other_fields_alone() {
        let form = "username=admin&password_hint=none";

        assert_eq!(redact_field(form, "password"), form);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // 'é' is two bytes long, so cutting after one byte would split it.
        assert_eq!(truncate("éa", 1), "");
        assert_eq!(truncate("éa", 2), "é");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
