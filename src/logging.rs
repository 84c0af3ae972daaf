//! Middleware that logs each request and response along with a prefix of their bodies.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{Method, StatusCode, header::CONTENT_TYPE, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this are cut short at `info` and logged in full at `debug`.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest body the middleware will buffer.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Form fields whose values never reach the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Password fields in submitted forms are replaced with asterisks before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = match read_request(request).await {
        Ok(read) => read,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let body_text = String::from_utf8_lossy(&body);
    if is_form_post(&parts) {
        let redacted = REDACTED_FIELDS
            .iter()
            .fold(body_text.into_owned(), |text, field| redact_field(&text, field));
        log_request(&parts, &redacted);
    } else {
        log_request(&parts, &body_text);
    }

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;

    let (parts, body) = match read_response(response).await {
        Ok(read) => read,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body));

    Response::from_parts(parts, Body::from(body))
}

fn is_form_post(parts: &request::Parts) -> bool {
    parts.method == Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .is_some_and(|content_type| content_type == "application/x-www-form-urlencoded")
}

/// Replace the value of `field_name` in a URL encoded form body.
fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == field_name => format!("{key}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

async fn read_request(request: Request) -> Result<(request::Parts, Bytes), axum::Error> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES).await?;

    Ok((parts, bytes))
}

async fn read_response(response: Response) -> Result<(response::Parts, Bytes), axum::Error> {
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES).await?;

    Ok((parts, bytes))
}

fn truncate(body: &str) -> &str {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return body;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(parts: &request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {}...",
            parts.method,
            parts.uri,
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {}...",
            parts.status,
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}
