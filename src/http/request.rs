//! Request conversion.
//!
//! # Responsibilities
//! - Read the body (bounded) and decode url-encoded forms
//! - Build the transport-neutral [`dispatch::Request`](crate::dispatch::Request)
//!
//! # Design Decisions
//! - The raw target (path + query) is kept; the router normalizes it
//! - Non-form bodies are not parsed; handlers see only headers and form fields

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{header, Request};
use thiserror::Error;

use crate::dispatch;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),
}

/// Convert an axum request, reading at most `max_body_bytes` of body.
pub async fn into_core_request(
    request: Request<Body>,
    max_body_bytes: usize,
) -> Result<dispatch::Request, RequestError> {
    let (parts, body) = request.into_parts();

    let is_form = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(FORM_CONTENT_TYPE));

    let post_params: HashMap<String, String> = if is_form {
        let bytes = axum::body::to_bytes(body, max_body_bytes).await?;
        url::form_urlencoded::parse(&bytes).into_owned().collect()
    } else {
        HashMap::new()
    };

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();

    Ok(dispatch::Request {
        method: parts.method.as_str().to_string(),
        path,
        post_params,
        headers: parts.headers,
    })
}
