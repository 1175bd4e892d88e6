//! Response conversion.
//!
//! # Responsibilities
//! - Turn a [`dispatch::Response`](crate::dispatch::Response) into an axum response
//! - Answer 500-class router errors with a generic body

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::dispatch;
use crate::error::RouterError;

impl IntoResponse for dispatch::Response {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Generic 500; the detail goes to the log only.
pub fn internal_error(error: &RouterError) -> Response {
    tracing::error!(error = %error, "Request failed with internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=UTF-8"))],
        "500 Internal Server Error",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_headers_carry_over() {
        let mut core = dispatch::Response::new(StatusCode::CREATED, "made");
        core.headers.insert(header::LOCATION, HeaderValue::from_static("/items/1"));

        let response = core.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/items/1");
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let response = internal_error(&RouterError::UnknownMiddleware("secret".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
