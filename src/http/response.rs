//! Outcome to HTTP response conversion.
//!
//! # Design Decisions
//! - Redirects carry only a Location header and an empty body
//! - Bodies always carry the content type the outcome declares
//! - PassThrough has no response; the caller forwards the request instead

use axum::{
    body::Body,
    http::{header, HeaderValue, Response},
};

use crate::routing::Outcome;

impl Outcome {
    /// Build the HTTP response, or `None` for pass-through.
    pub fn into_http_response(self) -> Option<Response<Body>> {
        let content_type = self.content_type();
        let (status, location, body) = match self {
            Outcome::PassThrough => return None,
            Outcome::Redirect { status, location } => (status, Some(location), Body::empty()),
            Outcome::Json { status, body }
            | Outcome::Html { status, body }
            | Outcome::PlainText { status, body } => (status, None, Body::from(body)),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        let headers = response.headers_mut();
        if let Some(content_type) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        if let Some(location) = location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    headers.insert(header::LOCATION, value);
                }
                Err(_) => {
                    tracing::warn!(location = %location, "Redirect target is not a valid header value");
                }
            }
        }
        Some(response)
    }
}
