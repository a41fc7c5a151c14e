//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Extract routing-relevant information (host, path, query)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Host comes from the Host header, falling back to the URI authority (HTTP/2)
//! - The first occurrence of a repeated query parameter wins

use std::collections::HashMap;

use axum::http::{header, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::form_urlencoded;

use crate::routing::EdgeRequest;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build the router's view of an HTTP request.
pub fn edge_request<B>(req: &Request<B>) -> EdgeRequest {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default()
        .to_string();

    EdgeRequest {
        host,
        uri: req.uri().path().to_string(),
        query: req.uri().query().map(parse_query).unwrap_or_default(),
    }
}

/// Decode a raw query string into single-valued parameters.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut query = HashMap::new();
    for (name, value) in form_urlencoded::parse(raw.as_bytes()) {
        query
            .entry(name.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_edge_request_from_http() {
        let req = Request::builder()
            .uri("/.well-known/webfinger?resource=acct%3Aalice%40example.com")
            .header("Host", "example.com")
            .body(Body::empty())
            .unwrap();
        let edge = edge_request(&req);
        assert_eq!(edge.host, "example.com");
        assert_eq!(edge.uri, "/.well-known/webfinger");
        assert_eq!(edge.query_param("resource"), "acct:alice@example.com");
    }

    #[test]
    fn test_host_falls_back_to_authority() {
        let req = Request::builder()
            .uri("https://example.com/web?go-get=1")
            .body(Body::empty())
            .unwrap();
        let edge = edge_request(&req);
        assert_eq!(edge.host, "example.com");
        assert_eq!(edge.uri, "/web");
        assert_eq!(edge.query_param("go-get"), "1");
    }

    #[test]
    fn test_missing_host_is_empty() {
        let req = Request::builder().uri("/x").body(Body::empty()).unwrap();
        assert_eq!(edge_request(&req).host, "");
    }

    #[test]
    fn test_parse_query_first_value_wins() {
        let query = parse_query("go-get=1&go-get=0&flag&x=a+b");
        assert_eq!(query["go-get"], "1");
        assert_eq!(query["flag"], "");
        assert_eq!(query["x"], "a b");
    }

    #[test]
    fn test_plus_in_resource_decodes_to_space() {
        let req = Request::builder()
            .uri("/.well-known/webfinger?resource=acct:alice+tag@example.com")
            .header("Host", "example.com")
            .body(Body::empty())
            .unwrap();
        let edge = edge_request(&req);
        assert_eq!(edge.query_param("resource"), "acct:alice tag@example.com");

        let query = parse_query("resource=acct:alice%2Btag@example.com");
        assert_eq!(query["resource"], "acct:alice+tag@example.com");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let mut make = UuidRequestId;
        let req = Request::builder().body(()).unwrap();
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
