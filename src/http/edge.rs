//! Edge-function event adapter.
//!
//! Speaks the viewer-request event format of CDN edge functions: the event
//! carries a `request` object whose headers and query parameters are maps of
//! `{"value": ...}` records, and the function returns either a response object
//! or the request object to let the CDN carry on serving.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use crate::routing::{EdgeRequest, Outcome, SiteRouter};

/// Error type for event decoding.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed event: {0}")]
    Shape(String),
}

#[derive(Debug, Deserialize)]
struct EdgeEvent {
    request: Value,
}

#[derive(Debug, Deserialize)]
struct ViewerRequest {
    uri: String,
    #[serde(default)]
    headers: HashMap<String, Field>,
    #[serde(default)]
    querystring: HashMap<String, Field>,
}

/// A `{"value": ...}` record, as used for headers and query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub value: String,
}

impl Field {
    fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

/// Response object returned to the edge runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    pub status_code: u16,
    pub status_description: String,
    pub headers: BTreeMap<String, Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<EdgeBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeBody {
    pub encoding: String,
    pub data: String,
}

/// What the edge function hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EdgeResult {
    Response(EdgeResponse),
    /// The original request, unmodified.
    Request(Value),
}

impl EdgeResponse {
    /// Convert a routed outcome. Returns `None` for pass-through.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        let status = outcome.status()?;
        let content_type = outcome.content_type();
        let mut headers = BTreeMap::new();

        let body = match outcome {
            Outcome::PassThrough => return None,
            Outcome::Redirect { location, .. } => {
                headers.insert("location".to_string(), Field::new(location));
                None
            }
            Outcome::Json { body, .. } | Outcome::Html { body, .. } | Outcome::PlainText { body, .. } => {
                Some(EdgeBody {
                    encoding: "text".to_string(),
                    data: body,
                })
            }
        };
        if let Some(content_type) = content_type {
            headers.insert("content-type".to_string(), Field::new(content_type));
        }

        Some(Self {
            status_code: status.as_u16(),
            status_description: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }

    /// Header value by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|f| f.value.as_str())
    }
}

/// Decode an event and route its request.
pub fn handle_event(router: &SiteRouter, json: &str) -> Result<EdgeResult, EventError> {
    let event: EdgeEvent = serde_json::from_str(json)?;
    let request = edge_request_from_value(&event.request)?;
    let outcome = router.route(&request);

    tracing::debug!(
        host = %request.host,
        uri = %request.uri,
        outcome = outcome.kind(),
        "Routed edge event"
    );

    Ok(match EdgeResponse::from_outcome(outcome) {
        Some(response) => EdgeResult::Response(response),
        None => EdgeResult::Request(event.request),
    })
}

/// Build the router's view of an event `request` object.
pub fn edge_request_from_value(value: &Value) -> Result<EdgeRequest, EventError> {
    if !value.is_object() {
        return Err(EventError::Shape("request must be an object".to_string()));
    }
    let request = ViewerRequest::deserialize(value)?;
    let host = request
        .headers
        .get("host")
        .map(|h| h.value.clone())
        .unwrap_or_default();
    let query = request
        .querystring
        .into_iter()
        .map(|(name, field)| (name, decode_component(&field.value)))
        .collect();

    Ok(EdgeRequest {
        host,
        uri: request.uri,
        query,
    })
}

/// Build a viewer-request event the way the edge runtime delivers one:
/// query values arrive percent-encoded.
pub fn viewer_request_event(host: &str, uri: &str, query: &[(&str, &str)]) -> Value {
    let querystring: serde_json::Map<String, Value> = query
        .iter()
        .map(|(name, value)| {
            let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
            (name.to_string(), serde_json::json!({ "value": encoded }))
        })
        .collect();

    serde_json::json!({
        "version": "1.0",
        "context": { "eventType": "viewer-request" },
        "viewer": { "ip": "127.0.0.1" },
        "request": {
            "method": "GET",
            "uri": uri,
            "headers": { "host": { "value": host } },
            "querystring": querystring,
            "cookies": {},
        },
    })
}

// Values never contain a raw '&', so parsing "v=<raw>" as a form body yields
// exactly one pair whose value is the decoded component.
fn decode_component(raw: &str) -> String {
    form_urlencoded::parse(format!("v={}", raw).as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
