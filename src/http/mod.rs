//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! serve mode:
//!     TCP connection
//!         → server.rs (Axum setup, middleware)
//!         → request.rs (request ID, extract host/path/query)
//!         → routing::SiteRouter
//!         → response.rs (Outcome → HTTP response)
//!           or pass-through → static files
//!
//! edge-function mode:
//!     viewer-request event JSON
//!         → edge.rs (decode event)
//!         → routing::SiteRouter
//!         → edge.rs (response object, or the original request)
//! ```

pub mod edge;
pub mod request;
pub mod response;
pub mod server;

pub use edge::{handle_event, EdgeResponse, EdgeResult, EventError};
pub use request::{edge_request, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
