//! Edge request router for a static site: canonical host enforcement,
//! WebFinger discovery and Go vanity import resolution.

pub mod config;
pub mod conformance;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::SiteConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{EdgeRequest, Outcome, SiteRouter};
