//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (host, path, query)
//!     → router.rs (ordered rules)
//!         1. host != canonical      → 301 to canonical host
//!         2. /.well-known/webfinger → webfinger.rs lookup (200 JSON / 404)
//!         3. /<module>[/...]        → matcher.rs + gomod.rs (200 page / 302)
//!         4. anything else          → PassThrough
//!
//! Compilation (at startup and on reload):
//!     SiteConfig
//!     → module table keyed by first path segment
//!     → webfinger registry
//!     → Freeze as immutable SiteRouter
//! ```
//!
//! # Design Decisions
//! - Routers compiled once, immutable at runtime
//! - No regex in hot path (one hash lookup per request)
//! - Deterministic: same input always yields the same outcome
//! - First match wins

pub mod gomod;
pub mod matcher;
pub mod router;
pub mod webfinger;

pub use router::{EdgeRequest, Outcome, SiteRouter};
