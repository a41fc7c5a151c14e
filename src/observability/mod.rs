//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing decisions and server lifecycle produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (decision counters, latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stderr)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr so `eval` output on stdout stays machine-readable
//! - Request ID flows through every span in serve mode
//! - Metrics are cheap (atomic increments) and a no-op until a recorder is installed

pub mod logging;
pub mod metrics;
