//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr (fmt layer, filtered by RUST_LOG or config)
//!     → Metrics endpoint (Prometheus scrape, serve command only)
//! ```
//!
//! # Design Decisions
//! - Console progress output of the demo is plain stdout, separate from logs
//! - Key material never reaches a log field

pub mod logging;
pub mod metrics;
