//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Transaction submitted:
//!     → ledger::transaction::wait_for_validation polls `tx`
//!     → backoff.rs spaces the polls (exponential, jittered, capped)
//!     → bounded attempts; exhaustion is a confirmation timeout
//! ```
//!
//! # Design Decisions
//! - Every ledger call has a deadline (see ledger::client)
//! - Submissions are never retried; only read-only lookups are repeated

pub mod backoff;
