//! MPT lifecycle demo.
//!
//! # Data Flow
//! ```text
//! DemoConfig
//!     → Wallet::from_secret (issuer, holder)
//!     → stages.rs: create issuance → authorize holder → transfer
//!         each stage: account_info → build → sign → submit → wait_for_validation
//!     → report.rs (engine result, hash, explorer URL)
//! ```
//!
//! Stages run strictly in order; the first failure ends the run.

pub mod report;
pub mod stages;

use std::fmt;

use thiserror::Error;

use crate::ledger::LedgerError;

pub use stages::{DemoOutcome, MptDemo};

/// Step of the demo a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Issuance,
    Authorization,
    Transfer,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Setup => "account setup",
            Stage::Issuance => "MPT issuance",
            Stage::Authorization => "MPT authorization",
            Stage::Transfer => "MPT transfer",
        })
    }
}

/// A demo failure, tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct DemoError {
    pub stage: Stage,
    #[source]
    pub source: LedgerError,
}

impl DemoError {
    /// `map_err` adapter tagging a ledger error with `stage`.
    pub fn at(stage: Stage) -> impl FnOnce(LedgerError) -> DemoError {
        move |source| DemoError { stage, source }
    }
}
