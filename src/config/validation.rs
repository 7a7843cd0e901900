//! Configuration validation.
//!
//! Serde handles syntax; this module checks values the ledger would reject
//! anyway, so a bad config fails before any transaction is submitted.
//! All problems are reported together, not just the first.

use crate::config::schema::DemoConfig;
use crate::ledger::keys::Seed;
use crate::ledger::transaction::{
    parse_mpt_value, MAX_MPT_AMOUNT, MAX_METADATA_LEN, MAX_TRANSFER_FEE,
};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut push = |field: &'static str, message: String| {
        errors.push(ValidationError { field, message });
    };

    for (field, value) in [
        ("ledger.rpc_url", &config.ledger.rpc_url),
        ("ledger.explorer_url", &config.ledger.explorer_url),
    ] {
        if let Err(e) = url::Url::parse(value) {
            push(field, format!("invalid URL '{}': {}", value, e));
        }
    }

    if config.ledger.rpc_timeout_secs == 0 {
        push("ledger.rpc_timeout_secs", "must be greater than zero".to_string());
    }

    if config.ledger.fee_drops == 0 {
        push("ledger.fee_drops", "must be greater than zero".to_string());
    }

    for (field, secret) in [
        ("accounts.issuer_secret", &config.accounts.issuer_secret),
        ("accounts.recipient_secret", &config.accounts.recipient_secret),
    ] {
        // Never echo the secret itself.
        if let Err(e) = Seed::from_base58(secret) {
            push(field, e.to_string());
        }
    }

    let issuance = &config.issuance;
    if issuance.transfer_fee > MAX_TRANSFER_FEE {
        push(
            "issuance.transfer_fee",
            format!("{} exceeds maximum {}", issuance.transfer_fee, MAX_TRANSFER_FEE),
        );
    }
    if issuance.maximum_amount == 0 || issuance.maximum_amount > MAX_MPT_AMOUNT {
        push(
            "issuance.maximum_amount",
            format!("must be between 1 and {}", MAX_MPT_AMOUNT),
        );
    }
    if issuance.metadata.len() > MAX_METADATA_LEN {
        push(
            "issuance.metadata",
            format!("{} bytes exceeds maximum {}", issuance.metadata.len(), MAX_METADATA_LEN),
        );
    }
    match parse_mpt_value(&issuance.transfer_amount) {
        Ok(0) => push("issuance.transfer_amount", "must be positive".to_string()),
        Ok(amount) if amount > issuance.maximum_amount => push(
            "issuance.transfer_amount",
            format!("{} exceeds maximum_amount {}", amount, issuance.maximum_amount),
        ),
        Ok(_) => {}
        Err(e) => push("issuance.transfer_amount", e.to_string()),
    }

    if config.confirmation.max_attempts == 0 {
        push("confirmation.max_attempts", "must be greater than zero".to_string());
    }
    if config.confirmation.base_delay_ms > config.confirmation.max_delay_ms {
        push(
            "confirmation.base_delay_ms",
            "must not exceed max_delay_ms".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
