//! Configuration schema definitions.
//!
//! Every field has a default equal to the demo's built-in constants, so the
//! program runs against testnet with no config file at all. A TOML file only
//! needs to name the values it overrides.

use serde::{Deserialize, Serialize};

/// Root configuration for the demo.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Ledger endpoint and transaction cost settings.
    pub ledger: LedgerConfig,

    /// Secrets for the two demo accounts.
    pub accounts: AccountsConfig,

    /// Parameters of the token issuance and the transfer.
    pub issuance: IssuanceConfig,

    /// Validation polling after each submission.
    pub confirmation: ConfirmationConfig,

    /// Greeting server settings.
    pub server: ServerConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Ledger endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Explorer base URL; the transaction hash is appended to it.
    pub explorer_url: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Fee paid by every transaction, in drops.
    pub fee_drops: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://s.altnet.rippletest.net:51234/".to_string(),
            explorer_url: "https://testnet.xrpl.org/transactions/".to_string(),
            rpc_timeout_secs: 10,
            fee_drops: 12, // network minimum
        }
    }
}

/// Account secrets (Base58 seeds).
///
/// These are funded testnet accounts; never point them at mainnet.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Seed of the issuing account (rsNnw5i5tbgyjedDRNSmBk2Jw7PHHziPJ5).
    pub issuer_secret: String,

    /// Seed of the holder account (rDirbKUBmzJnqNzFEo9KaqLzpz62B4PmJY).
    pub recipient_secret: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            issuer_secret: "sEd7HFg4UKpa4UA6CJAxNLZcMF4kYbE".to_string(),
            recipient_secret: "sEdTKevpT15jdZBRgLcT3Ye8rvkrY8P".to_string(),
        }
    }
}

impl std::fmt::Debug for AccountsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountsConfig")
            .field("issuer_secret", &"<redacted>")
            .field("recipient_secret", &"<redacted>")
            .finish()
    }
}

/// Token issuance and transfer parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IssuanceConfig {
    /// Transfer fee in units of 0.001% (100 = 0.1%, at most 50000).
    pub transfer_fee: u16,

    /// Number of decimal places the token is displayed with.
    pub asset_scale: u8,

    /// Maximum supply in the token's smallest unit.
    pub maximum_amount: u64,

    /// Free-form metadata, hex-encoded before submission.
    pub metadata: String,

    /// Require the issuer to approve holders. Lock, escrow, trade,
    /// transfer and clawback are always enabled.
    pub require_auth: bool,

    /// Amount moved from issuer to holder, as a decimal integer string.
    pub transfer_amount: String,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            transfer_fee: 100,
            asset_scale: 0,
            maximum_amount: 1000,
            metadata: "test".to_string(),
            require_auth: false,
            transfer_amount: "1".to_string(),
        }
    }
}

/// Polling configuration for transaction validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Maximum number of `tx` lookups before giving up.
    pub max_attempts: u32,

    /// Base delay between lookups in milliseconds (doubles per attempt).
    pub base_delay_ms: u64,

    /// Upper bound on a single delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_ms: 1000,
            max_delay_ms: 5000,
        }
    }
}

/// Greeting server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Expose Prometheus metrics while serving.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "mpt_demo=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
