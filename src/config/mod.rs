//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → validation.rs (semantic checks)
//!     → DemoConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults equal to the demo constants
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AccountsConfig, ConfirmationConfig, DemoConfig, IssuanceConfig, LedgerConfig,
    ObservabilityConfig, ServerConfig,
};
