//! XRPL Multi-Purpose Token lifecycle demo.
//!
//! Issues an MPT, authorizes a holder and transfers units to it over the
//! ledger's JSON-RPC interface. Also ships a one-route greeting server.

pub mod config;
pub mod demo;
pub mod http;
pub mod ledger;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::DemoConfig;
pub use demo::MptDemo;
pub use http::GreetingServer;
pub use ledger::{JsonRpcClient, Ledger, Wallet};
pub use lifecycle::Shutdown;
