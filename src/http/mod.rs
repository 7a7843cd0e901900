//! HTTP subsystem.
//!
//! Hosts the greeting endpoint. Unrelated to the token demo; runs only
//! under the `serve` command.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum, TraceLayer, TimeoutLayer)
//!     → GET / → "Hello, XRPL World!"
//! ```

pub mod server;

pub use server::{GreetingServer, GREETING};
