//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Base58 seed
//!     → keys.rs (seed decoding, key and address derivation)
//!     → wallet.rs (keypair + account, signing)
//! Transaction record
//!     → codec.rs (canonical binary form, signing data, hash)
//!     → transaction.rs (sign, wait for validation)
//!     → client.rs (JSON-RPC submit / query with timeouts)
//! ```
//!
//! # Security Constraints
//! - Never log seeds or private keys
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod codec;
pub mod keys;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{JsonRpcClient, Ledger};
pub use keys::AccountId;
pub use transaction::{SignedTransaction, Transaction, TransactionKind, TransactionSigner};
pub use types::{LedgerError, LedgerResult, MptIssuanceId, TxHash};
pub use wallet::Wallet;
