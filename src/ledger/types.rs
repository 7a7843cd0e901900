//! Ledger-facing types and error definitions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport-level failure talking to the node.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with an error status.
    #[error("Node returned {error}: {message}")]
    Node { error: String, message: String },

    /// The node's answer did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Malformed seed, key or address.
    #[error("Key error: {0}")]
    Key(String),

    /// A transaction field could not be encoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Validated transaction carried no metadata.
    #[error("Transaction metadata not found for {0}")]
    MissingMetadata(TxHash),

    /// Issuance transaction metadata had no issuance identifier.
    #[error("Transaction metadata did not contain issuance ID for {0}")]
    MissingIssuanceId(TxHash),

    /// Transaction was rejected at submission or failed once validated.
    #[error("Transaction {hash} failed with {result}")]
    Rejected { hash: TxHash, result: String },

    /// Transaction was not validated within the polling budget.
    #[error("Transaction {0} not validated after {1} attempts")]
    ConfirmationTimeout(TxHash, u32),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// 32-byte transaction hash, displayed as uppercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl FromStr for TxHash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s)
            .map(Self)
            .map_err(|e| LedgerError::InvalidResponse(format!("bad transaction hash '{}': {}", s, e)))
    }
}

/// 24-byte identifier of an MPT issuance, assigned by the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MptIssuanceId(pub [u8; 24]);

impl fmt::Display for MptIssuanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for MptIssuanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MptIssuanceId({})", self)
    }
}

impl FromStr for MptIssuanceId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<24>(s)
            .map(Self)
            .map_err(|e| LedgerError::InvalidResponse(format!("bad issuance ID '{}': {}", s, e)))
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(s).map_err(|e| e.to_string())?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("expected {} bytes, got {}", N, b.len()))
}

/// Engine result code returned by the node (e.g. `tesSUCCESS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResult(pub String);

/// Result class, taken from the three-letter code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    /// `tes`: applied successfully.
    Success,
    /// `tec`: applied, fee claimed, intent failed.
    Claimed,
    /// `ter`: may succeed later (e.g. queued).
    Retry,
    /// `tel`: local node rejected, not relayed.
    Local,
    /// `tem`: malformed, can never succeed.
    Malformed,
    /// `tef`: failed before being applied.
    Failure,
    Unknown,
}

impl EngineResult {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn class(&self) -> ResultClass {
        match self.0.get(..3) {
            Some("tes") => ResultClass::Success,
            Some("tec") => ResultClass::Claimed,
            Some("ter") => ResultClass::Retry,
            Some("tel") => ResultClass::Local,
            Some("tem") => ResultClass::Malformed,
            Some("tef") => ResultClass::Failure,
            _ => ResultClass::Unknown,
        }
    }

    pub fn is_success(&self) -> bool {
        self.class() == ResultClass::Success
    }

    /// Whether the transaction can still end up in a validated ledger.
    pub fn may_validate(&self) -> bool {
        matches!(
            self.class(),
            ResultClass::Success | ResultClass::Claimed | ResultClass::Retry
        )
    }
}

impl fmt::Display for EngineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subset of `account_info` the demo needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    /// Next sequence number to use.
    pub sequence: u32,
    /// XRP balance in drops.
    pub balance_drops: u64,
}

/// Outcome of a `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub engine_result: EngineResult,
    pub engine_result_message: String,
    pub hash: Option<TxHash>,
}

/// Outcome of a `tx` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// The node does not know the transaction (yet).
    NotFound,
    /// Known but not in a validated ledger.
    Pending,
    /// In a validated ledger.
    Validated(TransactionMeta),
}

/// Fields of transaction metadata the demo reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionMeta {
    /// Final result (`meta.TransactionResult`), absent when metadata is missing.
    pub result: Option<EngineResult>,
    /// `meta.mpt_issuance_id`, present for successful issuance creation.
    pub mpt_issuance_id: Option<MptIssuanceId>,
}
