//! Transaction model, signing interface and validation monitoring.
//!
//! # Responsibilities
//! - Typed records for the three supported transaction types
//! - Signing interface (`TransactionSigner`) over the binary codec
//! - Poll a submitted transaction until it lands in a validated ledger

use crate::config::ConfirmationConfig;
use crate::ledger::client::Ledger;
use crate::ledger::codec::{self, tx_types};
use crate::ledger::keys::{AccountId, PublicKey};
use crate::ledger::types::{
    LedgerError, LedgerResult, MptIssuanceId, TransactionMeta, TransactionStatus, TxHash,
};
use crate::resilience::backoff::Backoff;

/// Largest MPT amount (2^63 - 1).
pub const MAX_MPT_AMOUNT: u64 = 0x7FFF_FFFF_FFFF_FFFF;
/// Largest transfer fee (50%).
pub const MAX_TRANSFER_FEE: u16 = 50_000;
/// Largest issuance metadata in bytes.
pub const MAX_METADATA_LEN: usize = 1024;

/// Capability flags of an MPT issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MptIssuanceCreateFlags(u32);

impl MptIssuanceCreateFlags {
    pub const CAN_LOCK: u32 = 0x0000_0002;
    pub const REQUIRE_AUTH: u32 = 0x0000_0004;
    pub const CAN_ESCROW: u32 = 0x0000_0008;
    pub const CAN_TRADE: u32 = 0x0000_0010;
    pub const CAN_TRANSFER: u32 = 0x0000_0020;
    pub const CAN_CLAWBACK: u32 = 0x0000_0040;

    pub fn empty() -> Self {
        Self(0)
    }

    /// Set `flag` when `enabled` is true.
    pub fn set(self, flag: u32, enabled: bool) -> Self {
        if enabled {
            Self(self.0 | flag)
        } else {
            Self(self.0 & !flag)
        }
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

/// Fields specific to `MPTokenIssuanceCreate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MptIssuanceCreate {
    pub flags: MptIssuanceCreateFlags,
    pub transfer_fee: u16,
    pub asset_scale: u8,
    pub maximum_amount: Option<u64>,
    /// Raw metadata bytes (shown as hex on the ledger).
    pub metadata: Vec<u8>,
}

/// An amount of MPT units for a given issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MptAmount {
    pub issuance_id: MptIssuanceId,
    pub value: u64,
}

/// Parse a decimal integer MPT value. MPT amounts are always whole units
/// of the smallest denomination; surrounding whitespace is ignored.
pub fn parse_mpt_value(value: &str) -> LedgerResult<u64> {
    let parsed: u64 = value
        .trim()
        .parse()
        .map_err(|_| LedgerError::Codec(format!("invalid MPT amount '{}'", value)))?;
    if parsed > MAX_MPT_AMOUNT {
        return Err(LedgerError::Codec(format!("MPT amount {} exceeds maximum", parsed)));
    }
    Ok(parsed)
}

impl MptAmount {
    pub fn parse(issuance_id: MptIssuanceId, value: &str) -> LedgerResult<Self> {
        Ok(Self {
            issuance_id,
            value: parse_mpt_value(value)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// Drops of XRP.
    Xrp(u64),
    Mpt(MptAmount),
}

/// Type-specific part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    MptIssuanceCreate(MptIssuanceCreate),
    /// Holder opts in to an issuance.
    MptAuthorize { issuance_id: MptIssuanceId },
    Payment {
        destination: AccountId,
        amount: Amount,
    },
}

impl TransactionKind {
    pub fn type_code(&self) -> u16 {
        match self {
            TransactionKind::MptIssuanceCreate(_) => tx_types::MPTOKEN_ISSUANCE_CREATE,
            TransactionKind::MptAuthorize { .. } => tx_types::MPTOKEN_AUTHORIZE,
            TransactionKind::Payment { .. } => tx_types::PAYMENT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransactionKind::MptIssuanceCreate(_) => "MPTokenIssuanceCreate",
            TransactionKind::MptAuthorize { .. } => "MPTokenAuthorize",
            TransactionKind::Payment { .. } => "Payment",
        }
    }

    pub fn flags(&self) -> u32 {
        match self {
            TransactionKind::MptIssuanceCreate(create) => create.flags.bits(),
            _ => 0,
        }
    }
}

/// A fully populated, unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub account: AccountId,
    pub fee_drops: u64,
    pub sequence: u32,
    pub signing_pub_key: PublicKey,
    pub kind: TransactionKind,
}

/// A signed transaction ready for submission.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Vec<u8>,
    pub blob: Vec<u8>,
    pub hash: TxHash,
}

impl SignedTransaction {
    /// Hex blob as expected by `submit`.
    pub fn tx_blob(&self) -> String {
        hex::encode_upper(&self.blob)
    }
}

/// Signs transactions for a single account.
pub trait TransactionSigner {
    fn account_id(&self) -> AccountId;

    fn public_key(&self) -> PublicKey;

    /// Signature over the given signing data.
    fn sign_bytes(&self, signing_data: &[u8]) -> Vec<u8>;

    /// Sign `tx`, which must name this signer's account and key.
    fn sign(&self, tx: Transaction) -> LedgerResult<SignedTransaction> {
        if tx.account != self.account_id() || tx.signing_pub_key != self.public_key() {
            return Err(LedgerError::Key(format!(
                "transaction for {} cannot be signed by {}",
                tx.account,
                self.account_id()
            )));
        }
        let signing_data = codec::encode_for_signing(&tx)?;
        let signature = self.sign_bytes(&signing_data);
        let blob = codec::serialize(&tx, Some(&signature))?;
        let hash = codec::transaction_hash(&blob);
        Ok(SignedTransaction {
            transaction: tx,
            signature,
            blob,
            hash,
        })
    }
}

/// Poll `tx` until the transaction is in a validated ledger.
///
/// Delays grow exponentially between `base_delay_ms` and `max_delay_ms`.
/// A validated transaction must carry a `tes*` final result: a missing
/// result is `MissingMetadata`, any other code is `Rejected`.
pub async fn wait_for_validation<L: Ledger + ?Sized>(
    ledger: &L,
    hash: TxHash,
    config: &ConfirmationConfig,
) -> LedgerResult<TransactionMeta> {
    let backoff = Backoff::from_config(config);
    for attempt in 1..=config.max_attempts {
        tokio::time::sleep(backoff.delay(attempt)).await;

        match ledger.transaction(&hash).await? {
            TransactionStatus::Validated(meta) => {
                return match &meta.result {
                    None => Err(LedgerError::MissingMetadata(hash)),
                    Some(result) if !result.is_success() => Err(LedgerError::Rejected {
                        hash,
                        result: result.to_string(),
                    }),
                    Some(_) => {
                        tracing::debug!(tx_hash = %hash, attempt, "Transaction validated");
                        Ok(meta)
                    }
                };
            }
            status => {
                tracing::debug!(
                    tx_hash = %hash,
                    attempt,
                    max_attempts = config.max_attempts,
                    status = ?status,
                    "Waiting for validation"
                );
            }
        }
    }

    Err(LedgerError::ConfirmationTimeout(hash, config.max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_set_and_clear() {
        let flags = MptIssuanceCreateFlags::empty()
            .set(MptIssuanceCreateFlags::CAN_LOCK, true)
            .set(MptIssuanceCreateFlags::CAN_CLAWBACK, true)
            .set(MptIssuanceCreateFlags::REQUIRE_AUTH, false);
        assert_eq!(flags.bits(), 0x42);
        assert!(flags.contains(MptIssuanceCreateFlags::CAN_LOCK));
        assert!(!flags.contains(MptIssuanceCreateFlags::CAN_TRADE));

        let cleared = flags.set(MptIssuanceCreateFlags::CAN_LOCK, false);
        assert_eq!(cleared.bits(), 0x40);
    }

    #[test]
    fn test_mpt_amount_parse() {
        let id = MptIssuanceId([1; 24]);
        assert_eq!(MptAmount::parse(id, "1").unwrap().value, 1);
        assert_eq!(MptAmount::parse(id, " 42 ").unwrap().value, 42);
        assert!(MptAmount::parse(id, "1.5").is_err());
        assert!(MptAmount::parse(id, "-1").is_err());
        assert!(MptAmount::parse(id, "9223372036854775808").is_err());
    }

    #[test]
    fn test_kind_codes() {
        let auth = TransactionKind::MptAuthorize {
            issuance_id: MptIssuanceId([0; 24]),
        };
        assert_eq!(auth.type_code(), 57);
        assert_eq!(auth.name(), "MPTokenAuthorize");
        assert_eq!(auth.flags(), 0);
    }
}
