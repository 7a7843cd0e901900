//! Canonical binary serialization of transactions.
//!
//! Covers the field types used by issuance creation, holder authorization
//! and payments. Fields are collected in any order and emitted sorted by
//! (type code, field code), which is the only ordering the ledger accepts.

use sha2::{Digest, Sha512};

use crate::ledger::keys::AccountId;
use crate::ledger::transaction::{Amount, Transaction, TransactionKind, MAX_MPT_AMOUNT};
use crate::ledger::types::{LedgerError, LedgerResult, MptIssuanceId, TxHash};

/// Prefix of the bytes covered by a single signature ("STX\0").
pub const SIGNING_PREFIX: [u8; 4] = [0x53, 0x54, 0x58, 0x00];
/// Prefix hashed together with a signed blob to form its ID ("TXN\0").
pub const TX_ID_PREFIX: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

/// Largest XRP amount in drops (10^17).
pub const MAX_DROPS: u64 = 100_000_000_000_000_000;

const XRP_POSITIVE_BIT: u64 = 0x4000_0000_0000_0000;
const MPT_AMOUNT_LEADING_BYTE: u8 = 0x60;

/// Identifies a field by type code and field code ("nth").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldId {
    pub type_code: u8,
    pub nth: u8,
}

impl FieldId {
    pub const fn new(type_code: u8, nth: u8) -> Self {
        Self { type_code, nth }
    }

    /// Encoded field header (1 to 3 bytes).
    pub fn header(&self) -> Vec<u8> {
        let (t, n) = (self.type_code, self.nth);
        match (t < 16, n < 16) {
            (true, true) => vec![(t << 4) | n],
            (false, true) => vec![n, t],
            (true, false) => vec![t << 4, n],
            (false, false) => vec![0, t, n],
        }
    }
}

pub mod types {
    pub const UINT16: u8 = 1;
    pub const UINT32: u8 = 2;
    pub const UINT64: u8 = 3;
    pub const AMOUNT: u8 = 6;
    pub const BLOB: u8 = 7;
    pub const ACCOUNT_ID: u8 = 8;
    pub const UINT8: u8 = 16;
    pub const HASH192: u8 = 21;
}

pub mod fields {
    use super::{types, FieldId};

    pub const TRANSACTION_TYPE: FieldId = FieldId::new(types::UINT16, 2);
    pub const TRANSFER_FEE: FieldId = FieldId::new(types::UINT16, 4);
    pub const FLAGS: FieldId = FieldId::new(types::UINT32, 2);
    pub const SEQUENCE: FieldId = FieldId::new(types::UINT32, 4);
    pub const MAXIMUM_AMOUNT: FieldId = FieldId::new(types::UINT64, 24);
    pub const AMOUNT: FieldId = FieldId::new(types::AMOUNT, 1);
    pub const FEE: FieldId = FieldId::new(types::AMOUNT, 8);
    pub const SIGNING_PUB_KEY: FieldId = FieldId::new(types::BLOB, 3);
    pub const TXN_SIGNATURE: FieldId = FieldId::new(types::BLOB, 4);
    pub const MPTOKEN_METADATA: FieldId = FieldId::new(types::BLOB, 30);
    pub const ACCOUNT: FieldId = FieldId::new(types::ACCOUNT_ID, 1);
    pub const DESTINATION: FieldId = FieldId::new(types::ACCOUNT_ID, 3);
    pub const ASSET_SCALE: FieldId = FieldId::new(types::UINT8, 5);
    pub const MPTOKEN_ISSUANCE_ID: FieldId = FieldId::new(types::HASH192, 1);
}

/// Transaction type codes.
pub mod tx_types {
    pub const PAYMENT: u16 = 0;
    pub const MPTOKEN_ISSUANCE_CREATE: u16 = 54;
    pub const MPTOKEN_AUTHORIZE: u16 = 57;
}

/// Variable-length prefix for blobs and account IDs.
pub fn encode_length(len: usize) -> LedgerResult<Vec<u8>> {
    match len {
        0..=192 => Ok(vec![len as u8]),
        193..=12480 => {
            let l = len - 193;
            Ok(vec![193 + (l >> 8) as u8, (l & 0xff) as u8])
        }
        12481..=918744 => {
            let l = len - 12481;
            Ok(vec![
                241 + (l >> 16) as u8,
                ((l >> 8) & 0xff) as u8,
                (l & 0xff) as u8,
            ])
        }
        _ => Err(LedgerError::Codec(format!("variable-length field too long: {} bytes", len))),
    }
}

/// Encode an XRP or MPT amount.
pub fn encode_amount(amount: &Amount) -> LedgerResult<Vec<u8>> {
    match amount {
        Amount::Xrp(drops) => {
            if *drops > MAX_DROPS {
                return Err(LedgerError::Codec(format!("{} drops exceeds maximum", drops)));
            }
            Ok((drops | XRP_POSITIVE_BIT).to_be_bytes().to_vec())
        }
        Amount::Mpt(mpt) => {
            if mpt.value > MAX_MPT_AMOUNT {
                return Err(LedgerError::Codec(format!(
                    "MPT amount {} exceeds maximum",
                    mpt.value
                )));
            }
            let mut out = Vec::with_capacity(33);
            out.push(MPT_AMOUNT_LEADING_BYTE);
            out.extend_from_slice(&mpt.value.to_be_bytes());
            out.extend_from_slice(&mpt.issuance_id.0);
            Ok(out)
        }
    }
}

/// Collects encoded fields and emits them in canonical order.
#[derive(Debug, Default)]
pub struct FieldWriter {
    fields: Vec<(FieldId, Vec<u8>)>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, id: FieldId, bytes: Vec<u8>) {
        debug_assert!(
            self.fields.iter().all(|(f, _)| *f != id),
            "field {:?} written twice",
            id
        );
        self.fields.push((id, bytes));
    }

    pub fn uint8(&mut self, id: FieldId, value: u8) {
        self.put(id, vec![value]);
    }

    pub fn uint16(&mut self, id: FieldId, value: u16) {
        self.put(id, value.to_be_bytes().to_vec());
    }

    pub fn uint32(&mut self, id: FieldId, value: u32) {
        self.put(id, value.to_be_bytes().to_vec());
    }

    pub fn uint64(&mut self, id: FieldId, value: u64) {
        self.put(id, value.to_be_bytes().to_vec());
    }

    pub fn hash192(&mut self, id: FieldId, value: &MptIssuanceId) {
        self.put(id, value.0.to_vec());
    }

    pub fn blob(&mut self, id: FieldId, value: &[u8]) -> LedgerResult<()> {
        let mut bytes = encode_length(value.len())?;
        bytes.extend_from_slice(value);
        self.put(id, bytes);
        Ok(())
    }

    pub fn account(&mut self, id: FieldId, value: &AccountId) -> LedgerResult<()> {
        self.blob(id, &value.0)
    }

    pub fn amount(&mut self, id: FieldId, value: &Amount) -> LedgerResult<()> {
        let bytes = encode_amount(value)?;
        self.put(id, bytes);
        Ok(())
    }

    /// Sort and concatenate headers with values.
    pub fn finish(mut self) -> Vec<u8> {
        self.fields.sort_by_key(|(id, _)| *id);
        let mut out = Vec::new();
        for (id, bytes) in self.fields {
            out.extend(id.header());
            out.extend(bytes);
        }
        out
    }
}

/// Serialize a transaction, with the signature when given.
pub fn serialize(tx: &Transaction, signature: Option<&[u8]>) -> LedgerResult<Vec<u8>> {
    let mut w = FieldWriter::new();

    w.uint16(fields::TRANSACTION_TYPE, tx.kind.type_code());
    w.uint32(fields::FLAGS, tx.kind.flags());
    w.uint32(fields::SEQUENCE, tx.sequence);
    w.amount(fields::FEE, &Amount::Xrp(tx.fee_drops))?;
    w.blob(fields::SIGNING_PUB_KEY, &tx.signing_pub_key.to_bytes())?;
    w.account(fields::ACCOUNT, &tx.account)?;

    match &tx.kind {
        TransactionKind::MptIssuanceCreate(create) => {
            if create.transfer_fee > 0 {
                w.uint16(fields::TRANSFER_FEE, create.transfer_fee);
            }
            w.uint8(fields::ASSET_SCALE, create.asset_scale);
            if let Some(max) = create.maximum_amount {
                w.uint64(fields::MAXIMUM_AMOUNT, max);
            }
            if !create.metadata.is_empty() {
                w.blob(fields::MPTOKEN_METADATA, &create.metadata)?;
            }
        }
        TransactionKind::MptAuthorize { issuance_id } => {
            w.hash192(fields::MPTOKEN_ISSUANCE_ID, issuance_id);
        }
        TransactionKind::Payment {
            destination,
            amount,
        } => {
            w.account(fields::DESTINATION, destination)?;
            w.amount(fields::AMOUNT, amount)?;
        }
    }

    if let Some(signature) = signature {
        w.blob(fields::TXN_SIGNATURE, signature)?;
    }

    Ok(w.finish())
}

/// Bytes covered by a single signature.
pub fn encode_for_signing(tx: &Transaction) -> LedgerResult<Vec<u8>> {
    let mut out = SIGNING_PREFIX.to_vec();
    out.extend(serialize(tx, None)?);
    Ok(out)
}

/// Transaction ID of a signed blob.
pub fn transaction_hash(signed_blob: &[u8]) -> TxHash {
    let mut hasher = Sha512::new();
    hasher.update(TX_ID_PREFIX);
    hasher.update(signed_blob);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    TxHash(out)
}
