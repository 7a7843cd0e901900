//! Account keys and transaction signing.
//!
//! # Security
//! - Seeds are decoded once and dropped; only the derived keypair is kept
//! - Keys and seeds are never logged or serialized

use crate::ledger::keys::{AccountId, KeyPair, PublicKey, Seed};
use crate::ledger::transaction::TransactionSigner;
use crate::ledger::types::LedgerResult;

/// A keypair together with the account it controls.
#[derive(Debug, Clone)]
pub struct Wallet {
    keypair: KeyPair,
    account_id: AccountId,
}

impl Wallet {
    /// Create a wallet from a Base58 family seed (`sEd...`).
    ///
    /// `label` is only used for logging.
    pub fn from_secret(secret: &str, label: &str) -> LedgerResult<Self> {
        let keypair = Seed::from_base58(secret)?.derive_keypair()?;
        let account_id = keypair.public_key().account_id();

        tracing::info!(account = label, address = %account_id, "Wallet initialized");

        Ok(Self {
            keypair,
            account_id,
        })
    }

    /// The account's classic address.
    pub fn address(&self) -> String {
        self.account_id.to_address()
    }
}

impl TransactionSigner for Wallet {
    fn account_id(&self) -> AccountId {
        self.account_id
    }

    fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    fn sign_bytes(&self, signing_data: &[u8]) -> Vec<u8> {
        self.keypair.sign(signing_data)
    }
}
