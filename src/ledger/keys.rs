//! Seed decoding and key/address derivation.
//!
//! Only the Ed25519 key family is supported. Seeds of the secp256k1 family
//! decode fine but are refused when a keypair is requested.
//!
//! # Derivation
//! ```text
//! "sEd..." ──base58check──▶ [01 E1 4B] ‖ entropy(16)
//! entropy ──SHA-512, first 32 bytes──▶ Ed25519 secret
//! ED ‖ public(32) ──SHA-256 → RIPEMD-160──▶ account ID (20)
//! 00 ‖ account ID ──base58check──▶ "r..." address
//! ```

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

use crate::ledger::types::{LedgerError, LedgerResult};

const ED25519_SEED_PREFIX: [u8; 3] = [0x01, 0xE1, 0x4B];
const SECP256K1_SEED_PREFIX: [u8; 1] = [0x21];
const ACCOUNT_ID_PREFIX: u8 = 0x00;
const ED25519_KEY_PREFIX: u8 = 0xED;

/// Key family a seed belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Ed25519,
    Secp256k1,
}

/// 16 bytes of seed entropy plus the key family it was encoded for.
#[derive(Clone)]
pub struct Seed {
    entropy: [u8; 16],
    key_type: KeyType,
}

impl Seed {
    /// Decode a Base58 family seed (`s...`).
    ///
    /// Errors never include the input, since it is a secret.
    pub fn from_base58(secret: &str) -> LedgerResult<Self> {
        let payload = decode_check(secret)
            .map_err(|e| LedgerError::Key(format!("malformed secret: {}", e)))?;

        let (key_type, entropy) = if let Some(rest) = payload.strip_prefix(&ED25519_SEED_PREFIX) {
            (KeyType::Ed25519, rest)
        } else if let Some(rest) = payload.strip_prefix(&SECP256K1_SEED_PREFIX) {
            (KeyType::Secp256k1, rest)
        } else {
            return Err(LedgerError::Key("malformed secret: unknown seed prefix".into()));
        };

        let entropy: [u8; 16] = entropy.try_into().map_err(|_| {
            LedgerError::Key(format!(
                "malformed secret: expected 16 bytes of entropy, got {}",
                entropy.len()
            ))
        })?;

        Ok(Self { entropy, key_type })
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Encode back to the `s...` form.
    pub fn to_base58(&self) -> String {
        let prefix: &[u8] = match self.key_type {
            KeyType::Ed25519 => &ED25519_SEED_PREFIX,
            KeyType::Secp256k1 => &SECP256K1_SEED_PREFIX,
        };
        encode_check(prefix, &self.entropy)
    }

    /// Derive the account keypair.
    pub fn derive_keypair(&self) -> LedgerResult<KeyPair> {
        match self.key_type {
            KeyType::Ed25519 => {
                let digest = Sha512::digest(self.entropy);
                let mut secret = [0u8; 32];
                secret.copy_from_slice(&digest[..32]);
                Ok(KeyPair {
                    signing_key: SigningKey::from_bytes(&secret),
                })
            }
            KeyType::Secp256k1 => Err(LedgerError::Key(
                "unsupported key type: secp256k1 seeds are not supported".into(),
            )),
        }
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}

/// Ed25519 keypair of an account.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }

    /// Sign raw bytes. Ed25519 signs the message itself, not a digest.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Public key in ledger form: `0xED` followed by the 32-byte Ed25519 key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = ED25519_KEY_PREFIX;
        out[1..].copy_from_slice(self.0.as_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.to_bytes())
    }

    pub fn account_id(&self) -> AccountId {
        let sha = Sha256::digest(self.to_bytes());
        let ripe = Ripemd160::digest(sha);
        let mut id = [0u8; 20];
        id.copy_from_slice(&ripe);
        AccountId(id)
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(&bytes);
        self.0.verify(message, &signature).is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

/// 20-byte account identifier. Displays as a classic `r...` address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    pub fn to_address(&self) -> String {
        encode_check(&[ACCOUNT_ID_PREFIX], &self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_address())
    }
}

impl FromStr for AccountId {
    type Err = LedgerError;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let payload = decode_check(address)
            .map_err(|e| LedgerError::Key(format!("invalid address '{}': {}", address, e)))?;
        match payload.split_first() {
            Some((&ACCOUNT_ID_PREFIX, id)) if id.len() == 20 => {
                let mut out = [0u8; 20];
                out.copy_from_slice(id);
                Ok(AccountId(out))
            }
            _ => Err(LedgerError::Key(format!(
                "invalid address '{}': not a classic address",
                address
            ))),
        }
    }
}

fn checksum(payload: &[u8]) -> [u8; 4] {
    let twice = Sha256::digest(Sha256::digest(payload));
    [twice[0], twice[1], twice[2], twice[3]]
}

fn encode_check(prefix: &[u8], body: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(prefix.len() + body.len() + 4);
    bytes.extend_from_slice(prefix);
    bytes.extend_from_slice(body);
    let sum = checksum(&bytes);
    bytes.extend_from_slice(&sum);
    bs58::encode(bytes)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

/// Decode Base58Check with the ledger alphabet; returns the payload
/// without the checksum.
fn decode_check(encoded: &str) -> Result<Vec<u8>, &'static str> {
    let mut bytes = bs58::decode(encoded)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|_| "invalid base58 encoding")?;
    if bytes.len() < 5 {
        return Err("too short");
    }
    let sum = bytes.split_off(bytes.len() - 4);
    if sum != checksum(&bytes) {
        return Err("checksum mismatch");
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER_SEED: &str = "sEd7HFg4UKpa4UA6CJAxNLZcMF4kYbE";
    const ISSUER_ADDRESS: &str = "rsNnw5i5tbgyjedDRNSmBk2Jw7PHHziPJ5";
    const HOLDER_SEED: &str = "sEdTKevpT15jdZBRgLcT3Ye8rvkrY8P";
    const HOLDER_ADDRESS: &str = "rDirbKUBmzJnqNzFEo9KaqLzpz62B4PmJY";

    fn address_of(seed: &str) -> String {
        Seed::from_base58(seed)
            .unwrap()
            .derive_keypair()
            .unwrap()
            .public_key()
            .account_id()
            .to_address()
    }

    #[test]
    fn test_known_seeds_derive_known_addresses() {
        assert_eq!(address_of(ISSUER_SEED), ISSUER_ADDRESS);
        assert_eq!(address_of(HOLDER_SEED), HOLDER_ADDRESS);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        assert_eq!(address_of(ISSUER_SEED), address_of(ISSUER_SEED));
        assert_ne!(address_of(ISSUER_SEED), address_of(HOLDER_SEED));
    }

    #[test]
    fn test_seed_round_trip() {
        let seed = Seed::from_base58(ISSUER_SEED).unwrap();
        assert_eq!(seed.key_type(), KeyType::Ed25519);
        assert_eq!(seed.to_base58(), ISSUER_SEED);
    }

    #[test]
    fn test_public_key_has_ed_prefix() {
        let kp = Seed::from_base58(ISSUER_SEED).unwrap().derive_keypair().unwrap();
        let hex = kp.public_key().to_hex();
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("ED"));
    }

    #[test]
    fn test_corrupted_seed_fails_checksum() {
        // Swap the last character for another alphabet member.
        let mut corrupted = ISSUER_SEED[..ISSUER_SEED.len() - 1].to_string();
        corrupted.push(if ISSUER_SEED.ends_with('r') { 'p' } else { 'r' });
        let err = Seed::from_base58(&corrupted).unwrap_err();
        assert!(err.to_string().contains("malformed secret"));
    }

    #[test]
    fn test_invalid_alphabet_rejected() {
        // '0' is not part of the ledger alphabet.
        assert!(Seed::from_base58("sEd0000000000000000000000000000").is_err());
        assert!(Seed::from_base58("").is_err());
    }

    #[test]
    fn test_secp256k1_seed_unsupported() {
        let seed = Seed {
            entropy: [7u8; 16],
            key_type: KeyType::Secp256k1,
        };
        let decoded = Seed::from_base58(&seed.to_base58()).unwrap();
        assert_eq!(decoded.key_type(), KeyType::Secp256k1);
        let err = decoded.derive_keypair().unwrap_err();
        assert!(err.to_string().contains("unsupported key type"));
    }

    #[test]
    fn test_address_parse_round_trip() {
        let id: AccountId = ISSUER_ADDRESS.parse().unwrap();
        assert_eq!(id.to_string(), ISSUER_ADDRESS);
        assert!("rNotAnAddress".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_signature_verifies() {
        let kp = Seed::from_base58(HOLDER_SEED).unwrap().derive_keypair().unwrap();
        let sig = kp.sign(b"payload");
        assert_eq!(sig.len(), 64);
        assert!(kp.public_key().verify(b"payload", &sig));
        assert!(!kp.public_key().verify(b"tampered", &sig));
    }
}
