use crate::core::SpendPayload;
use crate::error::{LedgerError, Result};
use crate::utils::{
    base58_decode, base58_encode, new_signing_key, public_key_bytes, ripemd160_digest,
    secp256k1_sign, sha256_digest, sha256_hex,
};
use data_encoding::HEXLOWER;
use k256::ecdsa::SigningKey;

const VERSION: u8 = 0x00;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;

/// The node's wallet identity: a secp256k1 key pair plus the address derived
/// from the verifying key. Created once, persisted, never mutated.
pub struct Wallet {
    signing_key: SigningKey,
    public_key: Vec<u8>,
    address: String,
}

impl Wallet {
    /// Generate a fresh key pair and derive its address.
    pub fn new() -> Wallet {
        let signing_key = new_signing_key();
        Self::from_signing_key(signing_key)
    }

    /// Rebuild a wallet from persisted signing-key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8]) -> Result<Wallet> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| LedgerError::Crypto(format!("Invalid stored signing key: {e}")))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Wallet {
        let public_key = public_key_bytes(signing_key.verifying_key());
        let address = derive_address(&public_key);
        Wallet {
            signing_key,
            public_key,
            address,
        }
    }

    pub fn get_address(&self) -> &str {
        &self.address
    }

    pub fn get_public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        HEXLOWER.encode(&self.public_key)
    }

    pub fn signing_key_bytes(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }

    /// Sign a spend payload: the payload is canonically serialized and
    /// hashed, and the signature covers the hex digest's bytes. Returns the
    /// signature hex-encoded, ready to embed in a transaction input.
    pub fn sign_spend(&self, payload: &SpendPayload) -> Result<String> {
        let digest = payload.digest()?;
        let signature = secp256k1_sign(&self.signing_key, digest.as_bytes());
        Ok(HEXLOWER.encode(&signature))
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Bitcoin-style address derivation: SHA-256 of the raw verifying-key bytes,
/// then RIPEMD-160 over the hex digest's UTF-8 encoding, a version prefix
/// byte, a 4-byte double-SHA-256 checksum, Base58. One-way and
/// human-transcribable; never reversed.
pub fn derive_address(public_key: &[u8]) -> String {
    let sha_hex = sha256_hex(public_key);
    let pub_key_hash = ripemd160_digest(sha_hex.as_bytes());

    let mut payload: Vec<u8> = vec![VERSION];
    payload.extend(pub_key_hash.as_slice());
    let checksum = checksum(payload.as_slice());
    payload.extend(checksum.as_slice());
    // version + pub_key_hash + checksum
    base58_encode(payload.as_slice())
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    let first_sha = sha256_digest(payload);
    let second_sha = sha256_digest(first_sha.as_slice());
    second_sha[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

/// Re-derive the checksum from a Base58 address and compare it against the
/// trailing 4 bytes.
pub fn validate_address(address: &str) -> bool {
    let payload = match base58_decode(address) {
        Ok(payload) => payload,
        Err(_) => return false,
    };

    if payload.len() < ADDRESS_CHECK_SUM_LEN + 1 {
        return false;
    }

    let actual_checksum = &payload[payload.len() - ADDRESS_CHECK_SUM_LEN..];
    let versioned_payload = &payload[..payload.len() - ADDRESS_CHECK_SUM_LEN];
    checksum(versioned_payload).as_slice().eq(actual_checksum)
}
