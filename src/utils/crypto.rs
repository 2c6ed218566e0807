use data_encoding::HEXLOWER;
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::digest::{Context, SHA256};
use ripemd::{Digest as RipemdDigest, Ripemd160};

use crate::error::{LedgerError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Order of the secp256k1 group, used as the upper bound for the
/// proof-of-work salt.
const SECP256K1_ORDER_HEX: &str =
    "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141";

/// Seconds since the Unix epoch, fractional.
pub fn current_timestamp() -> Result<f64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::Crypto(format!("System time error: {e}")))?;
    Ok(duration.as_secs_f64())
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

/// SHA-256 as a lowercase hex string. Every digest this node stores or
/// compares travels in this form.
pub fn sha256_hex(data: &[u8]) -> String {
    HEXLOWER.encode(sha256_digest(data).as_slice())
}

pub fn ripemd160_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| LedgerError::InvalidAddress(format!("Invalid base58 encoding: {e}")))
}

/// Generate a fresh secp256k1 signing key from the OS RNG.
pub fn new_signing_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

/// Raw verifying-key bytes: SEC1 uncompressed point encoding.
pub fn public_key_bytes(verifying_key: &VerifyingKey) -> Vec<u8> {
    verifying_key.to_encoded_point(false).as_bytes().to_vec()
}

/// Sign a message with secp256k1 ECDSA; returns the 64-byte fixed signature.
pub fn secp256k1_sign(signing_key: &SigningKey, message: &[u8]) -> Vec<u8> {
    let signature: Signature = signing_key.sign(message);
    signature.to_bytes().to_vec()
}

/// Verify a secp256k1 ECDSA signature against SEC1 public key bytes.
/// Undecodable keys or signatures verify as false, not as errors.
pub fn secp256k1_verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}

/// Draw a random 256-bit scalar in [1, secp256k1 order - 1], the per-attempt
/// salt for the proof-of-work search. Rejection sampling over 32 random
/// bytes; the acceptance probability is close to 1.
pub fn random_pow_salt() -> BigUint {
    let order = BigUint::parse_bytes(SECP256K1_ORDER_HEX.as_bytes(), 16)
        .expect("secp256k1 order constant should always parse");
    let one = BigUint::from(1u8);
    let upper = &order - &one;

    let mut rng = rand::thread_rng();
    let mut buf = [0u8; 32];
    loop {
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf);
        if candidate >= one && candidate <= upper {
            return candidate;
        }
    }
}
