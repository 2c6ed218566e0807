//! Utility functions and helpers
//!
//! Cryptographic primitives (hashing, secp256k1 sign/verify, encodings) and
//! serialization helpers used throughout the node.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    base58_decode, base58_encode, current_timestamp, new_signing_key, public_key_bytes,
    random_pow_salt, ripemd160_digest, secp256k1_sign, secp256k1_verify, sha256_digest,
    sha256_hex,
};

pub use serialization::{canonical_json, deserialize, serialize};
