//! Wallet identity: key pair, address derivation and spend signing.

pub mod wallet;

pub use wallet::{derive_address, validate_address, Wallet, ADDRESS_CHECK_SUM_LEN};
