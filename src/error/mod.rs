//! Error handling for the ledger node
//!
//! One enum covers every failure the node can report. The distinction that
//! matters: errors that invalidate a chain (`Validation`) versus errors that
//! are reported to the caller without mutating anything (`InsufficientFunds`,
//! `MalformedRequest`) versus errors that are skipped (`PeerUnreachable`).

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger node operations
#[derive(Debug, Clone)]
pub enum LedgerError {
    /// A chain or a signature failed structural/cryptographic checks.
    /// Fatal to using that chain, never fatal to the process.
    Validation(String),
    /// Coin selection could not reach the requested amount. No state mutated.
    InsufficientFunds { required: f64, available: f64 },
    /// A consensus fetch failed or timed out. Skipped, not escalated.
    PeerUnreachable(String),
    /// A request was missing required fields. Rejected before any mutation.
    MalformedRequest(String),
    /// Cryptographic operation errors
    Crypto(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Database-related errors
    Database(String),
    /// Network communication errors
    Network(String),
    /// Proof-of-work search errors (iteration cap exhausted)
    Mining(String),
    /// File I/O errors
    Io(String),
    /// Invalid address format
    InvalidAddress(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Validation(msg) => write!(f, "Validation failure: {msg}"),
            LedgerError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            LedgerError::PeerUnreachable(msg) => write!(f, "Peer unreachable: {msg}"),
            LedgerError::MalformedRequest(msg) => write!(f, "Malformed request: {msg}"),
            LedgerError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Database(msg) => write!(f, "Database error: {msg}"),
            LedgerError::Network(msg) => write!(f, "Network error: {msg}"),
            LedgerError::Mining(msg) => write!(f, "Mining error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for LedgerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}
