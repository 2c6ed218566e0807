//! # Pocketcoin - a minimal single-node peer-to-peer ledger
//!
//! Each node holds a linear chain of blocks, mines new blocks with a simple
//! proof-of-work, derives its wallet balance from the chain, signs transfers
//! with secp256k1 and reconciles with peers by adopting the longest valid
//! chain it can find.
//!
//! ## How the code is organized
//! - `core/`: the ledger engine (blocks, merkle commitment, chain validation,
//!   proof-of-work, account view)
//! - `wallet/`: key pair handling, Bitcoin-style address derivation, signing
//! - `network/`: the node facade, TCP server/client and peer consensus
//! - `storage/`: sled-backed persistence of the chain snapshot and keys
//! - `config/`: environment-backed node configuration
//! - `utils/`: hashing, secp256k1 sign/verify, encodings, serialization
//! - `cli/`: the clap command surface
//!
//! ## Design notes worth remembering
//! - One transaction per block, no mempool. A transfer always carries two
//!   outputs (payment + change), which is what makes balance accounting a
//!   pure sum over outputs.
//! - Every block header commits to the entire prior chain through a merkle
//!   root, not just to its own transaction.
//! - The proof-of-work salt is drawn fresh per attempt and thrown away:
//!   proofs gate mining throughput and are never re-validated.
//! - Consensus trusts any peer's self-reported chain equally, but only ever
//!   adopts a strictly longer chain that passes full validation.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Config, GLOBAL_CONFIG};
pub use core::{
    AccountView, Block, BlockHeader, Blockchain, MerkleTree, SelectedInput, SpendPayload,
    Transaction, TxInput, TxOutput, GENESIS_PREVIOUS_HASH, MINING_REWARD, SYSTEM_MARKER,
};
pub use error::{LedgerError, Result};
pub use network::{
    normalize_peer_addr, send_request, ChainFetcher, MineReceipt, Node, Peers, RemoteChain,
    Request, Response, Server, TcpChainFetcher,
};
pub use storage::{ChainStore, KeyBundle};
pub use utils::{
    base58_decode, base58_encode, canonical_json, current_timestamp, ripemd160_digest,
    secp256k1_sign, secp256k1_verify, sha256_digest, sha256_hex,
};
pub use wallet::{derive_address, validate_address, Wallet, ADDRESS_CHECK_SUM_LEN};
