//! Core ledger engine
//!
//! The block/transaction data model, the merkle commitment over block
//! sequences, the chain itself (proof-of-work and validation) and the
//! per-address account view.

pub mod account;
pub mod block;
pub mod blockchain;
pub mod merkle;

pub use account::{AccountView, SelectedInput};
pub use block::{
    Block, BlockHeader, SpendPayload, Transaction, TxInput, TxOutput, GENESIS_PREVIOUS_HASH,
    MINING_REWARD, SYSTEM_MARKER,
};
pub use blockchain::Blockchain;
pub use merkle::{MerkleNode, MerkleTree};
