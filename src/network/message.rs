use crate::core::Block;
use serde::{Deserialize, Serialize};

/// Requests accepted by the node over TCP, one JSON value per connection.
/// A request that fails to deserialize is answered with an error and never
/// touches the chain.
#[derive(Debug, Serialize, Deserialize)]
pub enum Request {
    Mine,
    NewTransaction { value: f64, address: String },
    GetBalance,
    GetChain,
    RegisterPeers { peers: Vec<String> },
    ResolveConflicts,
    GetAddress,
    GetPeers,
}

/// Replies, one JSON value per connection. `Chain` doubles as the consensus
/// fetch format peers exchange.
#[derive(Debug, Serialize, Deserialize)]
pub enum Response {
    Mined {
        message: String,
        index: u64,
        amount: f64,
    },
    Transferred {
        message: String,
    },
    Balance {
        balance: f64,
    },
    Chain {
        chain: Vec<Block>,
        length: usize,
    },
    PeersRegistered {
        message: String,
        total_peers: Vec<String>,
    },
    Resolved {
        message: String,
        replaced: bool,
    },
    Address {
        address: String,
    },
    Peers {
        peers: Vec<String>,
    },
    Error {
        message: String,
    },
}
