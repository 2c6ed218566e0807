//! Node facade, peer set, TCP server/client and the consensus fetch
//! capability.

pub mod client;
pub mod message;
pub mod node;
pub mod peers;
pub mod server;

pub use client::{send_request, TcpChainFetcher};
pub use message::{Request, Response};
pub use node::{ChainFetcher, MineReceipt, Node, RemoteChain};
pub use peers::{normalize_peer_addr, Peers};
pub use server::Server;
