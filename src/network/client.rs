use crate::error::{LedgerError, Result};
use crate::network::message::{Request, Response};
use crate::network::node::{ChainFetcher, RemoteChain};
use std::io::Write;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Transport-level bound on connects, reads and writes. A hanging peer costs
/// at most this much per fetch.
const TCP_TIMEOUT_MS: u64 = 5000;

/// Send one request to a node and read its single reply. One JSON value each
/// way per connection; the write side is shut down so the server sees EOF.
pub fn send_request(addr: &str, request: &Request) -> Result<Response> {
    let socket_addr = addr
        .to_socket_addrs()
        .map_err(|e| LedgerError::PeerUnreachable(format!("{addr}: {e}")))?
        .next()
        .ok_or_else(|| LedgerError::PeerUnreachable(format!("{addr}: no usable address")))?;

    let mut stream = TcpStream::connect_timeout(&socket_addr, Duration::from_millis(TCP_TIMEOUT_MS))
        .map_err(|e| LedgerError::PeerUnreachable(format!("{addr}: {e}")))?;
    stream
        .set_read_timeout(Some(Duration::from_millis(TCP_TIMEOUT_MS)))
        .map_err(|e| LedgerError::Network(format!("Failed to set read timeout: {e}")))?;
    stream
        .set_write_timeout(Some(Duration::from_millis(TCP_TIMEOUT_MS)))
        .map_err(|e| LedgerError::Network(format!("Failed to set write timeout: {e}")))?;

    serde_json::to_writer(&mut stream, request)
        .map_err(|e| LedgerError::Network(format!("Failed to send request to {addr}: {e}")))?;
    stream.flush()?;
    stream
        .shutdown(Shutdown::Write)
        .map_err(|e| LedgerError::Network(format!("Failed to finish request to {addr}: {e}")))?;

    let response = serde_json::from_reader(&stream)
        .map_err(|e| LedgerError::Network(format!("Bad reply from {addr}: {e}")))?;
    Ok(response)
}

/// Production chain fetcher: asks a peer for its chain over the node
/// protocol. Any transport failure or unexpected reply surfaces as an error
/// the consensus loop will skip.
pub struct TcpChainFetcher;

impl ChainFetcher for TcpChainFetcher {
    fn fetch_chain(&self, peer: &str) -> Result<RemoteChain> {
        match send_request(peer, &Request::GetChain)? {
            Response::Chain { chain, length } => Ok(RemoteChain { chain, length }),
            other => Err(LedgerError::PeerUnreachable(format!(
                "unexpected reply from {peer}: {other:?}"
            ))),
        }
    }
}
