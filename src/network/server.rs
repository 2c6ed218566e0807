use crate::error::{LedgerError, Result};
use crate::network::message::{Request, Response};
use crate::network::node::Node;
use log::{error, info};
use std::io::{BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TCP_READ_TIMEOUT_SECS: u64 = 60;
const TCP_WRITE_TIMEOUT_MS: u64 = 5000;

/// The request-serving unit: accepts TCP connections, reads one JSON request
/// per connection and replies with one JSON response. All chain access goes
/// through the shared [`Node`], which enforces the locking discipline.
pub struct Server {
    node: Arc<Node>,
}

impl Server {
    pub fn new(node: Arc<Node>) -> Server {
        Server { node }
    }

    /// Bind and serve forever. Each connection gets its own handler thread;
    /// a failed accept is logged and the loop continues.
    pub fn run(&self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| LedgerError::Network(format!("Failed to bind to {addr}: {e}")))?;
        info!("Node listening on {addr}, wallet address {}", self.node.get_address());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let node = Arc::clone(&self.node);
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(node, stream) {
                            error!("Error handling connection: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }

        Ok(())
    }
}

fn handle_connection(node: Arc<Node>, mut stream: TcpStream) -> Result<()> {
    stream
        .set_read_timeout(Some(Duration::from_secs(TCP_READ_TIMEOUT_SECS)))
        .map_err(|e| LedgerError::Network(format!("Failed to set read timeout: {e}")))?;
    stream
        .set_write_timeout(Some(Duration::from_millis(TCP_WRITE_TIMEOUT_MS)))
        .map_err(|e| LedgerError::Network(format!("Failed to set write timeout: {e}")))?;

    let reader = BufReader::new(stream.try_clone()?);
    let mut requests = serde_json::Deserializer::from_reader(reader).into_iter::<Request>();

    // A request that does not deserialize is malformed: reject it before any
    // state is touched
    let response = match requests.next() {
        Some(Ok(request)) => dispatch(&node, request),
        Some(Err(e)) => Response::Error {
            message: LedgerError::MalformedRequest(e.to_string()).to_string(),
        },
        None => {
            let _ = stream.shutdown(Shutdown::Both);
            return Ok(());
        }
    };

    serde_json::to_writer(&mut stream, &response)
        .map_err(|e| LedgerError::Network(format!("Failed to write response: {e}")))?;
    stream.flush()?;
    let _ = stream.shutdown(Shutdown::Both);
    Ok(())
}

/// Map a request onto the node facade. Every failure becomes an error reply;
/// the connection never takes the process down.
fn dispatch(node: &Node, request: Request) -> Response {
    let result = match request {
        Request::Mine => node.mine().map(|receipt| Response::Mined {
            message: "Mining succeed".to_string(),
            index: receipt.index,
            amount: receipt.amount,
        }),
        Request::NewTransaction { value, address } => node
            .transfer(value, &address)
            .map(|message| Response::Transferred { message }),
        Request::GetBalance => node.balance().map(|balance| Response::Balance { balance }),
        Request::GetChain => {
            let (chain, length) = node.chain_snapshot();
            Ok(Response::Chain { chain, length })
        }
        Request::RegisterPeers { peers } => register_peers(node, peers),
        Request::ResolveConflicts => node.resolve_conflicts().map(|replaced| Response::Resolved {
            message: if replaced {
                "Our chain was replaced".to_string()
            } else {
                "Our chain is authoritative".to_string()
            },
            replaced,
        }),
        Request::GetAddress => Ok(Response::Address {
            address: node.get_address().to_string(),
        }),
        Request::GetPeers => Ok(Response::Peers {
            peers: node.get_peers(),
        }),
    };

    result.unwrap_or_else(|e| Response::Error {
        message: e.to_string(),
    })
}

fn register_peers(node: &Node, peers: Vec<String>) -> Result<Response> {
    if peers.is_empty() {
        return Err(LedgerError::MalformedRequest(
            "please supply a non-empty list of peers".to_string(),
        ));
    }
    node.register_peers(&peers)?;
    Ok(Response::PeersRegistered {
        message: "New peer nodes have been added".to_string(),
        total_peers: node.get_peers(),
    })
}
