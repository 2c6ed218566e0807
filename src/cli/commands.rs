use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pocketcoin")]
pub struct Opt {
    /// Address of the node to talk to for client commands
    #[arg(long, global = true)]
    pub node: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a ledger node")]
    StartNode {
        #[arg(long, help = "Listen address, host:port")]
        bind: Option<String>,
        #[arg(long, help = "Directory for the chain snapshot and key material")]
        data_dir: Option<String>,
    },
    #[command(name = "mine", about = "Mine a new block on the node")]
    Mine,
    #[command(name = "send", about = "Transfer coins to another address")]
    Send {
        #[arg(help = "Amount to transfer")]
        amount: f64,
        #[arg(help = "Destination wallet address")]
        address: String,
    },
    #[command(name = "getbalance", about = "Get the wallet balance of the node")]
    GetBalance,
    #[command(name = "printchain", about = "Print all blocks in the chain")]
    Printchain,
    #[command(name = "registerpeers", about = "Register peer nodes for consensus")]
    RegisterPeers {
        #[arg(help = "Peer addresses, host:port or http://host:port", required = true)]
        peers: Vec<String>,
    },
    #[command(name = "resolve", about = "Run longest-valid-chain conflict resolution")]
    Resolve,
    #[command(name = "getaddress", about = "Print the node's wallet address")]
    GetAddress,
    #[command(name = "listpeers", about = "Print the registered peer set")]
    ListPeers,
}
