// CLI entry point. `startnode` runs the serving unit; every other command is
// a thin client that sends one request to a running node and prints the
// reply, so interactive use and the server never share in-process state.

use clap::Parser;
use log::{error, LevelFilter};
use pocketcoin::{
    send_request, ChainStore, Command, Node, Opt, Request, Response, Server, TcpChainFetcher,
    GLOBAL_CONFIG,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();
    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    // Client commands default to the configured node address
    let target = opt.node.unwrap_or_else(|| GLOBAL_CONFIG.get_node_addr());

    match opt.command {
        Command::StartNode { bind, data_dir } => {
            if let Some(bind) = bind {
                GLOBAL_CONFIG.set_node_addr(bind);
            }
            if let Some(data_dir) = data_dir {
                GLOBAL_CONFIG.set_data_dir(data_dir);
            }

            let store = ChainStore::open(&PathBuf::from(GLOBAL_CONFIG.get_data_dir()))?;
            let node = Node::new(
                store,
                Box::new(TcpChainFetcher),
                GLOBAL_CONFIG.get_pow_nonce_limit(),
            )?;
            println!("Wallet address: {}", node.get_address());

            let server = Server::new(Arc::new(node));
            server.run(&GLOBAL_CONFIG.get_node_addr())?;
        }
        Command::Mine => print_response(send_request(&target, &Request::Mine)?),
        Command::Send { amount, address } => print_response(send_request(
            &target,
            &Request::NewTransaction {
                value: amount,
                address,
            },
        )?),
        Command::GetBalance => print_response(send_request(&target, &Request::GetBalance)?),
        Command::Printchain => print_response(send_request(&target, &Request::GetChain)?),
        Command::RegisterPeers { peers } => {
            print_response(send_request(&target, &Request::RegisterPeers { peers })?)
        }
        Command::Resolve => print_response(send_request(&target, &Request::ResolveConflicts)?),
        Command::GetAddress => print_response(send_request(&target, &Request::GetAddress)?),
        Command::ListPeers => print_response(send_request(&target, &Request::GetPeers)?),
    }
    Ok(())
}

fn print_response(response: Response) {
    match response {
        Response::Mined {
            message,
            index,
            amount,
        } => println!("{message}: block {index}, reward {amount}"),
        Response::Transferred { message } => println!("{message}"),
        Response::Balance { balance } => println!("My balance is {balance} coins"),
        Response::Chain { chain, length } => {
            println!("Chain length: {length}");
            match serde_json::to_string_pretty(&chain) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("(unprintable chain: {e})"),
            }
        }
        Response::PeersRegistered {
            message,
            total_peers,
        } => println!("{message}: {total_peers:?}"),
        Response::Resolved { message, .. } => println!("{message}"),
        Response::Address { address } => println!("My wallet address is {address}"),
        Response::Peers { peers } => println!("My peers are {peers:?}"),
        Response::Error { message } => println!("Error: {message}"),
    }
}
