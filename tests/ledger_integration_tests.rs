//! Ledger integration tests
//!
//! Exercises the node facade end to end: mining, transfers, balances,
//! persistence and peer consensus, with stubbed chain fetchers instead of a
//! live network.

use pocketcoin::{
    AccountView, Block, Blockchain, ChainFetcher, ChainStore, LedgerError, Node, RemoteChain,
    Result, Transaction, TxInput, Wallet, MINING_REWARD,
};
use std::collections::HashMap;
use std::path::Path;
use tempfile::tempdir;

/// Fetcher for nodes with no reachable peers.
struct NoPeers;

impl ChainFetcher for NoPeers {
    fn fetch_chain(&self, peer: &str) -> Result<RemoteChain> {
        Err(LedgerError::PeerUnreachable(format!("no route to {peer}")))
    }
}

/// Fetcher that replays canned chains per peer address.
struct StubFetcher {
    chains: HashMap<String, Vec<Block>>,
}

impl StubFetcher {
    fn new() -> StubFetcher {
        StubFetcher {
            chains: HashMap::new(),
        }
    }

    fn with_chain(mut self, peer: &str, chain: Vec<Block>) -> StubFetcher {
        self.chains.insert(peer.to_string(), chain);
        self
    }
}

impl ChainFetcher for StubFetcher {
    fn fetch_chain(&self, peer: &str) -> Result<RemoteChain> {
        match self.chains.get(peer) {
            Some(chain) => Ok(RemoteChain {
                length: chain.len(),
                chain: chain.clone(),
            }),
            None => Err(LedgerError::PeerUnreachable(format!("no stub for {peer}"))),
        }
    }
}

fn open_node(path: &Path, fetcher: Box<dyn ChainFetcher>) -> Node {
    let store = ChainStore::open(path).unwrap();
    Node::new(store, fetcher, None).unwrap()
}

#[test]
fn test_fresh_node_starts_at_genesis() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));

    let (chain, length) = node.chain_snapshot();
    assert_eq!(length, 1);
    assert_eq!(chain[0].get_index(), 0);
    assert!(Blockchain::is_valid_chain(&chain));
}

#[test]
fn test_mine_appends_reward_block() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));

    let receipt = node.mine().unwrap();
    assert_eq!(receipt.index, 1);
    assert_eq!(receipt.amount, MINING_REWARD);

    let (chain, length) = node.chain_snapshot();
    assert_eq!(length, 2);
    assert!(Blockchain::is_valid_chain(&chain));
    assert_eq!(node.balance().unwrap(), MINING_REWARD);
}

#[test]
fn test_mine_twice_then_transfer() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));
    let recipient = Wallet::new();

    node.mine().unwrap();
    node.mine().unwrap();
    node.transfer(3.0, recipient.get_address()).unwrap();

    // 5.0 + 5.0 - 3.0
    assert_eq!(node.balance().unwrap(), 7.0);

    // The recipient sees 3.0 on the same chain
    let (chain, length) = node.chain_snapshot();
    assert_eq!(length, 4);
    assert!(Blockchain::is_valid_chain(&chain));
    let recipient_view = AccountView::new(&chain, recipient.get_address());
    assert_eq!(recipient_view.balance(), 3.0);
}

#[test]
fn test_transfer_block_shape() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));
    let recipient = Wallet::new();

    node.mine().unwrap();
    node.transfer(2.5, recipient.get_address()).unwrap();

    let (chain, _) = node.chain_snapshot();
    let transfer = chain.last().unwrap().get_transaction();

    // Signed input referencing the reward block, payment plus change output
    assert_eq!(transfer.get_inputs().len(), 1);
    assert!(!transfer.get_inputs()[0].is_coinbase());
    assert_eq!(
        transfer.get_inputs()[0].get_previous_tx_hash(),
        chain[1].get_transaction().get_hash()
    );
    assert_eq!(transfer.get_outputs().len(), 2);
    assert_eq!(transfer.get_outputs()[0].get_value(), 2.5);
    assert_eq!(transfer.get_outputs()[1].get_value(), 2.5);
    assert_eq!(
        transfer.get_outputs()[1].get_to_address(),
        node.get_address()
    );
}

#[test]
fn test_transfer_insufficient_funds_mutates_nothing() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));
    let recipient = Wallet::new();

    node.mine().unwrap();
    let before = node.chain_snapshot().1;

    match node.transfer(100.0, recipient.get_address()) {
        Err(LedgerError::InsufficientFunds {
            required,
            available,
        }) => {
            assert_eq!(required, 100.0);
            assert_eq!(available, MINING_REWARD);
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }
    assert_eq!(node.chain_snapshot().1, before);
}

#[test]
fn test_transfer_rejects_nonpositive_amounts() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));

    assert!(matches!(
        node.transfer(0.0, "somewhere"),
        Err(LedgerError::MalformedRequest(_))
    ));
    assert!(matches!(
        node.transfer(-1.0, "somewhere"),
        Err(LedgerError::MalformedRequest(_))
    ));
}

#[test]
fn test_chain_and_wallet_survive_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db");

    let address = {
        let node = open_node(&db_path, Box::new(NoPeers));
        node.mine().unwrap();
        node.mine().unwrap();
        node.get_address().to_string()
    };

    let node = open_node(&db_path, Box::new(NoPeers));
    assert_eq!(node.get_address(), address);
    assert_eq!(node.chain_snapshot().1, 3);
    assert_eq!(node.balance().unwrap(), 2.0 * MINING_REWARD);
}

#[test]
fn test_resolve_adopts_strictly_longer_valid_chain() {
    let dir = tempdir().unwrap();

    // A miner builds a three-block chain elsewhere
    let miner = open_node(&dir.path().join("miner"), Box::new(NoPeers));
    miner.mine().unwrap();
    miner.mine().unwrap();
    let (miner_chain, miner_len) = miner.chain_snapshot();

    let fetcher = StubFetcher::new().with_chain("127.0.0.1:9001", miner_chain.clone());
    let node = open_node(&dir.path().join("node"), Box::new(fetcher));
    node.register_peer("http://127.0.0.1:9001").unwrap();

    assert!(node.resolve_conflicts().unwrap());
    let (chain, length) = node.chain_snapshot();
    assert_eq!(length, miner_len);
    assert_eq!(
        chain.last().unwrap().get_transaction().get_hash(),
        miner_chain.last().unwrap().get_transaction().get_hash()
    );

    // The adopted rewards belong to the miner, not to this node
    assert_eq!(node.balance().unwrap(), 0.0);
}

#[test]
fn test_resolve_rejects_longer_invalid_chain() {
    let dir = tempdir().unwrap();

    let miner = open_node(&dir.path().join("miner"), Box::new(NoPeers));
    miner.mine().unwrap();
    miner.mine().unwrap();

    // Extend the miner's chain with a block whose previous-hash link is broken
    let (mut tampered, _) = miner.chain_snapshot();
    let next_index = tampered.last().unwrap().get_index() + 1;
    let bogus = Block::new_block(
        next_index,
        "not-a-real-digest".to_string(),
        None,
        Transaction::empty(),
    )
    .unwrap();
    tampered.push(bogus);
    assert!(!Blockchain::is_valid_chain(&tampered));

    let fetcher = StubFetcher::new().with_chain("127.0.0.1:9001", tampered);
    let node = open_node(&dir.path().join("node"), Box::new(fetcher));
    node.register_peer("127.0.0.1:9001").unwrap();

    assert!(!node.resolve_conflicts().unwrap());
    assert_eq!(node.chain_snapshot().1, 1);
}

#[test]
fn test_resolve_ignores_equal_length_chains() {
    let dir = tempdir().unwrap();

    let other = open_node(&dir.path().join("other"), Box::new(NoPeers));
    let (other_chain, _) = other.chain_snapshot();

    let fetcher = StubFetcher::new().with_chain("127.0.0.1:9001", other_chain);
    let node = open_node(&dir.path().join("node"), Box::new(fetcher));
    node.register_peer("127.0.0.1:9001").unwrap();

    // Both chains are length 1: a tie never replaces
    assert!(!node.resolve_conflicts().unwrap());
}

#[test]
fn test_resolve_skips_unreachable_peers() {
    let dir = tempdir().unwrap();

    let miner = open_node(&dir.path().join("miner"), Box::new(NoPeers));
    miner.mine().unwrap();
    let (miner_chain, _) = miner.chain_snapshot();

    // One dead peer, one live peer with a longer chain
    let fetcher = StubFetcher::new().with_chain("127.0.0.1:9002", miner_chain);
    let node = open_node(&dir.path().join("node"), Box::new(fetcher));
    node.register_peer("127.0.0.1:9001").unwrap();
    node.register_peer("127.0.0.1:9002").unwrap();

    assert!(node.resolve_conflicts().unwrap());
    assert_eq!(node.chain_snapshot().1, 2);
}

#[test]
fn test_tampered_signature_invalidates_transfer_chain() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));
    let recipient = Wallet::new();

    node.mine().unwrap();
    node.transfer(1.0, recipient.get_address()).unwrap();

    let (mut chain, _) = node.chain_snapshot();
    assert!(Blockchain::is_valid_chain(&chain));

    // Rebuild the transfer block with a syntactically valid but wrong
    // signature; the header fields stay untouched so only signature
    // verification can reject it
    let last = chain.last().unwrap().clone();
    let original = &last.get_transaction().get_inputs()[0];
    let forged_input = TxInput::new_signed(
        original.get_previous_tx_hash().unwrap().to_string(),
        original.get_amount(),
        "ab".repeat(64),
        original.get_public_key().unwrap().to_string(),
    );
    let forged_tx = Transaction::new(
        vec![forged_input],
        last.get_transaction().get_outputs().to_vec(),
    )
    .unwrap();
    let forged = Block::new_block(
        last.get_index(),
        last.get_previous_hash().to_string(),
        last.get_merkle_root().map(String::from),
        forged_tx,
    )
    .unwrap();
    let tail = chain.len() - 1;
    chain[tail] = forged;
    assert!(!Blockchain::is_valid_chain(&chain));
}

#[test]
fn test_peer_registration_normalizes_and_deduplicates() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));

    node.register_peer("http://192.168.0.5:5000").unwrap();
    node.register_peer("192.168.0.5:5000").unwrap();
    assert_eq!(node.get_peers(), vec!["192.168.0.5:5000".to_string()]);

    assert!(matches!(
        node.register_peer("http://"),
        Err(LedgerError::MalformedRequest(_))
    ));
}

#[test]
fn test_peer_batch_with_malformed_address_registers_nothing() {
    let dir = tempdir().unwrap();
    let node = open_node(&dir.path().join("db"), Box::new(NoPeers));

    // One bad address anywhere in the batch rejects the whole batch
    let batch = vec![
        "127.0.0.1:5001".to_string(),
        "http://".to_string(),
        "127.0.0.1:5002".to_string(),
    ];
    assert!(matches!(
        node.register_peers(&batch),
        Err(LedgerError::MalformedRequest(_))
    ));
    assert!(node.get_peers().is_empty());
}
