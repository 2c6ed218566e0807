// The node facade: one wallet, one chain, one peer set. Every operation the
// network layer exposes funnels through here.
//
// Lock discipline: `mutation_lock` serializes the chain-mutating sequence
// (resolve -> read tail -> append -> persist) for mining, transfers and
// consensus. The chain itself sits behind an RwLock so read-only queries and
// peer registration keep working while a proof-of-work search runs; the
// search holds only the mutation lock, never the chain lock.

use crate::core::{
    AccountView, Block, Blockchain, MerkleTree, SpendPayload, Transaction, TxInput, TxOutput,
    MINING_REWARD,
};
use crate::error::{LedgerError, Result};
use crate::network::peers::{normalize_peer_addr, Peers};
use crate::storage::{ChainStore, KeyBundle};
use crate::wallet::Wallet;
use log::{info, warn};
use std::sync::{Mutex, RwLock};

/// What a peer reports during a consensus fetch.
pub struct RemoteChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

/// The external "fetch remote chain" capability consensus depends on.
/// Production uses the TCP client; tests inject stubs.
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain(&self, peer: &str) -> Result<RemoteChain>;
}

/// Outcome of a successful mine.
#[derive(Debug, Clone, Copy)]
pub struct MineReceipt {
    pub index: u64,
    pub amount: f64,
}

pub struct Node {
    wallet: Wallet,
    chain: RwLock<Blockchain>,
    mutation_lock: Mutex<()>,
    peers: Peers,
    store: ChainStore,
    fetcher: Box<dyn ChainFetcher>,
    pow_nonce_limit: Option<u64>,
}

impl Node {
    /// Assemble a node from its store: the key bundle and chain snapshot are
    /// loaded when present, generated and persisted on first run.
    pub fn new(
        store: ChainStore,
        fetcher: Box<dyn ChainFetcher>,
        pow_nonce_limit: Option<u64>,
    ) -> Result<Node> {
        let wallet = match store.load_keys()? {
            Some(bundle) => {
                info!("Loaded existing wallet, address {}", bundle.address);
                Wallet::from_signing_key_bytes(&bundle.signing_key)?
            }
            None => {
                let wallet = Wallet::new();
                store.save_keys(&KeyBundle {
                    signing_key: wallet.signing_key_bytes(),
                    public_key: wallet.get_public_key().to_vec(),
                    address: wallet.get_address().to_string(),
                })?;
                info!("Generated new wallet, address {}", wallet.get_address());
                wallet
            }
        };

        let blockchain = match store.load_chain()? {
            Some(blocks) => Blockchain::from_blocks(blocks),
            None => {
                let blockchain = Blockchain::new()?;
                store.save_chain(blockchain.get_blocks())?;
                blockchain
            }
        };

        Ok(Node {
            wallet,
            chain: RwLock::new(blockchain),
            mutation_lock: Mutex::new(()),
            peers: Peers::new(),
            store,
            fetcher,
            pow_nonce_limit,
        })
    }

    pub fn get_address(&self) -> &str {
        self.wallet.get_address()
    }

    pub fn get_peers(&self) -> Vec<String> {
        self.peers.get_peers()
    }

    /// Normalize to host:port and register; duplicates are absorbed.
    pub fn register_peer(&self, addr: &str) -> Result<()> {
        self.register_peers(&[addr.to_string()])
    }

    /// Register a batch of peers. The whole list is normalized up front, so
    /// one malformed address rejects the batch without touching the peer set.
    pub fn register_peers(&self, addrs: &[String]) -> Result<()> {
        let mut normalized = Vec::with_capacity(addrs.len());
        for addr in addrs {
            normalized.push(normalize_peer_addr(addr).ok_or_else(|| {
                LedgerError::MalformedRequest(format!("unusable peer address: {addr:?}"))
            })?);
        }
        for peer in normalized {
            self.peers.add_peer(peer);
        }
        Ok(())
    }

    /// A point-in-time copy of the chain and its length. Safe to call while a
    /// mine is in flight.
    pub fn chain_snapshot(&self) -> (Vec<Block>, usize) {
        let chain = self
            .chain
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen");
        (chain.get_blocks().to_vec(), chain.len())
    }

    /// Reconcile with peers, then sum the wallet's contributions over the
    /// whole chain.
    pub fn balance(&self) -> Result<f64> {
        {
            let _guard = self.lock_mutations();
            self.resolve_inner()?;
        }
        let chain = self
            .chain
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen");
        Ok(AccountView::new(chain.get_blocks(), self.wallet.get_address()).balance())
    }

    /// Full mine-append-persist sequence. Runs consensus first, validates the
    /// local chain, performs the proof-of-work search and appends a reward
    /// block paying this wallet.
    pub fn mine(&self) -> Result<MineReceipt> {
        let _guard = self.lock_mutations();
        self.resolve_inner()?;

        let (index, previous_hash, merkle_root) = self.prospective_header()?;

        // The chain lock is not held during the search; the mutation lock
        // keeps the tail frozen
        let nonce = Blockchain::proof_of_work(self.pow_nonce_limit)?;
        info!("Mined block {index} with nonce {nonce}");

        let transaction = Transaction::new(
            vec![TxInput::new_coinbase(MINING_REWARD)],
            vec![TxOutput::new_reward(MINING_REWARD, self.wallet.get_address())],
        )?;
        let block = Block::new_block(index, previous_hash, merkle_root, transaction)?;

        self.append_and_persist(block)?;
        Ok(MineReceipt {
            index,
            amount: MINING_REWARD,
        })
    }

    /// Construct, sign, append and persist a transfer block: payment to the
    /// recipient plus an explicit change output back to this wallet.
    pub fn transfer(&self, amount: f64, to_address: &str) -> Result<String> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::MalformedRequest(format!(
                "transfer amount must be positive, got {amount}"
            )));
        }

        let _guard = self.lock_mutations();
        self.resolve_inner()?;

        let (index, previous_hash, merkle_root) = self.prospective_header()?;

        let my_address = self.wallet.get_address();
        let (inputs, gathered) = {
            let chain = self
                .chain
                .read()
                .expect("Failed to acquire read lock on chain - this should never happen");
            let blocks = chain.get_blocks();
            let view = AccountView::new(blocks, my_address);

            let available = view.balance();
            if available < amount {
                return Err(LedgerError::InsufficientFunds {
                    required: amount,
                    available,
                });
            }

            self.build_signed_inputs(&view, amount)?
        };

        let change = gathered - amount;
        let outputs = vec![
            TxOutput::new(amount, to_address, my_address),
            // Change may be 0.0 but is always present; balance accounting
            // depends on the two-output shape
            TxOutput::new(change, my_address, my_address),
        ];
        let transaction = Transaction::new(inputs, outputs)?;
        let block = Block::new_block(index, previous_hash, merkle_root, transaction)?;

        self.append_and_persist(block)?;
        info!("Transferred {amount} to {to_address} in block {index}");
        Ok(format!("{amount} coins has been transferred to {to_address}."))
    }

    /// Longest-valid-chain reconciliation against all registered peers.
    /// Returns whether the local chain was replaced.
    pub fn resolve_conflicts(&self) -> Result<bool> {
        let _guard = self.lock_mutations();
        self.resolve_inner()
    }

    fn lock_mutations(&self) -> std::sync::MutexGuard<'_, ()> {
        self.mutation_lock
            .lock()
            .expect("Failed to acquire mutation lock - this should never happen")
    }

    /// Consensus body; caller holds the mutation lock. Unreachable peers are
    /// skipped, never escalated. Ties never replace.
    fn resolve_inner(&self) -> Result<bool> {
        let peers = self.peers.get_peers();
        if peers.is_empty() {
            return Ok(false);
        }

        let mut max_length = self
            .chain
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen")
            .len();
        let mut new_chain: Option<Vec<Block>> = None;

        for peer in peers {
            match self.fetcher.fetch_chain(&peer) {
                Ok(remote) => {
                    if remote.length > max_length && Blockchain::is_valid_chain(&remote.chain) {
                        max_length = remote.length;
                        new_chain = Some(remote.chain);
                    }
                }
                Err(e) => warn!("Skipping peer {peer}: {e}"),
            }
        }

        if let Some(blocks) = new_chain {
            let mut chain = self
                .chain
                .write()
                .expect("Failed to acquire write lock on chain - this should never happen");
            chain.replace(blocks);
            self.store.save_chain(chain.get_blocks())?;
            info!("Local chain replaced by a peer chain of length {max_length}");
            return Ok(true);
        }
        Ok(false)
    }

    /// Read the chain tail and compute the header fields of the next block.
    /// Aborts with a Validation error if the local chain no longer validates;
    /// continuing would produce undefined balances.
    fn prospective_header(&self) -> Result<(u64, String, Option<String>)> {
        let chain = self
            .chain
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen");
        let blocks = chain.get_blocks();

        if !Blockchain::is_valid_chain(blocks) {
            return Err(LedgerError::Validation(
                "local chain failed validation; refusing to extend it".to_string(),
            ));
        }

        let last = chain
            .last_block()
            .ok_or_else(|| LedgerError::Validation("chain has no blocks".to_string()))?;
        let index = last.get_index() + 1;
        let previous_hash = Blockchain::hash_block(last)?;
        let merkle_root = MerkleTree::root_of(blocks)?;
        Ok((index, previous_hash, merkle_root))
    }

    /// Turn a coin selection into signed inputs. Each selected block's
    /// contribution is spent up to the remaining need; the last input may
    /// spend only part of its block's contribution.
    fn build_signed_inputs(
        &self,
        view: &AccountView,
        amount: f64,
    ) -> Result<(Vec<TxInput>, f64)> {
        let selected = view.select_inputs(amount)?;

        let mut inputs = Vec::with_capacity(selected.len());
        let mut gathered = 0.0;
        for selection in &selected {
            let contribution = selection.get_contribution();
            let spend = if gathered + contribution < amount {
                contribution
            } else {
                amount - gathered
            };
            gathered += contribution;

            let previous_tx_hash = Some(selection.get_transaction_hash().to_string());
            let signature = self.wallet.sign_spend(&SpendPayload {
                hash: &previous_tx_hash,
                n: spend,
            })?;
            inputs.push(TxInput::new_signed(
                selection.get_transaction_hash().to_string(),
                spend,
                signature,
                self.wallet.public_key_hex(),
            ));
        }
        Ok((inputs, gathered))
    }

    /// Append under the write lock and persist in the same critical section.
    fn append_and_persist(&self, block: Block) -> Result<()> {
        let mut chain = self
            .chain
            .write()
            .expect("Failed to acquire write lock on chain - this should never happen");
        chain.append(block);
        self.store.save_chain(chain.get_blocks())
    }
}
