use crate::core::Block;
use crate::error::{LedgerError, Result};
use crate::utils::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;

const CHAIN_TREE: &str = "chain";
const WALLET_TREE: &str = "wallet";
const SNAPSHOT_KEY: &str = "snapshot";
const KEYS_KEY: &str = "keys";

/// The wallet's persisted key material: written once at first run, reloaded
/// thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct KeyBundle {
    pub signing_key: Vec<u8>,
    pub public_key: Vec<u8>,
    pub address: String,
}

/// Sled-backed persistence: one tree holds the whole-chain snapshot under a
/// fixed key, another the key bundle. No schema versioning; changing the
/// block shape invalidates old snapshots.
pub struct ChainStore {
    db: Db,
}

impl ChainStore {
    pub fn open(path: &Path) -> Result<ChainStore> {
        let db = sled::open(path)
            .map_err(|e| LedgerError::Database(format!("Failed to open database: {e}")))?;
        Ok(ChainStore { db })
    }

    /// Load the chain snapshot, or None on first run.
    pub fn load_chain(&self) -> Result<Option<Vec<Block>>> {
        let tree = self.db.open_tree(CHAIN_TREE)?;
        match tree.get(SNAPSHOT_KEY)? {
            Some(bytes) => Ok(Some(deserialize::<Vec<Block>>(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Write the whole-chain snapshot. Called after every successful append
    /// or replacement, inside the mutation critical section, so memory and
    /// disk never diverge for longer than one mutation.
    pub fn save_chain(&self, chain: &[Block]) -> Result<()> {
        let tree = self.db.open_tree(CHAIN_TREE)?;
        let bytes = serialize(&chain.to_vec())?;
        tree.insert(SNAPSHOT_KEY, bytes)?;
        tree.flush()
            .map_err(|e| LedgerError::Database(format!("Failed to flush chain tree: {e}")))?;
        Ok(())
    }

    pub fn load_keys(&self) -> Result<Option<KeyBundle>> {
        let tree = self.db.open_tree(WALLET_TREE)?;
        match tree.get(KEYS_KEY)? {
            Some(bytes) => Ok(Some(deserialize::<KeyBundle>(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save_keys(&self, bundle: &KeyBundle) -> Result<()> {
        let tree = self.db.open_tree(WALLET_TREE)?;
        tree.insert(KEYS_KEY, serialize(bundle)?)?;
        tree.flush()
            .map_err(|e| LedgerError::Database(format!("Failed to flush wallet tree: {e}")))?;
        Ok(())
    }
}
