use crate::error::Result;
use crate::utils::{canonical_json, current_timestamp, sha256_hex};
use serde::{Deserialize, Serialize};

/// Marker used in place of a signature on a coinbase input, and as the
/// `from_address` of a mining-reward output. Never verified cryptographically.
pub const SYSTEM_MARKER: &str = "system";

/// Sentinel stored as the genesis block's previous hash. Not a real digest;
/// the genesis block is never checked against a predecessor.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Fixed mining reward per block.
pub const MINING_REWARD: f64 = 5.0;

/// One output of a transaction: `value` coins to `to_address`, sent by
/// `from_address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TxOutput {
    value: f64,
    to_address: String,
    from_address: String,
}

impl TxOutput {
    pub fn new(value: f64, to_address: &str, from_address: &str) -> TxOutput {
        TxOutput {
            value,
            to_address: to_address.to_string(),
            from_address: from_address.to_string(),
        }
    }

    /// Build the single output of a mining-reward block.
    pub fn new_reward(value: f64, to_address: &str) -> TxOutput {
        TxOutput::new(value, to_address, SYSTEM_MARKER)
    }

    pub fn get_value(&self) -> f64 {
        self.value
    }

    pub fn get_to_address(&self) -> &str {
        &self.to_address
    }

    pub fn get_from_address(&self) -> &str {
        &self.from_address
    }
}

/// One input of a transaction, referencing the transaction hash of an earlier
/// block and carrying the signature over that reference.
///
/// A coinbase (mining-reward) input has no prior transaction, no public key,
/// and the literal marker `"system"` instead of a signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TxInput {
    previous_tx_hash: Option<String>,
    amount: f64,
    signature: String,
    public_key: Option<String>,
}

impl TxInput {
    pub fn new_coinbase(amount: f64) -> TxInput {
        TxInput {
            previous_tx_hash: None,
            amount,
            signature: SYSTEM_MARKER.to_string(),
            public_key: None,
        }
    }

    pub fn new_signed(
        previous_tx_hash: String,
        amount: f64,
        signature_hex: String,
        public_key_hex: String,
    ) -> TxInput {
        TxInput {
            previous_tx_hash: Some(previous_tx_hash),
            amount,
            signature: signature_hex,
            public_key: Some(public_key_hex),
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.signature == SYSTEM_MARKER
    }

    pub fn get_previous_tx_hash(&self) -> Option<&str> {
        self.previous_tx_hash.as_deref()
    }

    pub fn get_amount(&self) -> f64 {
        self.amount
    }

    pub fn get_signature(&self) -> &str {
        &self.signature
    }

    pub fn get_public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    /// The payload a signed input commits to: the referenced transaction hash
    /// and the spent amount, nothing else.
    pub fn spend_payload(&self) -> SpendPayload<'_> {
        SpendPayload {
            hash: &self.previous_tx_hash,
            n: self.amount,
        }
    }
}

/// The payload covered by an input signature: `{hash, n}` canonically
/// serialized and hashed. Signatures cover this digest's hex string, not the
/// full transaction.
#[derive(Debug, Serialize)]
pub struct SpendPayload<'a> {
    pub hash: &'a Option<String>,
    pub n: f64,
}

impl SpendPayload<'_> {
    pub fn digest(&self) -> Result<String> {
        Ok(sha256_hex(canonical_json(self)?.as_bytes()))
    }
}

/// Exactly one transaction per block; its hash commits to the input and
/// output sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    hash: Option<String>,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
}

/// What the transaction hash covers. Kept as a separate shape so the hash
/// field itself never feeds its own digest.
#[derive(Serialize)]
struct TransactionBody<'a> {
    inputs: &'a [TxInput],
    outputs: &'a [TxOutput],
}

impl Transaction {
    /// The genesis block's empty transaction.
    pub fn empty() -> Transaction {
        Transaction {
            hash: None,
            inputs: vec![],
            outputs: vec![],
        }
    }

    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Result<Transaction> {
        let body = TransactionBody {
            inputs: &inputs,
            outputs: &outputs,
        };
        let hash = sha256_hex(canonical_json(&body)?.as_bytes());
        Ok(Transaction {
            hash: Some(hash),
            inputs,
            outputs,
        })
    }

    pub fn get_hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn get_inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn get_outputs(&self) -> &[TxOutput] {
        &self.outputs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct BlockHeader {
    previous_hash: String,
    merkle_root: Option<String>,
    timestamp: f64,
}

/// Atomic ledger entry: one transaction plus a header linking it to its
/// predecessor and committing to the whole prior chain via a merkle root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    index: u64,
    header: BlockHeader,
    transaction: Transaction,
}

impl Block {
    /// Index 0 with the sentinel previous hash and an empty transaction.
    pub fn genesis() -> Result<Block> {
        Ok(Block {
            index: 0,
            header: BlockHeader {
                previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
                merkle_root: None,
                timestamp: current_timestamp()?,
            },
            transaction: Transaction::empty(),
        })
    }

    pub fn new_block(
        index: u64,
        previous_hash: String,
        merkle_root: Option<String>,
        transaction: Transaction,
    ) -> Result<Block> {
        Ok(Block {
            index,
            header: BlockHeader {
                previous_hash,
                merkle_root,
                timestamp: current_timestamp()?,
            },
            transaction,
        })
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_previous_hash(&self) -> &str {
        &self.header.previous_hash
    }

    pub fn get_merkle_root(&self) -> Option<&str> {
        self.header.merkle_root.as_deref()
    }

    pub fn get_timestamp(&self) -> f64 {
        self.header.timestamp
    }

    pub fn get_transaction(&self) -> &Transaction {
        &self.transaction
    }

    #[cfg(test)]
    pub fn set_previous_hash_for_test(&mut self, previous_hash: &str) {
        self.header.previous_hash = previous_hash.to_string();
    }

    #[cfg(test)]
    pub fn tamper_first_output_value_for_test(&mut self, value: f64) {
        self.transaction.outputs[0].value = value;
    }

    #[cfg(test)]
    pub fn tamper_first_input_signature_for_test(&mut self, signature: &str) {
        self.transaction.inputs[0].signature = signature.to_string();
    }
}
