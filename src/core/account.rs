use crate::core::Block;
use crate::error::{LedgerError, Result};

/// Read-only view of a chain from one wallet address's perspective: per-block
/// contribution, total balance and coin selection for transfers.
///
/// Balance accounting works purely on outputs. Every transfer carries an
/// explicit change output back to the sender (possibly 0.0), so a block's
/// effect on an address never needs input/output netting.
pub struct AccountView<'a> {
    chain: &'a [Block],
    address: &'a str,
}

/// A block chosen by coin selection, identified by its chain index and
/// transaction hash. The index is the stable lookup key for the caller; the
/// transaction hash is what a spending input will reference.
#[derive(Debug, Clone)]
pub struct SelectedInput {
    index: usize,
    transaction_hash: String,
    contribution: f64,
}

impl SelectedInput {
    pub fn get_index(&self) -> usize {
        self.index
    }

    pub fn get_transaction_hash(&self) -> &str {
        &self.transaction_hash
    }

    pub fn get_contribution(&self) -> f64 {
        self.contribution
    }
}

impl<'a> AccountView<'a> {
    pub fn new(chain: &'a [Block], address: &'a str) -> AccountView<'a> {
        AccountView { chain, address }
    }

    /// How much this block changes the wallet's balance:
    /// - no output targets the address: 0
    /// - a single output targeting the address: a mining reward, count its value
    /// - first output sent by the address: an outgoing transfer, subtract
    ///   everything not addressed back to the wallet (the change output
    ///   returns home and cancels out)
    /// - otherwise: an incoming transfer, count the outputs addressed here
    ///
    /// Assumes the fixed two-output transfer shape (payment + change). A
    /// transaction with several non-self outputs would be misaccounted; that
    /// shape cannot be produced by this node.
    pub fn block_contribution(&self, block: &Block) -> f64 {
        let outputs = block.get_transaction().get_outputs();

        if !outputs
            .iter()
            .any(|output| output.get_to_address() == self.address)
        {
            return 0.0;
        }

        if outputs.len() == 1 {
            // Reward of mining
            return outputs[0].get_value();
        }

        if outputs[0].get_from_address() == self.address {
            // Transfer to others
            -outputs
                .iter()
                .filter(|output| output.get_to_address() != self.address)
                .map(|output| output.get_value())
                .sum::<f64>()
        } else {
            // Transfer to me
            outputs
                .iter()
                .filter(|output| output.get_to_address() == self.address)
                .map(|output| output.get_value())
                .sum()
        }
    }

    /// Spendable balance: the sum of contributions over the whole chain.
    /// Callers reconcile with peers before reading this.
    pub fn balance(&self) -> f64 {
        self.chain
            .iter()
            .map(|block| self.block_contribution(block))
            .sum()
    }

    /// Scan the chain in order, accumulating blocks with non-zero
    /// contribution, and stop as soon as the running total first reaches
    /// `amount`. Outgoing transfers contribute negatively and stay in the
    /// selection; the running total accounts for them.
    ///
    /// Fails with InsufficientFunds, selecting nothing, if the chain is
    /// exhausted first.
    pub fn select_inputs(&self, amount: f64) -> Result<Vec<SelectedInput>> {
        let mut selected = Vec::new();
        let mut total = 0.0;

        for (index, block) in self.chain.iter().enumerate() {
            let before = total;
            let contribution = self.block_contribution(block);
            if contribution != 0.0 {
                total += contribution;
                // Contributing blocks always carry a transaction hash; only
                // the genesis block has none, and it contributes nothing
                if let Some(transaction_hash) = block.get_transaction().get_hash() {
                    selected.push(SelectedInput {
                        index,
                        transaction_hash: transaction_hash.to_string(),
                        contribution,
                    });
                }
            }
            if before < amount && total >= amount {
                return Ok(selected);
            }
        }

        Err(LedgerError::InsufficientFunds {
            required: amount,
            available: total,
        })
    }
}
