//! Data persistence: the chain snapshot and the wallet key bundle.

pub mod chain_store;

pub use chain_store::{ChainStore, KeyBundle};
