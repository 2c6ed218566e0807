//! Configuration management
//!
//! Environment-backed settings for the node: listen address, data directory
//! and the optional proof-of-work nonce cap.

pub mod settings;

pub use settings::{Config, GLOBAL_CONFIG};
