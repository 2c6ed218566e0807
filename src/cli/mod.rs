//! Command-line interface
//!
//! The node's command surface: one subcommand starts the serving unit,
//! the rest act as clients talking to a running node over loopback.

pub mod commands;

pub use commands::{Command, Opt};
