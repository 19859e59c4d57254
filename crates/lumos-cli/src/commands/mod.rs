//! Subcommand implementations

pub mod monitor;
pub mod sample;
pub mod script;
pub mod send;
