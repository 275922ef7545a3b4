//! Subcommand implementations.

pub mod catalog;
pub mod orders;
pub mod quote;
