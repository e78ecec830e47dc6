//! CLI module
//!
//! Command-line interface for aggregating pages from HTTP collections.
//!
//! # Commands
//!
//! - `fetch` - Fetch one (possibly oversized) page and print it
//! - `plan` - Show the sub-requests a page would need, without fetching

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
