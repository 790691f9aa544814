//! CLI module for the `community-listen` binary.
//!
//! ```ignore
//! use community_client::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Version => println!("{}", VERSION),
//!     CliCommand::Help => print!("{}", USAGE),
//!     CliCommand::Listen { endpoint, resources } => { /* ... */ }
//!     CliCommand::Invalid(msg) => eprintln!("{}", msg),
//! }
//! ```

pub mod args;

pub use args::{parse_args, CliCommand, USAGE};

/// Crate version, printed by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
