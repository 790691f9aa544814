//! Command-line argument parsing for `community-listen`.

use crate::client::POSTS;

/// Usage text printed by `--help`.
pub const USAGE: &str = "\
Usage: community-listen [--endpoint URL] [RESOURCE...]

Listens to change streams and prints each event as a JSON line.

Options:
  -e, --endpoint URL  Service base URL (default: $COMMUNITY_ENDPOINT)
  -V, --version       Print version
  -h, --help          Print this help

Resources default to Posts.
";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Listen on the given resources
    Listen {
        /// Overrides the environment endpoint when set
        endpoint: Option<String>,
        resources: Vec<String>,
    },
    /// Unusable arguments, with a message for the user
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use community_client::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["community-listen".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut endpoint = None;
    let mut resources = Vec::new();

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--endpoint" | "-e" => match args.next() {
                Some(value) => endpoint = Some(value),
                None => return CliCommand::Invalid(format!("{} requires a URL", arg)),
            },
            flag if flag.starts_with('-') => {
                return CliCommand::Invalid(format!("Unknown option: {}", flag));
            }
            resource => resources.push(resource.to_string()),
        }
    }

    if resources.is_empty() {
        resources.push(POSTS.to_string());
    }
    CliCommand::Listen {
        endpoint,
        resources,
    }
}
