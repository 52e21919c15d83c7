//! CLI argument definitions using clap
//!
//! Commands:
//! - schemaguard check --schema <path> [--input <path|->]
//! - schemaguard verify --config <path> --token <token> [--identity-schema <path>]
//! - schemaguard schemas --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// schemaguard - validate JSON payloads and bearer tokens
#[derive(Parser, Debug)]
#[command(name = "schemaguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a JSON document against a schema file
    Check {
        /// Path to the schema file
        #[arg(long)]
        schema: PathBuf,

        /// Path to the input document, or "-" for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,
    },

    /// Verify a bearer token and print the identity it carries
    Verify {
        /// Path to configuration file
        #[arg(long, default_value = "./schemaguard.json")]
        config: PathBuf,

        /// Raw token (without the "Bearer " prefix)
        #[arg(long)]
        token: String,

        /// Schema file the token payload must satisfy
        #[arg(long)]
        identity_schema: Option<PathBuf>,
    },

    /// Load every schema in the configured directory and list them
    Schemas {
        /// Path to configuration file
        #[arg(long, default_value = "./schemaguard.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["schemaguard", "check", "--schema", "user.json"]).unwrap();
        match cli.command {
            Command::Check { schema, input } => {
                assert_eq!(schema, PathBuf::from("user.json"));
                assert_eq!(input, PathBuf::from("-"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verify_args() {
        let cli = Cli::try_parse_from([
            "schemaguard",
            "verify",
            "--token",
            "abc.def.ghi",
            "--identity-schema",
            "identity.json",
        ])
        .unwrap();
        match cli.command {
            Command::Verify {
                config,
                token,
                identity_schema,
            } => {
                assert_eq!(config, PathBuf::from("./schemaguard.json"));
                assert_eq!(token, "abc.def.ghi");
                assert_eq!(identity_schema, Some(PathBuf::from("identity.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_schema() {
        assert!(Cli::try_parse_from(["schemaguard", "check"]).is_err());
    }
}
