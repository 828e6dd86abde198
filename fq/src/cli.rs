//! CLI argument parsing for freshquest

use clap::{Parser, Subcommand, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fq")]
#[command(
    author,
    version,
    about = "Freshman onboarding quest: finish every step to unlock the wheel",
    long_about = None
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Your name, used in fortunes (overrides config)
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show overall progress and the state of every step
    Status {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the steps with their checklists and links
    Steps,

    /// Mark a step done, or not done if it already is
    Done {
        /// Step ID
        #[arg(required = true)]
        id: String,
    },

    /// Check or uncheck one checklist bullet of a step
    Check {
        /// Step ID
        #[arg(required = true)]
        id: String,

        /// Bullet number, starting at 0
        #[arg(required = true)]
        index: u32,
    },

    /// Print the fortunes on the wheel
    Predict {
        /// Number of fortunes (default: from config)
        #[arg(long)]
        count: Option<NonZeroUsize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Spin the wheel (only once every step is done)
    Spin,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_global_name() {
        let cli = Cli::try_parse_from(["fq", "check", "email", "2", "--name", "Alice"]).unwrap();
        assert_eq!(cli.name.as_deref(), Some("Alice"));
        match cli.command {
            Command::Check { id, index } => {
                assert_eq!(id, "email");
                assert_eq!(index, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_predict_json() {
        let cli = Cli::try_parse_from(["fq", "predict", "--count", "4", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Predict {
                count: Some(count),
                format: OutputFormat::Json
            } if count.get() == 4
        ));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(Cli::try_parse_from(["fq", "predict", "--count", "0"]).is_err());
    }

    #[test]
    fn test_negative_index_rejected() {
        assert!(Cli::try_parse_from(["fq", "check", "email", "-1"]).is_err());
    }
}
