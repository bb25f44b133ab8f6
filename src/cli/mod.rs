//! CLI module for Docent.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Docent - grounded answers over documents and videos
///
/// Ask questions about contracts and YouTube videos, answered strictly from
/// their content, and get structured risk reviews of agreements.
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DOCENT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a question about a PDF or text file
    Ask {
        /// Path to a .pdf or .txt file
        file: String,

        /// The question to ask
        question: String,
    },

    /// Produce a risk report for a PDF or text file
    Risk {
        /// Path to a .pdf or .txt file
        file: String,

        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },

    /// Ask a question about a YouTube video
    Video {
        /// YouTube URL or video ID
        video: String,

        /// The question to ask
        question: String,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["docent", "ask", "lease.pdf", "How much is the rent?"]).unwrap();
        match cli.command {
            Commands::Ask { file, question } => {
                assert_eq!(file, "lease.pdf");
                assert_eq!(question, "How much is the rent?");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["docent", "-vv", "serve", "--port", "9000"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Serve { host: None, port: Some(9000) }));
    }
}
