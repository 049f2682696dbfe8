//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::APP_DIR;
use crate::domain::{Budget, Vibe};

/// Weekend Wanderer - AI weekend trip planner
#[derive(Parser)]
#[command(
    name = "ww",
    about = "Plan a weekend trip with Gemini and Google Maps grounding",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute; the TUI opens when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip without the TUI and print the itinerary
    Plan {
        /// Where to go
        destination: String,

        /// Trip vibe (relaxed, adventure, foodie, culture, family)
        #[arg(short, long, default_value = "relaxed")]
        vibe: Vibe,

        /// Budget (budget, moderate, luxury)
        #[arg(short, long, default_value = "moderate")]
        budget: Budget,

        /// Print only; do not add the trip to history
        #[arg(long)]
        no_save: bool,
    },

    /// Manage saved trips
    Trips {
        #[command(subcommand)]
        command: TripsCommand,
    },

    /// Print the effective configuration
    Config,
}

/// Saved trip subcommands
#[derive(Debug, Subcommand)]
pub enum TripsCommand {
    /// List saved trips, newest first
    List {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a saved itinerary
    Show {
        /// Trip ID (or unique prefix)
        id: String,
    },

    /// Delete a saved trip
    Delete {
        /// Trip ID (or unique prefix)
        id: String,
    },
}

/// Output format for listing commands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => {
                debug!("OutputFormat::from_str: matched Text");
                Ok(Self::Text)
            }
            "json" => {
                debug!("OutputFormat::from_str: matched Json");
                Ok(Self::Json)
            }
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Log file location: `{data_local_dir}/weekendwanderer/logs/weekendwanderer.log`
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
        .join(format!("{}.log", APP_DIR));
    debug!(?path, "get_log_path: returning path");
    path
}
