use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "homefav")]
#[command(about = "Inspect and edit saved listing favorites")]
#[command(version)]
pub struct Cli {
    /// Configuration file path (falls back to HOMEFAV_CONFIG_PATH, then config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the storage directory from the configuration
    #[arg(short, long)]
    pub storage_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Plain,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum ViewTarget {
    /// Favorites page layout (grid | table)
    Favorites,
    /// Property catalog layout (grid | map)
    Catalog,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List favorite ids in stored order
    List {
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Check whether an id is a favorite
    Has { id: i64 },

    /// Add the id if absent, remove it if present
    Toggle {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },

    /// Remove every favorite
    Clear,

    /// Print the number of favorites
    Count,

    /// Print the badge text (nothing when the badge is hidden)
    Badge,

    /// View-mode preferences
    View {
        #[command(subcommand)]
        command: ViewCommands,
    },

    /// Dump every stored key with its raw value
    Keys,

    /// Load listing data for the favorites from the backend
    Fetch {
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ViewCommands {
    /// Show the stored view mode
    Get {
        #[arg(value_enum)]
        target: ViewTarget,
    },

    /// Store a view mode
    Set {
        #[arg(value_enum)]
        target: ViewTarget,
        value: String,
    },
}
