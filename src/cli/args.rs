//! CLI argument definitions using clap derive

use crate::asset::AssetType;
use crate::config::Profile;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dandelion - web asset pipeline
///
/// Resolves asset bundles into versioned, merged and minified assets.
#[derive(Parser, Debug)]
#[command(name = "dandelion")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DANDELION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile overriding the configured one
    #[arg(short, long, global = true, env = "DANDELION_PROFILE")]
    pub profile: Option<Profile>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the assets of bundle scopes
    Resolve(ResolveArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// TOML bundle definitions
    #[arg(short, long)]
    pub bundles: PathBuf,

    /// Scopes (bundles) to resolve, in order
    #[arg(short, long = "scope", required = true, value_delimiter = ',')]
    pub scopes: Vec<String>,

    /// Only resolve assets of these types
    #[arg(short = 't', long = "type", value_delimiter = ',')]
    pub types: Vec<AssetType>,

    /// Application context path
    #[arg(long, default_value = "")]
    pub context_path: String,

    /// URI of the rendered page
    #[arg(long, default_value = "/")]
    pub uri: String,

    /// Root directory of webapp locations (overrides asset.webapp_root)
    #[arg(long)]
    pub webapp_root: Option<PathBuf>,

    /// Also print the content served for each stored asset
    #[arg(long)]
    pub content: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., asset.minification)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for the resolve command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one URL per line)
    Plain,
}
