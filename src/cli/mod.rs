//! CLI module for querygate
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `query` - Answer one query against the configured backends
//! - `classify` - Show the routing decision without contacting a backend
//! - `gateways` - List the configured gateways, optionally probing them
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! querygate serve
//!
//! # See where a query would go
//! querygate classify "TX tax rate"
//!
//! # Generate shell completions
//! querygate completions bash > ~/.bash_completion.d/querygate
//! ```

pub mod classify;
pub mod completions;
pub mod config;
pub mod gateways;
pub mod output;
pub mod query;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file name.
pub const DEFAULT_CONFIG: &str = "querygate.toml";

/// querygate - route natural-language queries to vehicle or tax data
#[derive(Parser, Debug)]
#[command(
    name = "querygate",
    version,
    about = "Route natural-language queries to vehicle or tax data backends"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Answer one query
    Query(QueryArgs),
    /// Show the routing decision for a query
    Classify(ClassifyArgs),
    /// List configured gateways
    Gateways(GatewaysArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "QUERYGATE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "QUERYGATE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "QUERYGATE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Query text
    pub text: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Query text
    pub text: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file (for extra routing terms)
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct GatewaysArgs {
    /// Probe each gateway (launch, handshake, list operations)
    #[arg(long)]
    pub check: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
