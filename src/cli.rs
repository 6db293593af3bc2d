//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::storage::RedirectMode;

/// Link Shepherd - URL shortener with interstitial pages and an admin console
#[derive(Parser)]
#[command(name = "linkshepherd")]
#[command(version)]
#[command(about = "URL shortener with timed and advertisement interstitials", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, short = 'c', global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Manage administrator accounts
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },

    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Create an administrator, or promote an existing account
    Create {
        /// Account email
        email: String,

        /// Password (if not provided, will prompt interactively)
        #[arg(long)]
        password: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,

        /// Display name
        #[arg(long)]
        full_name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum LinkCommands {
    /// Add an operator-created short link without an owner
    Add {
        /// Destination URL
        url: String,

        /// Custom short code (random when omitted)
        #[arg(long)]
        code: Option<String>,

        /// Redirect mode: immediate, timed or advertisement
        #[arg(long, value_parser = parse_mode)]
        mode: Option<RedirectMode>,

        /// Display title
        #[arg(long)]
        title: Option<String>,
    },
}

fn parse_mode(value: &str) -> Result<RedirectMode, String> {
    value.parse::<RedirectMode>()
}
