//! CLI interface module
//!
//! Operator commands. Everything except `config generate` opens the
//! database directly.

pub mod commands;

use std::fmt;

use crate::cli::{AdminCommands, Commands, ConfigCommands, LinkCommands};
use crate::errors::ShepherdError;
use crate::services::AppServices;
use crate::storage::StorageFactory;

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<ShepherdError> for CliError {
    fn from(err: ShepherdError) -> Self {
        match err {
            ShepherdError::DatabaseConfig(_)
            | ShepherdError::DatabaseConnection(_)
            | ShepherdError::DatabaseOperation(_) => CliError::StorageError(err.to_string()),
            ShepherdError::Validation(_) => CliError::ParseError(err.to_string()),
            _ => CliError::CommandError(err.to_string()),
        }
    }
}

async fn open_services() -> Result<AppServices, CliError> {
    let storage = StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;
    Ok(AppServices::from_storage(storage))
}

/// Run a CLI command from clap-parsed input
///
/// `Serve` is handled by the server runtime and never reaches here.
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Serve => Err(CliError::CommandError(
            "serve is not a CLI command".to_string(),
        )),
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => commands::config_generate(output_path, force).await,
        Commands::Admin {
            action:
                AdminCommands::Create {
                    email,
                    password,
                    stdin,
                    full_name,
                },
        } => {
            let password = commands::read_password(password, stdin)
                .map_err(CliError::ParseError)?;
            let services = open_services().await?;
            commands::create_admin(&services, email, password, full_name).await
        }
        Commands::Link {
            action:
                LinkCommands::Add {
                    url,
                    code,
                    mode,
                    title,
                },
        } => {
            let services = open_services().await?;
            commands::add_link(&services, url, code, mode, title).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            CliError::from(ShepherdError::validation("bad")),
            CliError::ParseError(_)
        ));
        assert!(matches!(
            CliError::from(ShepherdError::database_operation("down")),
            CliError::StorageError(_)
        ));
        assert!(matches!(
            CliError::from(ShepherdError::conflict("taken")),
            CliError::CommandError(_)
        ));
    }
}
