//! CLI mode

use crate::cli::Commands;
use crate::interfaces::cli::{CliError, run_cli_command};

/// Run one CLI command
pub async fn run_cli(command: Commands) -> Result<(), CliError> {
    run_cli_command(command).await
}
