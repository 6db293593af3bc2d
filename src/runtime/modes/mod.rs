//! Mode routing
//!
//! Server mode runs when no subcommand (or `serve`) is given; every other
//! subcommand is a one-shot CLI command.

pub mod cli;
pub mod server;

pub use cli::run_cli;
pub use server::run_server;

use crate::cli::Commands;

/// Mode detection result
#[derive(Debug, PartialEq)]
pub enum Mode {
    Server,
    Cli,
}

pub fn detect_mode(command: Option<&Commands>) -> Mode {
    match command {
        None | Some(Commands::Serve) => Mode::Server,
        Some(_) => Mode::Cli,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigCommands;

    #[test]
    fn test_detect_mode() {
        assert_eq!(detect_mode(None), Mode::Server);
        assert_eq!(detect_mode(Some(&Commands::Serve)), Mode::Server);
        let generate = Commands::Config {
            action: ConfigCommands::Generate {
                output_path: None,
                force: false,
            },
        };
        assert_eq!(detect_mode(Some(&generate)), Mode::Cli);
    }
}
