//! CLI module for monitor-assist.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version display
//! - The `chat`, `assist`, `bind` and `sessions` subcommands
//!
//! # Usage
//!
//! ```ignore
//! use monitor_assist::cli::{parse_args, run_cli_command};
//! use monitor_assist::config::ClientConfig;
//!
//! let command = parse_args(std::env::args())?;
//! run_cli_command(command, &ClientConfig::from_env()).await?;
//! ```

pub mod args;
pub mod commands;
pub mod version;

pub use args::{parse_args, ArgsError, CliCommand, USAGE};
pub use version::{handle_version_command, VERSION};

use color_eyre::Result;

use crate::config::ClientConfig;

/// Run a parsed CLI command to completion.
pub async fn run_cli_command(command: CliCommand, config: &ClientConfig) -> Result<()> {
    match command {
        CliCommand::Version => {
            handle_version_command();
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Chat {
            session_id,
            model,
            message,
        } => commands::run_chat(config, &session_id, model.as_deref(), &message).await,
        CliCommand::Assist { session_id } => commands::run_assist(config, &session_id).await,
        CliCommand::Bind {
            ssh_session_id,
            agent_id,
        } => commands::run_bind(config, &ssh_session_id, &agent_id).await,
        CliCommand::Sessions => commands::run_sessions(config).await,
    }
}
