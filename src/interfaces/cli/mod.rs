//! CLI interface module

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands, UserCommands};
use crate::services::AppServices;
use crate::storage::StorageFactory;
use commands::{config_generate, create_user, run_cron};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    CommandError(String),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
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

impl From<crate::errors::LinkaceError> for CliError {
    fn from(err: crate::errors::LinkaceError) -> Self {
        match err {
            crate::errors::LinkaceError::Validation(errors) => CliError::CommandError(
                errors
                    .first_message()
                    .unwrap_or_else(|| "Invalid input".to_string()),
            ),
            other => CliError::StorageError(other.format_simple()),
        }
    }
}

async fn connect() -> Result<AppServices, CliError> {
    let storage = StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;
    let services = AppServices::new(storage);
    services.settings.ensure_defaults().await?;
    Ok(services)
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        // Generate 不需要数据库连接
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force),

        Commands::User {
            action:
                UserCommands::Create {
                    name,
                    email,
                    password,
                },
        } => create_user(&connect().await?, &name, &email, &password).await,

        Commands::Cron => run_cron(&connect().await?).await,

        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by the server mode".to_string(),
        )),
    }
}
