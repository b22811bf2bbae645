//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// LinkAce - a self-hosted bookmark archive
#[derive(Parser)]
#[command(name = "linkace")]
#[command(version)]
#[command(about = "A self-hosted bookmark archive", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Run all due scheduled tasks once and exit
    Cron,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// User management commands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user and print its API token
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// 未指定子命令时启动服务器
    pub fn command_or_default(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["linkace"]);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command_or_default(), Commands::Serve));
    }

    #[test]
    fn test_user_create_args() {
        let cli = Cli::parse_from([
            "linkace",
            "-c",
            "custom.toml",
            "user",
            "create",
            "--name",
            "alice",
            "--email",
            "alice@example.com",
            "--password",
            "secret123",
        ]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        match cli.command_or_default() {
            Commands::User {
                action: UserCommands::Create { name, email, .. },
            } => {
                assert_eq!(name, "alice");
                assert_eq!(email, "alice@example.com");
            }
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn test_config_generate_args() {
        let cli = Cli::parse_from(["linkace", "config", "generate", "out.toml", "--force"]);
        match cli.command_or_default() {
            Commands::Config {
                action: ConfigCommands::Generate { output_path, force },
            } => {
                assert_eq!(output_path.as_deref(), Some("out.toml"));
                assert!(force);
            }
            _ => panic!("expected config generate"),
        }
    }
}
