//! Mode routing
//!
//! `serve`（默认）启动 HTTP 服务器，其余子命令在 CLI 模式下执行后退出。

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

pub fn detect_mode(command: &Commands) -> Mode {
    match command {
        Commands::Serve => Mode::Server,
        _ => Mode::Cli,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode() {
        assert_eq!(detect_mode(&Commands::Serve), Mode::Server);
        assert_eq!(detect_mode(&Commands::Cron), Mode::Cli);
    }
}
