use clap::Parser;

use linkace::cli::Cli;
use linkace::config::{get_config, init_config_with_path};
use linkace::runtime::modes::{self, Mode};
use linkace::system::logging::init_logging;

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_with_path(cli.config.as_deref());
    let command = cli.command_or_default();

    match modes::detect_mode(&command) {
        Mode::Cli => {
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
        Mode::Server => {
            let config = get_config();
            // guard 必须活到进程退出，日志才能刷盘
            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    std::process::exit(1);
                }
            };

            if let Err(e) = modes::run_server().await {
                tracing::error!("Server exited with error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}
