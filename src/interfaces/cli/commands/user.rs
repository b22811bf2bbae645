//! 用户管理命令

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::AppServices;

pub async fn create_user(
    services: &AppServices,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let (user, api_token) = services.users.create(name, email, password).await?;

    println!(
        "{} {} <{}>",
        "User created:".green().bold(),
        user.name.cyan(),
        user.email
    );
    println!("  {} {}", "ID:".dimmed(), user.id);
    println!("  {} {}", "API token:".dimmed(), api_token.yellow());
    Ok(())
}
