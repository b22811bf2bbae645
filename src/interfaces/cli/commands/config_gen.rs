//! 生成示例配置文件

use std::path::Path;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;

pub fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if !force && Path::new(&path).exists() {
        return Err(CliError::CommandError(format!(
            "File already exists: {} (use --force to overwrite)",
            path
        )));
    }

    StaticConfig::default()
        .save_to_file(&path)
        .map_err(|e| CliError::CommandError(format!("Failed to write {}: {}", path, e)))?;

    println!(
        "{} {}",
        "Configuration file generated:".green(),
        path.blue()
    );
    println!(
        "  {}",
        "User and system settings are edited on the /settings page".dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_string_lossy().to_string();

        config_generate(Some(path_str.clone()), false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[server]"));

        assert!(config_generate(Some(path_str.clone()), false).is_err());
        assert!(config_generate(Some(path_str), true).is_ok());
    }
}
