//! Configuration commands

use anyhow::Result;
use colored::Colorize;

use crate::config::{AppConfig, Environment};

/// Print the effective configuration, including any `--env` override
pub fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let path = AppConfig::config_path()?;
    let source = if AppConfig::exists() {
        path.display().to_string()
    } else {
        format!("{} (not created yet, using defaults)", path.display())
    };

    println!("{}", "Configuration".bold());
    println!("  File:    {}", source);
    println!("  Server:  {}", config.server_url().cyan());
    println!();
    print!("{}", toml::to_string_pretty(config)?);

    Ok(())
}

/// Persist the default environment
pub fn cmd_config_set_env(environment: Environment) -> Result<()> {
    let mut config = AppConfig::load()?;
    config.environment = environment;
    config.save()?;

    println!("{} Environment set to '{}'", "✓".green(), environment);
    if let Some(url) = &config.server_url {
        println!(
            "{} server_url = {} in the config file still takes precedence",
            "!".yellow(),
            url
        );
    } else {
        println!("  Server: {}", environment.server_url());
    }
    println!("  Config saved to: {}", AppConfig::config_path()?.display());

    Ok(())
}

pub fn cmd_config_path() -> Result<()> {
    println!("{}", AppConfig::config_path()?.display());
    Ok(())
}
