use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::debug;

use miskatonic::cli::{Cli, Commands, ConfigCommands};
use miskatonic::commands::{
    cmd_add, cmd_config_path, cmd_config_set_env, cmd_config_show, cmd_delete, cmd_dispatch,
    cmd_list, cmd_update,
};
use miskatonic::{AppConfig, logging, tui};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(environment) = cli.env {
        // An explicit environment also wins over a stored server_url
        config.environment = environment;
        config.server_url = None;
    }

    let command = cli.command.unwrap_or(Commands::Tui);
    let interactive = matches!(command, Commands::Tui);
    let _guard = logging::init(!interactive, cli.verbose)?;
    debug!(environment = %config.environment, server = config.server_url(), "starting");

    match command {
        Commands::Tui => tui::run(&config),
        Commands::List { item_type, json } => cmd_list(&config, item_type, json),
        Commands::Add { item_type, fields } => cmd_add(&config, item_type, &fields),
        Commands::Update {
            item_type,
            id,
            fields,
        } => cmd_update(&config, item_type, &id, &fields),
        Commands::Delete { item_type, id, yes } => cmd_delete(&config, item_type, &id, yes),
        Commands::Dispatch { json } => cmd_dispatch(&config, &json),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(&config),
            ConfigCommands::SetEnv { environment } => cmd_config_set_env(environment),
            ConfigCommands::Path => cmd_config_path(),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "miskatonic", &mut io::stdout());
            Ok(())
        }
    }
}
