//! Command-line interface definition

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::config::Environment;
use crate::models::ItemType;

#[derive(Parser, Debug)]
#[command(name = "miskatonic")]
#[command(author, version, about = "Admin client for the Miskatonic book manager", long_about = None)]
pub struct Cli {
    /// Server environment to talk to (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive terminal UI (default)
    Tui,

    /// Print one collection
    #[command(alias = "ls")]
    List {
        #[arg(value_enum)]
        item_type: ItemType,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create an item, prompting for missing fields
    Add {
        #[arg(value_enum)]
        item_type: ItemType,

        /// Field value as key=value (e.g. --field title=Dagon)
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// Change fields of an existing item
    Update {
        #[arg(value_enum)]
        item_type: ItemType,

        id: String,

        /// Field value as key=value
        #[arg(short, long = "field", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        #[arg(value_enum)]
        item_type: ItemType,

        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Send one raw JSON action through the stores and print the result
    Dispatch {
        /// e.g. '{"type":"VIEW_CHANGED","args":{"newScope":"update","newItemType":"book","itemIndex":0}}'
        json: String,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Persist the default environment
    SetEnv {
        #[arg(value_enum)]
        environment: Environment,
    },

    /// Print the config file location
    Path,
}
