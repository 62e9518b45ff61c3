//! Headless command implementations
//!
//! Each command opens a [`Session`] against the configured server, pushes
//! messages through it and waits for the stores to settle before printing.

mod config;
mod dispatch;
mod items;

pub use config::{cmd_config_path, cmd_config_set_env, cmd_config_show};
pub use dispatch::cmd_dispatch;
pub use items::{cmd_add, cmd_delete, cmd_list, cmd_update};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::AppConfig;
use crate::gateway::HttpGateway;
use crate::models::ItemData;
use crate::session::Session;

/// Session backed by the HTTP gateway
fn connect(config: &AppConfig) -> Session {
    let gateway = HttpGateway::new(
        config.server_url(),
        Duration::from_secs(config.request_timeout_secs),
    );
    Session::new(Arc::new(gateway), config.server_url(), config.history_capacity)
}

/// Deliver queued messages and wait for every request, showing a spinner
fn settle(session: &mut Session, config: &AppConfig, message: &str) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    // A mutation is followed by a read, so allow two request timeouts
    let timeout = Duration::from_secs(config.request_timeout_secs.saturating_mul(2).max(1));
    let idle = session.settle(timeout);
    spinner.finish_and_clear();

    if !idle {
        bail!(
            "Timed out waiting for {} after {}s",
            session.cache.server_url(),
            timeout.as_secs()
        );
    }
    Ok(())
}

/// Parse `key=value` pairs given on the command line
fn parse_fields(fields: &[String]) -> Result<ItemData> {
    let mut data = ItemData::new();
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            bail!("Invalid field '{}': expected key=value", field);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid field '{}': empty key", field);
        }
        data.insert(key.to_string(), value.to_string());
    }
    Ok(data)
}
