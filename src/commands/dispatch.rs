use anyhow::{Context, Result};
use colored::Colorize;

use super::{connect, settle};
use crate::config::AppConfig;
use crate::dispatch::{DataAction, RawAction};
use crate::models::ItemType;

/// Load every collection, send one raw action, then print both stores
pub fn cmd_dispatch(config: &AppConfig, json: &str) -> Result<()> {
    let raw: RawAction = serde_json::from_str(json).context("Invalid action JSON")?;
    let kind = raw.kind.clone();

    let mut session = connect(config);
    for item_type in ItemType::all() {
        session.dispatch(DataAction::ReadItems {
            item_type: *item_type,
        });
    }
    settle(&mut session, config, "Loading collections...")?;

    let Some(message) = raw.into_message() else {
        println!(
            "{} Ignored '{}': unknown action or missing fields",
            "!".yellow(),
            kind
        );
        return Ok(());
    };

    session.dispatch(message);
    settle(&mut session, config, &format!("Dispatching {}...", kind))?;

    let focus = &session.focus;
    println!("{} {}", "✓".green(), kind.bold());
    println!("  scope:      {}", focus.scope().to_string().cyan());
    println!("  item type:  {}", focus.item_type().to_string().cyan());
    println!("  title:      {}", focus.display_title());
    println!(
        "  popup:      {}",
        if focus.show_popup() { "open" } else { "closed" }
    );
    match focus.focus_item() {
        Some(item) => println!("  item:       {}", serde_json::to_string(item)?),
        None => println!("  item:       {}", "none".dimmed()),
    }

    if let Some(outcome) = session.cache.last_mutation() {
        let status = outcome
            .status
            .map_or_else(|| "no answer".to_string(), |s| s.to_string());
        let marker = if outcome.accepted() {
            "✓".green()
        } else {
            "!".yellow()
        };
        println!(
            "  {} {} {}: {}",
            marker, outcome.action, outcome.item_type, status
        );
    }
    Ok(())
}
