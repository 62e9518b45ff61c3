//! List, add, update and delete items from the command line

use anyhow::{Result, bail};
use colored::Colorize;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use super::{connect, parse_fields, settle};
use crate::config::AppConfig;
use crate::dispatch::DataAction;
use crate::models::{ItemData, ItemType};
use crate::session::Session;
use crate::store::focus::item_title;
use crate::tui::ui::form::{FieldKind, FormError, form_fields, is_valid_email, validate};
use crate::tui::ui::helpers::item_cells;
use crate::tui::ui::table::DataTable;

/// Read one collection, failing when the server did not answer
fn read(session: &mut Session, config: &AppConfig, item_type: ItemType) -> Result<()> {
    session.dispatch(DataAction::ReadItems { item_type });
    settle(session, config, &format!("Reading {}...", item_type.domain()))?;

    if session.cache.last_refreshed(item_type).is_none() {
        bail!(
            "Could not read {} from {} (see the log for details)",
            item_type.domain(),
            session.cache.server_url()
        );
    }
    Ok(())
}

/// Print the outcome of the last mutation, or fail if it was not accepted
fn report_mutation(session: &Session, done: &str) -> Result<()> {
    match session.cache.last_mutation() {
        Some(outcome) if outcome.accepted() => {
            println!("{} {}", "✓".green(), done);
            Ok(())
        }
        Some(outcome) => match outcome.status {
            Some(status) => bail!("Server rejected the {} (HTTP {})", outcome.action, status),
            None => bail!(
                "Could not reach {} to {} the {}",
                session.cache.server_url(),
                outcome.action,
                outcome.item_type
            ),
        },
        None => bail!("No answer from {}", session.cache.server_url()),
    }
}

/// Print one collection as a table or JSON
pub fn cmd_list(config: &AppConfig, item_type: ItemType, json: bool) -> Result<()> {
    let mut session = connect(config);

    // Code rows show book titles and student names, and sort by book title
    if item_type == ItemType::Code {
        read(&mut session, config, ItemType::Book)?;
        read(&mut session, config, ItemType::Student)?;
    }
    read(&mut session, config, item_type)?;

    let items = session.cache.items(item_type);
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("{} No {} found", "!".yellow(), item_type.domain());
        return Ok(());
    }

    let rows = items
        .iter()
        .map(|item| item_cells(item, &session.cache))
        .collect();
    let table = DataTable::new(item_type.general_title(), item_type.labels(), rows);

    println!("{}", table.to_plain());
    println!(
        "{} {} {}",
        ">".cyan(),
        items.len(),
        if items.len() == 1 {
            item_type.as_str()
        } else {
            item_type.domain()
        }
    );
    Ok(())
}

/// Create an item. Missing fields are prompted for interactively.
pub fn cmd_add(config: &AppConfig, item_type: ItemType, fields: &[String]) -> Result<()> {
    let Some(specs) = form_fields(item_type) else {
        return Err(FormError::NotImplemented(item_type).into());
    };

    let mut data = parse_fields(fields)?;
    warn_unknown_keys(item_type, &data);

    let theme = ColorfulTheme::default();
    for spec in specs {
        let present = data.get(spec.key).is_some_and(|v| !v.trim().is_empty());
        if present {
            continue;
        }
        let input = Input::<String>::with_theme(&theme).with_prompt(spec.label);
        let value = match spec.kind {
            FieldKind::Email => input
                .validate_with(|v: &String| -> Result<(), &str> {
                    if is_valid_email(v.trim()) {
                        Ok(())
                    } else {
                        Err("not a valid email address")
                    }
                })
                .interact_text()?,
            FieldKind::Text => input.interact_text()?,
        };
        data.insert(spec.key.to_string(), value);
    }

    let data = validate(item_type, &data)?;
    let summary = summarize(&data);

    let mut session = connect(config);
    session.dispatch(DataAction::CreateItem { item_type, data });
    settle(&mut session, config, &format!("Creating {}...", item_type))?;

    report_mutation(&session, &format!("Created {} {}", item_type, summary.cyan()))
}

/// Change fields of an existing item; unchanged fields keep their values
pub fn cmd_update(config: &AppConfig, item_type: ItemType, id: &str, fields: &[String]) -> Result<()> {
    if form_fields(item_type).is_none() {
        return Err(FormError::NotImplemented(item_type).into());
    }
    let changes = parse_fields(fields)?;
    warn_unknown_keys(item_type, &changes);

    let mut session = connect(config);
    read(&mut session, config, item_type)?;

    let Some(item) = session.cache.item_by_id(item_type, id) else {
        bail!("No {} with id '{}'", item_type, id);
    };
    let mut merged = item.to_data();
    merged.extend(changes);
    let data = validate(item_type, &merged)?;
    let summary = summarize(&data);

    session.dispatch(DataAction::UpdateItem {
        item_type,
        id: id.to_string(),
        data,
    });
    settle(&mut session, config, &format!("Updating {}...", item_type))?;

    report_mutation(&session, &format!("Updated {} {}", item_type, summary.cyan()))
}

/// Delete an item after confirmation
pub fn cmd_delete(config: &AppConfig, item_type: ItemType, id: &str, yes: bool) -> Result<()> {
    let mut session = connect(config);
    read(&mut session, config, item_type)?;

    let Some(item) = session.cache.item_by_id(item_type, id) else {
        bail!("No {} with id '{}'", item_type, id);
    };
    let title = item_title(item);

    let confirmed = if yes {
        true
    } else {
        Confirm::new()
            .with_prompt(format!("Delete {} \"{}\"?", item_type, title))
            .default(false)
            .interact()?
    };
    if !confirmed {
        println!("{} Cancelled", "!".yellow());
        return Ok(());
    }

    session.dispatch(DataAction::DeleteItem {
        item_type,
        id: id.to_string(),
    });
    settle(&mut session, config, &format!("Deleting {}...", item_type))?;

    report_mutation(&session, &format!("Deleted {} {}", item_type, title.cyan()))
}

fn warn_unknown_keys(item_type: ItemType, data: &ItemData) {
    let known: Vec<&str> = form_fields(item_type)
        .unwrap_or_default()
        .iter()
        .map(|f| f.key)
        .collect();
    for key in data.keys().filter(|k| !known.contains(&k.as_str())) {
        println!(
            "{} Ignoring unknown {} field '{}' (expected one of: {})",
            "!".yellow(),
            item_type,
            key,
            known.join(", ")
        );
    }
}

fn summarize(data: &ItemData) -> String {
    data.values().cloned().collect::<Vec<_>>().join(" / ")
}
