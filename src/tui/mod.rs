//! Interactive terminal client

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::info;

use crate::config::AppConfig;
use crate::gateway::HttpGateway;
use app::App;

/// Run the TUI against the configured server until the user quits
pub fn run(config: &AppConfig) -> Result<()> {
    let gateway = HttpGateway::new(
        config.server_url(),
        Duration::from_secs(config.request_timeout_secs),
    );
    let mut app = App::new(Arc::new(gateway), config);

    let mut terminal = ratatui::init();
    execute!(io::stdout(), EnableMouseCapture)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore the terminal even when the loop failed
    let mouse = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    info!("TUI closed");

    result?;
    mouse?;
    Ok(())
}

fn run_loop(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;
        event::handle_events(app)?;
    }
    Ok(())
}
