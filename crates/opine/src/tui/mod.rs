//! Terminal user interface for opine.
//!
//! One blocking screen is active at a time; the loop draws, waits for a
//! single user action, and dispatches it to the active screen's handler.

pub mod app;
pub mod event;
pub mod ui;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, prelude::*, Terminal};
use std::io::stdout;
use std::time::Duration;

use app::{App, Flow};
use event::{Event, EventHandler};
use opine_model::Bundle;

/// Run a workflow over the given bundle until it terminates.
pub fn run(flow: Flow, bundle: Bundle, opinion_values: Vec<String>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(flow, bundle, opinion_values);
    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    // Restore terminal before any error is reported
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match events.next() {
            Event::Key(key) => app.handle_key(key)?,
            Event::Tick => {}
            Event::Resize(_, _) => {} // Ratatui handles resize
        }
    }

    Ok(())
}
