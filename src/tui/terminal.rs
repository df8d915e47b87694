//! Raw-mode terminal lifecycle and the main loop
//!
//! The terminal is restored on every exit path, including panics.

use anyhow::Result;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::time::Instant;

use crate::backup::{SnapshotManager, SnapshotScheduler};
use crate::config::settings::Settings;
use crate::storage::Storage;

use super::app::App;
use super::event::{Event, EventHandler};
use super::handler::handle_event;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode on the alternate screen
pub fn init_terminal() -> Result<Tui> {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        previous(info);
    }));

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stdout()))?)
}

pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}

/// Run the interactive UI until the user quits
pub fn run_tui(storage: &Storage, settings: &Settings) -> Result<()> {
    let mut terminal = init_terminal()?;
    let outcome = run_loop(&mut terminal, storage, settings);
    restore_terminal()?;
    outcome
}

fn run_loop(terminal: &mut Tui, storage: &Storage, settings: &Settings) -> Result<()> {
    let mut app = App::new(storage, settings);
    let events = EventHandler::default();
    let snapshots = SnapshotManager::new(storage.paths().clone(), settings.backup_retention.clone());
    let mut scheduler = SnapshotScheduler::new(settings.snapshot_interval_minutes);

    while !app.should_quit {
        terminal.draw(|frame| super::views::render(frame, &mut app))?;

        match events.next()? {
            Event::Tick => take_due_snapshot(&mut app, &mut scheduler, &snapshots),
            event => handle_event(&mut app, event)?,
        }
    }
    Ok(())
}

/// Snapshot failures stay in the status bar; the session keeps running
fn take_due_snapshot(app: &mut App, scheduler: &mut SnapshotScheduler, snapshots: &SnapshotManager) {
    let now = Instant::now();
    if !scheduler.is_due(now) {
        return;
    }
    if scheduler.tick(snapshots, now) {
        app.set_status("Snapshot saved");
    } else {
        app.set_status("Periodic snapshot failed; will retry next interval");
    }
}
