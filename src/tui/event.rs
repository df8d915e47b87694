//! Input thread for the TUI
//!
//! A background thread polls crossterm and feeds the main loop key
//! presses, resizes and a periodic tick over a channel.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// How often the main loop wakes up without input
pub const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// Map a raw terminal event to one the app cares about.
///
/// Only presses count as keys; release and repeat events would double
/// every keystroke on terminals that report them.
pub fn translate(raw: CrosstermEvent) -> Option<Event> {
    match raw {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

pub struct EventHandler {
    receiver: Receiver<Event>,
    #[allow(dead_code)]
    worker: thread::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::spawn(move || pump(sender, tick_rate));
        Self { receiver, worker }
    }

    /// Block until the next event. Errors once the input thread has stopped.
    pub fn next(&self) -> Result<Event, RecvError> {
        self.receiver.recv()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(TICK_RATE)
    }
}

/// Runs until the terminal fails or the receiver is dropped
fn pump(sender: Sender<Event>, tick_rate: Duration) {
    let mut last_tick = Instant::now();
    loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        match event::poll(timeout) {
            Ok(true) => {
                let Ok(raw) = event::read() else { return };
                if let Some(event) = translate(raw) {
                    if sender.send(event).is_err() {
                        return;
                    }
                }
            }
            Ok(false) => {}
            Err(_) => return,
        }

        if last_tick.elapsed() >= tick_rate {
            if sender.send(Event::Tick).is_err() {
                return;
            }
            last_tick = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_only_presses_are_forwarded() {
        assert!(matches!(translate(key(KeyEventKind::Press)), Some(Event::Key(_))));
        assert_eq!(translate(key(KeyEventKind::Release)), None);
        assert_eq!(translate(key(KeyEventKind::Repeat)), None);
    }

    #[test]
    fn test_resize_and_focus() {
        assert_eq!(
            translate(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        );
        assert_eq!(translate(CrosstermEvent::FocusGained), None);
    }
}
