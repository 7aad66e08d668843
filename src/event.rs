// Event module - Reading keyboard input from the terminal

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

/// Waits up to `timeout` for a key press. Releases, repeats and non-key
/// events are swallowed so the caller only ever sees presses.
pub fn next_key_press(timeout: Duration) -> anyhow::Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}
