//! Terminal keyboard input via crossterm.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

use super::{InputPoll, InputSource, Intent};

/// Map a key event to an intent. Only presses count, so holding a key down
/// (terminal auto-repeat) or releasing it never produces another jump.
pub fn map_key(key: KeyEvent) -> Option<Intent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Intent::Quit),
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(Intent::Jump),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Intent::Quit),
        KeyCode::Char('g') | KeyCode::Char('G') => Some(Intent::ToggleControlMode),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Intent::SwitchInputDevice),
        _ => None,
    }
}

/// Drains every pending terminal event without blocking.
#[derive(Debug, Default)]
pub struct KeyboardInput;

impl KeyboardInput {
    pub fn new() -> Self {
        Self
    }

    fn drain(&mut self, out: &mut Vec<Intent>) -> std::io::Result<()> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                out.extend(map_key(key));
            }
        }
        Ok(())
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> InputPoll {
        let mut intents = Vec::new();
        if let Err(e) = self.drain(&mut intents) {
            warn!("keyboard read failed: {e}");
        }
        InputPoll {
            intents,
            downgrade: false,
        }
    }
}
