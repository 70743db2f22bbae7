//! Trigger sources for a monitoring session
//!
//! The keyboard source reads crossterm key events in raw mode and restores the
//! terminal when dropped. It polls so that a termination request ends the wait.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::debug;

use crate::error::{GameSaveError, GameSaveResult};

use super::signal::TerminationSignal;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A discrete request delivered to the foreground thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    ManualBackup,
    RestoreLatestManual,
    ListAndRestore,
    Stop,
}

impl TriggerKind {
    /// Map a key press to a trigger
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Self::Stop),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Char('b') | KeyCode::Char('B') => Some(Self::ManualBackup),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Self::RestoreLatestManual),
            KeyCode::Char('l') | KeyCode::Char('L') => Some(Self::ListAndRestore),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Supplies triggers, and answers to prompts, to a session
pub trait EventSource {
    /// Block until the next trigger
    fn next_trigger(&mut self) -> GameSaveResult<TriggerKind>;

    /// Show `prompt` and read one line of input. Cancelling yields an empty string.
    fn prompt(&mut self, prompt: &str) -> GameSaveResult<String>;
}

/// Key events from the controlling terminal
pub struct KeyboardEvents {
    termination: TerminationSignal,
}

impl KeyboardEvents {
    /// Put the terminal into raw mode
    pub fn new(termination: TerminationSignal) -> GameSaveResult<Self> {
        enable_raw_mode()
            .map_err(|e| GameSaveError::Session(format!("Failed to enable raw mode: {}", e)))?;
        Ok(Self { termination })
    }

    /// Next key press, or `None` once termination is requested
    fn read_key(&mut self) -> GameSaveResult<Option<KeyEvent>> {
        let read_err = |e: io::Error| GameSaveError::Session(format!("Failed to read event: {}", e));
        loop {
            if self.termination.is_requested() {
                return Ok(None);
            }
            match event::poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                // A signal landed during the wait
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(read_err(e)),
            }
            match event::read().map_err(read_err)? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Some(key)),
                _ => {}
            }
        }
    }
}

impl EventSource for KeyboardEvents {
    fn next_trigger(&mut self) -> GameSaveResult<TriggerKind> {
        loop {
            let Some(key) = self.read_key()? else {
                return Ok(TriggerKind::Stop);
            };
            if let Some(trigger) = TriggerKind::from_key(&key) {
                debug!(?trigger, "trigger received");
                return Ok(trigger);
            }
        }
    }

    fn prompt(&mut self, prompt: &str) -> GameSaveResult<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut input = String::new();
        loop {
            let Some(key) = self.read_key()? else {
                input.clear();
                break;
            };
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Esc => {
                    input.clear();
                    break;
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    input.clear();
                    break;
                }
                KeyCode::Backspace => {
                    if input.pop().is_some() {
                        write!(stdout, "\u{8} \u{8}")?;
                    }
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    write!(stdout, "{}", c)?;
                }
                _ => {}
            }
            stdout.flush()?;
        }

        write!(stdout, "\r\n")?;
        stdout.flush()?;
        Ok(input.trim().to_string())
    }
}

impl Drop for KeyboardEvents {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Pre-recorded triggers and prompt answers. Stops once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    triggers: VecDeque<TriggerKind>,
    answers: VecDeque<String>,
}

impl ScriptedEvents {
    pub fn new(triggers: impl IntoIterator<Item = TriggerKind>) -> Self {
        Self {
            triggers: triggers.into_iter().collect(),
            answers: VecDeque::new(),
        }
    }

    pub fn with_answers<S: Into<String>>(mut self, answers: impl IntoIterator<Item = S>) -> Self {
        self.answers = answers.into_iter().map(Into::into).collect();
        self
    }
}

impl EventSource for ScriptedEvents {
    fn next_trigger(&mut self) -> GameSaveResult<TriggerKind> {
        Ok(self.triggers.pop_front().unwrap_or(TriggerKind::Stop))
    }

    fn prompt(&mut self, _prompt: &str) -> GameSaveResult<String> {
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
