// SPDX-License-Identifier: GPL-3.0-only

//! Headless replay of timed touch scripts.
//!
//! A script is a JSON document describing the starting document, an optional
//! configuration and a list of timed events:
//!
//! ```json
//! {
//!     "config": { "language": "russian" },
//!     "text": "",
//!     "events": [
//!         { "at_ms": 0, "down": [180.0, 200.0] },
//!         { "at_ms": 80, "up": [180.0, 200.0] },
//!         { "at_ms": 900, "tick": true }
//!     ]
//! }
//! ```
//!
//! Each event names exactly one of `down`, `move`, `up`, `cancel` or `tick`.
//! Times are milliseconds from session start and must not go backwards.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, KeyboardConfig};
use crate::input::ShiftState;
use crate::keyboard::Keyboard;
use crate::layout::{Language, Layer, LayoutCatalog, LayoutError};
use crate::renderer::Point;
use crate::sink::{MemoryHost, MemorySink};

/// A replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Session configuration; defaults when absent
    #[serde(default)]
    pub config: Option<KeyboardConfig>,
    /// Initial document contents
    #[serde(default)]
    pub text: String,
    /// Dark host appearance
    #[serde(default)]
    pub dark: bool,
    /// Whether the host needs the globe key
    #[serde(default = "default_needs_globe")]
    pub needs_globe: bool,
    /// Timed events
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

fn default_needs_globe() -> bool {
    true
}

impl Default for ReplayScript {
    fn default() -> Self {
        Self {
            config: None,
            text: String::new(),
            dark: false,
            needs_globe: default_needs_globe(),
            events: Vec::new(),
        }
    }
}

/// One timed entry in a script, as written in JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    /// Milliseconds from session start
    pub at_ms: u64,
    /// Touch down at `[x, y]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<[f32; 2]>,
    /// Touch move to `[x, y]`
    #[serde(default, rename = "move", skip_serializing_if = "Option::is_none")]
    pub move_to: Option<[f32; 2]>,
    /// Touch up at `[x, y]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<[f32; 2]>,
    /// Touch cancelled
    #[serde(default)]
    pub cancel: bool,
    /// Fire due timers only
    #[serde(default)]
    pub tick: bool,
}

/// A validated script event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayAction {
    /// Touch down
    Down(Point),
    /// Touch move
    Move(Point),
    /// Touch up
    Up(Point),
    /// Touch cancel
    Cancel,
    /// Timer tick
    Tick,
}

impl ScriptEvent {
    /// Converts the JSON entry into exactly one action.
    pub fn action(&self) -> Option<ReplayAction> {
        let point = |[x, y]: [f32; 2]| Point::new(x, y);
        let mut actions = Vec::with_capacity(1);

        if let Some(at) = self.down {
            actions.push(ReplayAction::Down(point(at)));
        }
        if let Some(at) = self.move_to {
            actions.push(ReplayAction::Move(point(at)));
        }
        if let Some(at) = self.up {
            actions.push(ReplayAction::Up(point(at)));
        }
        if self.cancel {
            actions.push(ReplayAction::Cancel);
        }
        if self.tick {
            actions.push(ReplayAction::Tick);
        }

        match actions.as_slice() {
            [action] => Some(*action),
            _ => None,
        }
    }
}

/// Final session state after a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    /// Document contents
    pub text: String,
    /// Shift state
    pub shift: ShiftState,
    /// Active language
    pub language: Language,
    /// Active layer
    pub layer: Layer,
    /// Keyboard-switch requests sent to the host
    pub switch_requests: usize,
}

impl fmt::Display for ReplayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "text: {:?}", self.text)?;
        writeln!(f, "shift: {:?}", self.shift)?;
        writeln!(f, "language: {}", self.language)?;
        write!(f, "layer: {}", self.layer)?;
        if self.switch_requests > 0 {
            write!(f, "\nkeyboard switches: {}", self.switch_requests)?;
        }
        Ok(())
    }
}

/// Error type for replays.
#[derive(Debug)]
pub enum ReplayError {
    /// The script is not valid JSON
    Script {
        /// The underlying JSON error
        source: serde_json::Error,
        /// Line number reported by serde_json
        line_number: usize,
    },
    /// The embedded configuration is invalid
    Config(ConfigError),
    /// The layout catalog could not be used
    Layout(LayoutError),
    /// An event is malformed or out of order
    InvalidEvent {
        /// Position of the event in the script
        index: usize,
        /// What is wrong with it
        message: String,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Script {
                source,
                line_number,
            } => write!(f, "Script parsing error at line {}: {}", line_number, source),
            ReplayError::Config(err) => write!(f, "{}", err),
            ReplayError::Layout(err) => write!(f, "{}", err),
            ReplayError::InvalidEvent { index, message } => {
                write!(f, "Invalid event #{}: {}", index, message)
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::Script { source, .. } => Some(source),
            ReplayError::Config(err) => Some(err),
            ReplayError::Layout(err) => Some(err),
            ReplayError::InvalidEvent { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(source: serde_json::Error) -> Self {
        Self::Script {
            line_number: source.line(),
            source,
        }
    }
}

impl From<ConfigError> for ReplayError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LayoutError> for ReplayError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

/// Parses a script from JSON.
pub fn parse_script(json: &str) -> Result<ReplayScript, ReplayError> {
    let script: ReplayScript = serde_json::from_str(json)?;
    if let Some(config) = &script.config {
        config.validate()?;
    }
    Ok(script)
}

/// Runs a script against the built-in catalog.
pub fn replay(script: &ReplayScript) -> Result<ReplayOutcome, ReplayError> {
    let actions = validate_events(&script.events)?;

    let catalog = LayoutCatalog::builtin()?;
    let sink = MemorySink::new(script.text.clone()).with_dark_appearance(script.dark);
    let host = MemoryHost::new(script.needs_globe);
    let config = script.config.clone().unwrap_or_default();
    let mut keyboard = Keyboard::new(catalog, config, sink, host)?;

    let start = Instant::now();
    keyboard.become_active(start);

    for (at_ms, action) in actions {
        let now = start + Duration::from_millis(at_ms);
        match action {
            ReplayAction::Down(point) => keyboard.touch_down(point, now),
            ReplayAction::Move(point) => keyboard.touch_move(point, now),
            ReplayAction::Up(point) => keyboard.touch_up(point, now),
            ReplayAction::Cancel => keyboard.touch_cancel(now),
            ReplayAction::Tick => keyboard.tick(now),
        }
    }

    keyboard.will_deactivate();
    tracing::debug!("Replayed {} events", script.events.len());

    Ok(ReplayOutcome {
        text: keyboard.sink().text().to_string(),
        shift: keyboard.state().shift(),
        language: keyboard.state().language(),
        layer: keyboard.state().layer(),
        switch_requests: keyboard.host().switch_requests,
    })
}

fn validate_events(events: &[ScriptEvent]) -> Result<Vec<(u64, ReplayAction)>, ReplayError> {
    let mut previous = 0;
    let mut actions = Vec::with_capacity(events.len());

    for (index, event) in events.iter().enumerate() {
        let action = event.action().ok_or_else(|| ReplayError::InvalidEvent {
            index,
            message: "expected exactly one of down, move, up, cancel or tick".to_string(),
        })?;
        if event.at_ms < previous {
            return Err(ReplayError::InvalidEvent {
                index,
                message: format!("at_ms {} is earlier than {}", event.at_ms, previous),
            });
        }
        previous = event.at_ms;
        actions.push((event.at_ms, action));
    }

    Ok(actions)
}

// ============================================================================
// Tests
// ============================================================================
