// SPDX-License-Identifier: GPL-3.0-only

//! Single-task session driver.
//!
//! The [`SessionDriver`] owns a [`Keyboard`] and feeds it from one task: host
//! events arrive over a `futures` mpsc channel, and between events the driver
//! sleeps until the keyboard's next timer deadline. Touch handling and timer
//! callbacks therefore never interleave.
//!
//! Closing the sending side ends the session: the keyboard is deactivated,
//! which cancels every timer, and handed back to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::SinkExt;
//! use galaxy_keyboard::driver::{SessionDriver, SessionEvent};
//!
//! let (mut events, driver) = SessionDriver::channel(keyboard, 32);
//! let session = tokio::spawn(driver.run());
//!
//! events.send(SessionEvent::TouchDown(point)).await?;
//! events.send(SessionEvent::TouchUp(point)).await?;
//! drop(events);
//!
//! let keyboard = session.await?;
//! ```

use futures::channel::mpsc;
use futures::StreamExt;
use std::time::Instant;

use crate::config::TouchDetectionConfig;
use crate::keyboard::Keyboard;
use crate::renderer::Point;
use crate::sink::{KeyboardHost, TextSink};

/// Host events delivered to a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A finger touched the surface
    TouchDown(Point),
    /// The finger moved
    TouchMove(Point),
    /// The finger lifted
    TouchUp(Point),
    /// The host cancelled the touch
    TouchCancel,
    /// The document or focus changed
    TextDidChange,
    /// The surface width changed
    Resize(f32),
    /// Replace the touch configuration
    SetTouchConfig(TouchDetectionConfig),
}

/// Sending side of a session's event channel.
pub type SessionSender = mpsc::Sender<SessionEvent>;

/// Runs a keyboard session on the current task.
pub struct SessionDriver<S, H> {
    keyboard: Keyboard<S, H>,
    events: mpsc::Receiver<SessionEvent>,
}

impl<S: TextSink, H: KeyboardHost> SessionDriver<S, H> {
    /// Creates a driver reading from an existing receiver.
    pub fn new(keyboard: Keyboard<S, H>, events: mpsc::Receiver<SessionEvent>) -> Self {
        Self { keyboard, events }
    }

    /// Creates a driver together with the sender that feeds it.
    pub fn channel(keyboard: Keyboard<S, H>, buffer: usize) -> (SessionSender, Self) {
        let (tx, rx) = mpsc::channel::<SessionEvent>(buffer);
        (tx, Self::new(keyboard, rx))
    }

    /// Activates the keyboard and processes events until the channel closes.
    ///
    /// Returns the deactivated keyboard.
    pub async fn run(mut self) -> Keyboard<S, H> {
        self.keyboard.become_active(now());
        tracing::info!("Session started");

        loop {
            let deadline = self.keyboard.next_deadline();

            tokio::select! {
                event = self.events.next() => match event {
                    Some(event) => self.dispatch(event),
                    None => break,
                },
                _ = wait_until(deadline) => {
                    self.keyboard.tick(now());
                }
            }
        }

        self.keyboard.will_deactivate();
        tracing::info!("Session ended");
        self.keyboard
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let now = now();
        tracing::trace!("Session event {:?}", event);

        match event {
            SessionEvent::TouchDown(point) => self.keyboard.touch_down(point, now),
            SessionEvent::TouchMove(point) => self.keyboard.touch_move(point, now),
            SessionEvent::TouchUp(point) => self.keyboard.touch_up(point, now),
            SessionEvent::TouchCancel => self.keyboard.touch_cancel(now),
            SessionEvent::TextDidChange => self.keyboard.text_did_change(),
            SessionEvent::Resize(width) => self.keyboard.resize(width),
            SessionEvent::SetTouchConfig(config) => self.keyboard.set_touch_config(config),
        }
    }
}

/// Current time on the runtime's clock, which tests can pause.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Sleeps until `deadline`, or forever if there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

// ============================================================================
// Tests
// ============================================================================
