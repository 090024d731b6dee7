// SPDX-License-Identifier: GPL-3.0-only

//! Transient overlays and their timers.
//!
//! The [`OverlayManager`] owns everything that lives for a single touch: the
//! key preview bubble, the long-press alternates popup, and the deadlines for
//! the long-press threshold and delete autorepeat.
//!
//! Timers are plain deadlines. Nothing fires on its own; the owner calls
//! [`OverlayManager::tick`] with the current time and acts on what is due.
//! Cancelling a timer clears its deadline, so a stale timer can never fire.
//!
//! # Lifecycle
//!
//! - At most one preview and one popup exist at any time
//! - Showing a preview or opening a popup replaces the previous one
//! - Opening a popup removes the preview and the pending long press

use std::time::{Duration, Instant};

use crate::app_settings::{
    DELETE_REPEAT_DELAY_MS, DELETE_REPEAT_INTERVAL_MS, LONG_PRESS_THRESHOLD_MS, OVERLAY_GAP,
    POPUP_CELL_HEIGHT, POPUP_CELL_SPACING, POPUP_CELL_WIDTH, POPUP_HEIGHT, PREVIEW_SIZE,
};
use crate::renderer::sizing::{Point, Rect};

// ============================================================================
// Key Preview
// ============================================================================

/// Enlarged glyph shown above a pressed key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPreview {
    /// Registry index of the key that owns the preview
    pub owner: usize,
    /// Glyph shown, cased as on the key
    pub glyph: String,
    /// Bubble bounds
    pub frame: Rect,
}

impl KeyPreview {
    /// Creates a preview centred above `key_frame`.
    pub fn new(owner: usize, glyph: impl Into<String>, key_frame: Rect) -> Self {
        Self {
            owner,
            glyph: glyph.into(),
            frame: Rect::new(
                key_frame.mid_x() - PREVIEW_SIZE / 2.0,
                key_frame.y - PREVIEW_SIZE - OVERLAY_GAP,
                PREVIEW_SIZE,
                PREVIEW_SIZE,
            ),
        }
    }
}

// ============================================================================
// Alternates Popup
// ============================================================================

/// One selectable cell in the alternates popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupOption {
    /// Text inserted when the option is chosen, cased for the current mode
    pub text: String,
    /// Cell bounds
    pub frame: Rect,
}

/// Popup listing a key's long-press alternates.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternatesPopup {
    /// Registry index of the key that owns the popup
    pub owner: usize,
    /// Panel bounds
    pub frame: Rect,
    /// Options in display order
    pub options: Vec<PopupOption>,
}

impl AlternatesPopup {
    /// Lays out a popup centred above `key_frame`, shifted horizontally to
    /// stay within `surface_width`.
    pub fn new(owner: usize, options: Vec<String>, key_frame: Rect, surface_width: f32) -> Self {
        let count = options.len() as f32;
        let width = if options.is_empty() {
            0.0
        } else {
            count * POPUP_CELL_WIDTH + (count - 1.0) * POPUP_CELL_SPACING
        };

        let mut x = key_frame.mid_x() - width / 2.0;
        if x + width > surface_width {
            x = surface_width - width;
        }
        if x < 0.0 {
            x = 0.0;
        }
        let y = key_frame.y - POPUP_HEIGHT - OVERLAY_GAP;
        let cell_y = y + (POPUP_HEIGHT - POPUP_CELL_HEIGHT) / 2.0;

        let options = options
            .into_iter()
            .enumerate()
            .map(|(index, text)| PopupOption {
                text,
                frame: Rect::new(
                    x + index as f32 * (POPUP_CELL_WIDTH + POPUP_CELL_SPACING),
                    cell_y,
                    POPUP_CELL_WIDTH,
                    POPUP_CELL_HEIGHT,
                ),
            })
            .collect();

        Self {
            owner,
            frame: Rect::new(x, y, width, POPUP_HEIGHT),
            options,
        }
    }

    /// Index of the option under `point`.
    ///
    /// The whole panel height counts, so lifting slightly above or below a
    /// cell still selects it.
    pub fn option_at(&self, point: Point) -> Option<usize> {
        if !self.frame.contains(point) {
            return None;
        }
        self.options.iter().position(|option| {
            point.x >= option.frame.x && point.x < option.frame.max_x()
        })
    }

    /// Returns `true` if `point` is inside the panel.
    pub fn contains(&self, point: Point) -> bool {
        self.frame.contains(point)
    }
}

// ============================================================================
// Timers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingLongPress {
    owner: usize,
    deadline: Instant,
}

/// Delete autorepeat schedule: fires at `started + delay + n * interval` for
/// n = 1, 2, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeleteRepeat {
    started: Instant,
    fired: u32,
}

impl DeleteRepeat {
    fn next_fire(&self) -> Instant {
        self.started
            + Duration::from_millis(DELETE_REPEAT_DELAY_MS)
            + Duration::from_millis(DELETE_REPEAT_INTERVAL_MS) * (self.fired + 1)
    }
}

/// What became due during a [`OverlayManager::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Owner of a long press that crossed the threshold
    pub long_press: Option<usize>,
    /// Number of repeated deletes due
    pub deletes: u32,
}

impl TickOutcome {
    /// Returns `true` if nothing was due.
    pub fn is_empty(&self) -> bool {
        self.long_press.is_none() && self.deletes == 0
    }
}

// ============================================================================
// Overlay Manager
// ============================================================================

/// Owns the preview, popup and per-touch timers.
#[derive(Debug, Clone, Default)]
pub struct OverlayManager {
    preview: Option<KeyPreview>,
    popup: Option<AlternatesPopup>,
    long_press: Option<PendingLongPress>,
    delete_repeat: Option<DeleteRepeat>,
}

impl OverlayManager {
    /// Creates a manager with nothing shown and no timers.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Preview
    // ========================================================================

    /// Shows a preview, replacing any existing one.
    pub fn show_preview(&mut self, preview: KeyPreview) {
        if let Some(old) = self.preview.replace(preview) {
            tracing::trace!("Preview for key #{} replaced", old.owner);
        }
    }

    /// Removes the preview.
    pub fn hide_preview(&mut self) {
        self.preview = None;
    }

    /// Current preview, if shown.
    pub fn preview(&self) -> Option<&KeyPreview> {
        self.preview.as_ref()
    }

    // ========================================================================
    // Long Press and Popup
    // ========================================================================

    /// Starts the long-press timer for a key.
    pub fn schedule_long_press(&mut self, owner: usize, now: Instant) {
        self.long_press = Some(PendingLongPress {
            owner,
            deadline: now + Duration::from_millis(LONG_PRESS_THRESHOLD_MS),
        });
    }

    /// Cancels a pending long press.
    pub fn cancel_long_press(&mut self) {
        self.long_press = None;
    }

    /// Returns `true` if a long press is pending.
    pub fn has_pending_long_press(&self) -> bool {
        self.long_press.is_some()
    }

    /// Opens a popup, replacing any existing one.
    ///
    /// The preview and pending long press are removed.
    pub fn open_popup(&mut self, popup: AlternatesPopup) {
        self.preview = None;
        self.long_press = None;
        tracing::debug!(
            "Alternates popup opened for key #{} with {} options",
            popup.owner,
            popup.options.len()
        );
        self.popup = Some(popup);
    }

    /// Closes the popup.
    pub fn dismiss_popup(&mut self) {
        if self.popup.take().is_some() {
            tracing::debug!("Alternates popup dismissed");
        }
    }

    /// Current popup, if open.
    pub fn popup(&self) -> Option<&AlternatesPopup> {
        self.popup.as_ref()
    }

    // ========================================================================
    // Delete Autorepeat
    // ========================================================================

    /// Starts the delete autorepeat schedule.
    pub fn start_delete_repeat(&mut self, now: Instant) {
        self.delete_repeat = Some(DeleteRepeat {
            started: now,
            fired: 0,
        });
    }

    /// Stops delete autorepeat. Nothing further is emitted.
    pub fn stop_delete_repeat(&mut self) {
        self.delete_repeat = None;
    }

    /// Returns `true` while delete autorepeat is scheduled.
    pub fn delete_repeat_active(&self) -> bool {
        self.delete_repeat.is_some()
    }

    // ========================================================================
    // Deadlines
    // ========================================================================

    /// Earliest pending deadline, if any timer is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        let long_press = self.long_press.map(|pending| pending.deadline);
        let delete = self.delete_repeat.map(|repeat| repeat.next_fire());
        match (long_press, delete) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires every deadline at or before `now`.
    ///
    /// A long press that becomes due is removed from the schedule and
    /// reported once. Every missed delete repeat is counted.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if let Some(pending) = self.long_press
            && pending.deadline <= now
        {
            self.long_press = None;
            outcome.long_press = Some(pending.owner);
        }

        if let Some(repeat) = self.delete_repeat.as_mut() {
            while repeat.next_fire() <= now {
                repeat.fired += 1;
                outcome.deletes += 1;
            }
        }

        outcome
    }

    /// Removes the preview, popup and pending long press.
    ///
    /// Delete autorepeat belongs to the held key rather than the layout, so it
    /// keeps running.
    pub fn clear_transient(&mut self) {
        self.preview = None;
        self.popup = None;
        self.long_press = None;
    }

    /// Removes every overlay and cancels every timer.
    pub fn clear_all(&mut self) {
        self.clear_transient();
        self.delete_repeat = None;
    }

    /// Returns `true` if nothing is shown and no timer is running.
    pub fn is_idle(&self) -> bool {
        self.preview.is_none()
            && self.popup.is_none()
            && self.long_press.is_none()
            && self.delete_repeat.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
