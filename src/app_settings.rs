// SPDX-License-Identifier: GPL-3.0-only

//! Centralized keyboard settings and constants.

/// Window within which a second shift tap engages caps lock, in milliseconds.
pub const DOUBLE_TAP_WINDOW_MS: u64 = 500;

/// Hold duration before the alternates popup opens, in milliseconds.
pub const LONG_PRESS_THRESHOLD_MS: u64 = 500;

/// Hold duration before delete starts repeating, in milliseconds.
pub const DELETE_REPEAT_DELAY_MS: u64 = 500;

/// Interval between repeated deletes, in milliseconds.
pub const DELETE_REPEAT_INTERVAL_MS: u64 = 100;

/// Minimum horizontal travel on the spacebar that counts as a language swipe.
pub const SPACE_SWIPE_MIN_DISTANCE: f32 = 30.0;

/// Default key height in points.
pub const DEFAULT_KEY_HEIGHT: f32 = 45.0;

/// Default vertical spacing between rows in points.
pub const DEFAULT_ROW_SPACING: f32 = 10.0;

/// Default horizontal spacing between keys in points.
pub const DEFAULT_KEY_SPACING: f32 = 6.0;

/// Default inset from the left and right surface edges in points.
pub const DEFAULT_SIDE_INSET: f32 = 4.0;

/// Default inset from the top surface edge in points.
pub const DEFAULT_TOP_INSET: f32 = 8.0;

/// Default keyboard surface width in points.
pub const DEFAULT_SURFACE_WIDTH: f32 = 375.0;

/// Side length of the key preview bubble in points.
pub const PREVIEW_SIZE: f32 = 60.0;

/// Gap between the top of a key and its preview or popup in points.
pub const OVERLAY_GAP: f32 = 10.0;

/// Width of one option cell in the alternates popup in points.
pub const POPUP_CELL_WIDTH: f32 = 60.0;

/// Height of an option cell in the alternates popup in points.
pub const POPUP_CELL_HEIGHT: f32 = 40.0;

/// Spacing between option cells in the alternates popup in points.
pub const POPUP_CELL_SPACING: f32 = 10.0;

/// Height of the alternates popup panel in points.
pub const POPUP_HEIGHT: f32 = 60.0;
