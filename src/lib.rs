// SPDX-License-Identifier: GPL-3.0-only

//! Galaxy Keyboard - the input core of a two-language soft keyboard
//!
//! This crate contains everything a soft keyboard needs between a raw touch
//! point and a text edit: the key catalog, gap-tolerant touch resolution, the
//! shift/caps/symbols/language state machine with auto-capitalization, and the
//! transient overlays (key preview, long-press alternates, delete autorepeat).
//!
//! # Architecture
//!
//! The host embeds a [`keyboard::Keyboard`] and forwards touches and lifecycle
//! callbacks to it. The keyboard edits text only through a [`sink::TextSink`]
//! and asks its host to switch keyboards through a [`sink::KeyboardHost`].
//! Timers are deadlines: the host sleeps until [`keyboard::Keyboard::next_deadline`]
//! and calls `tick`, or lets [`driver::SessionDriver`] do that on a tokio task.
//!
//! # Modules
//!
//! - `app_settings`: Timing and geometry constants
//! - `config`: Session configuration (touch insets, key metrics, language)
//! - `driver`: Single-task session loop over a futures channel
//! - `input`: Touch resolution, input mode state machine and auto-capitalization
//! - `keyboard`: The session controller tying everything together
//! - `layout`: Embedded layout catalog and its validation
//! - `renderer`: Key registry, palettes and overlay geometry
//! - `replay`: Headless replay of timed touch scripts
//! - `sink`: Host collaborator traits and in-memory implementations

pub mod app_settings;
pub mod config;
pub mod driver;
pub mod input;
pub mod keyboard;
pub mod layout;
pub mod renderer;
pub mod replay;
pub mod sink;

// ============================================================================
// Integration Tests
// ============================================================================
