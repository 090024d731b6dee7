// SPDX-License-Identifier: GPL-3.0-only

//! Input handling for the Galaxy keyboard.
//!
//! This module turns raw touches into keys and keys into mode transitions.
//!
//! # Features
//!
//! - **Touch resolution**: Gap-tolerant mapping of a touch point to a key,
//!   using per-class hit-region insets and a vertical bias
//! - **Mode state**: Shift, caps lock, symbol pages and language, with
//!   double-tap caps lock and one-shot shift
//! - **Auto-capitalization**: Shift turns on at the start of a sentence
//!
//! # Example Usage
//!
//! ## Resolving a Touch
//!
//! ```rust,ignore
//! use galaxy_keyboard::config::TouchDetectionConfig;
//! use galaxy_keyboard::input::{resolve, HitKind};
//! use galaxy_keyboard::renderer::sizing::Point;
//!
//! let config = TouchDetectionConfig::default();
//! if let Some(hit) = resolve(Point::new(120.0, 30.0), view.keys(), &config) {
//!     println!("key #{} ({:?})", hit.index, hit.kind);
//! }
//! ```
//!
//! ## Tracking Mode
//!
//! ```rust,ignore
//! use galaxy_keyboard::input::InputModeState;
//!
//! let mut state = InputModeState::default();
//! state.apply_auto_capitalization(sink.text_before_cursor().as_deref());
//! let text = state.emit_letter("q");
//! ```

// Sub-modules
pub mod autocap;
pub mod mode;
pub mod touch;

// Re-export public API
pub use autocap::should_auto_capitalize;
pub use mode::{InputModeState, ShiftState};
pub use touch::{biased_distance, hit_region, resolve, HitKind, Resolution, TouchTarget};

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    /// Auto-capitalization runs after an emission and picks up the sentence
    /// start the emission created.
    #[test]
    fn test_sentence_end_reenables_shift() {
        let mut state = InputModeState::default();
        let mut text = String::from("Hi");

        text.push_str(&state.emit_letter("."));
        state.apply_auto_capitalization(Some(&text));
        assert_eq!(state.shift(), ShiftState::Off);

        text.push(' ');
        state.apply_auto_capitalization(Some(&text));
        assert_eq!(state.shift(), ShiftState::On);

        text.push_str(&state.emit_letter("n"));
        assert_eq!(text, "Hi. N");
        assert_eq!(state.shift(), ShiftState::Off);
    }

    /// An explicit shift-off wins until the next text change.
    #[test]
    fn test_explicit_shift_off_is_kept() {
        let mut state = InputModeState::default();
        state.apply_auto_capitalization(None);
        assert_eq!(state.shift(), ShiftState::On);

        state.press_shift(Instant::now());
        assert_eq!(state.shift(), ShiftState::Off);
        assert_eq!(state.emit_letter("x"), "x");
    }
}
