// SPDX-License-Identifier: GPL-3.0-only

//! Input mode state machine.
//!
//! [`InputModeState`] tracks shift, caps lock, the symbol pages and the active
//! language. It decides how letters are cased when emitted and which layout
//! the key registry is generated from.
//!
//! Shift has three states:
//!
//! - **Off**: letters are lowercase
//! - **On** (one-shot): the next letter is uppercase, then shift turns off
//! - **Locked** (caps lock): letters stay uppercase until shift is pressed again
//!
//! Caps lock is only reachable by pressing shift twice within
//! [`DOUBLE_TAP_WINDOW_MS`](crate::app_settings::DOUBLE_TAP_WINDOW_MS).
//!
//! # Example
//!
//! ```rust,ignore
//! use galaxy_keyboard::input::{InputModeState, ShiftState};
//! use galaxy_keyboard::layout::Language;
//! use std::time::Instant;
//!
//! let mut state = InputModeState::new(Language::English);
//! state.press_shift(Instant::now());
//! assert_eq!(state.emit_letter("t"), "T");
//! assert_eq!(state.shift(), ShiftState::Off);
//! ```

use std::time::{Duration, Instant};

use crate::app_settings::DOUBLE_TAP_WINDOW_MS;
use crate::input::autocap::should_auto_capitalize;
use crate::layout::{Language, Layer};

/// Shift key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftState {
    /// Lowercase
    #[default]
    Off,
    /// Uppercase for the next letter only
    On,
    /// Uppercase until shift is pressed again
    Locked,
}

impl ShiftState {
    /// Returns `true` if letters are displayed and emitted uppercase.
    pub fn is_uppercase(self) -> bool {
        matches!(self, ShiftState::On | ShiftState::Locked)
    }
}

/// The keyboard's mode: casing, symbol pages and language.
///
/// The extended symbols page can only be active while symbols are active; the
/// mutators keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputModeState {
    shift: ShiftState,
    symbols: bool,
    extended: bool,
    language: Language,
    last_shift_press: Option<Instant>,
}

impl Default for InputModeState {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl InputModeState {
    /// Creates the initial state: letters, shift off.
    pub fn new(language: Language) -> Self {
        Self {
            shift: ShiftState::Off,
            symbols: false,
            extended: false,
            language,
            last_shift_press: None,
        }
    }

    /// Current shift state.
    pub fn shift(&self) -> ShiftState {
        self.shift
    }

    /// Returns `true` if letters are currently uppercase.
    pub fn is_uppercase(&self) -> bool {
        self.shift.is_uppercase()
    }

    /// Returns `true` if caps lock is engaged.
    pub fn is_caps_locked(&self) -> bool {
        self.shift == ShiftState::Locked
    }

    /// Returns `true` if a symbols page is shown.
    pub fn symbols_active(&self) -> bool {
        self.symbols
    }

    /// Returns `true` if the second symbols page is shown.
    pub fn extended_active(&self) -> bool {
        self.extended
    }

    /// Active language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Layer the key registry should be generated from.
    pub fn layer(&self) -> Layer {
        match (self.symbols, self.extended) {
            (false, _) => Layer::Letters,
            (true, false) => Layer::Symbols1,
            (true, true) => Layer::Symbols2,
        }
    }

    /// Returns `true` if `other` would generate a different key registry.
    ///
    /// The shift timestamp is the only field that never affects the keys.
    pub fn affects_keys(&self, other: &InputModeState) -> bool {
        self.shift != other.shift
            || self.symbols != other.symbols
            || self.extended != other.extended
            || self.language != other.language
    }

    /// Applies the current casing to a letter identity.
    pub fn display_glyph(&self, identity: &str) -> String {
        if self.is_uppercase() {
            identity.to_uppercase()
        } else {
            identity.to_lowercase()
        }
    }

    /// Returns the text a letter key emits and consumes one-shot shift.
    pub fn emit_letter(&mut self, identity: &str) -> String {
        let text = self.display_glyph(identity);
        if self.shift == ShiftState::On {
            self.shift = ShiftState::Off;
            tracing::debug!("One-shot shift consumed by '{}'", text);
        }
        text
    }

    /// Handles a shift key press at `now`.
    ///
    /// A press while shift is on and within the double-tap window of the
    /// previous press engages caps lock. A press while locked turns shift off.
    /// Otherwise shift toggles between off and on.
    pub fn press_shift(&mut self, now: Instant) {
        let window = Duration::from_millis(DOUBLE_TAP_WINDOW_MS);
        let double_tap = self
            .last_shift_press
            .is_some_and(|last| now.saturating_duration_since(last) < window);

        self.shift = match self.shift {
            ShiftState::On if double_tap => ShiftState::Locked,
            ShiftState::Locked => ShiftState::Off,
            ShiftState::On => ShiftState::Off,
            ShiftState::Off => ShiftState::On,
        };
        self.last_shift_press = Some(now);

        tracing::debug!("Shift pressed, now {:?}", self.shift);
    }

    /// Flips between letters and the first symbols page.
    pub fn toggle_symbols(&mut self) {
        self.symbols = !self.symbols;
        self.extended = false;
        tracing::debug!("Symbols {}", if self.symbols { "on" } else { "off" });
    }

    /// Flips between the two symbols pages.
    ///
    /// Returns `false` without changing anything when symbols are not active.
    pub fn toggle_extended(&mut self) -> bool {
        if !self.symbols {
            tracing::warn!("Extended symbols toggle ignored outside symbols mode");
            return false;
        }
        self.extended = !self.extended;
        tracing::debug!("Symbols page {}", if self.extended { 2 } else { 1 });
        true
    }

    /// Switches to the next language and clears shift and caps lock.
    ///
    /// The caller re-evaluates auto-capitalization afterwards.
    pub fn switch_language(&mut self) {
        self.language = self.language.next();
        self.shift = ShiftState::Off;
        tracing::debug!("Language switched to {}", self.language);
    }

    /// Turns shift on if `context` is at a sentence start.
    ///
    /// Never turns shift off, never touches caps lock, and does nothing while
    /// symbols are active. Returns `true` if the state changed.
    pub fn apply_auto_capitalization(&mut self, context: Option<&str>) -> bool {
        if self.symbols || self.shift != ShiftState::Off {
            return false;
        }
        if should_auto_capitalize(context) {
            self.shift = ShiftState::On;
            tracing::debug!("Auto-capitalization turned shift on");
            return true;
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Test 1: One-shot shift
    ///
    /// Shift then one letter emits uppercase and returns to lowercase.
    #[test]
    fn test_one_shot_shift() {
        let now = Instant::now();
        let mut state = InputModeState::new(Language::English);

        state.press_shift(now);
        assert_eq!(state.shift(), ShiftState::On);
        assert_eq!(state.emit_letter("t"), "T");
        assert_eq!(state.shift(), ShiftState::Off);
        assert!(!state.is_caps_locked());
        assert_eq!(state.emit_letter("e"), "e");
    }

    /// Test 2: Double tap engages caps lock, third tap releases it
    #[test]
    fn test_double_tap_caps_lock() {
        let start = Instant::now();
        let mut state = InputModeState::new(Language::English);

        state.press_shift(start);
        state.press_shift(start + ms(300));
        assert_eq!(state.shift(), ShiftState::Locked);

        assert_eq!(state.emit_letter("a"), "A");
        assert_eq!(state.emit_letter("b"), "B");
        assert!(state.is_caps_locked());

        state.press_shift(start + ms(400));
        assert_eq!(state.shift(), ShiftState::Off);
    }

    /// Test 3: A slow second tap toggles shift off instead of locking
    #[test]
    fn test_slow_second_tap() {
        let start = Instant::now();
        let mut state = InputModeState::new(Language::English);

        state.press_shift(start);
        state.press_shift(start + ms(DOUBLE_TAP_WINDOW_MS));
        assert_eq!(state.shift(), ShiftState::Off);

        // The slow tap still counts as the previous press
        state.press_shift(start + ms(DOUBLE_TAP_WINDOW_MS + 600));
        assert_eq!(state.shift(), ShiftState::On);
    }

    /// Test 4: Auto-cap on without a recent shift press does not lock
    #[test]
    fn test_auto_cap_then_shift_turns_off() {
        let mut state = InputModeState::new(Language::English);
        assert!(state.apply_auto_capitalization(Some("")));

        state.press_shift(Instant::now());
        assert_eq!(state.shift(), ShiftState::Off);
    }

    #[test]
    fn test_auto_cap_never_forces_off_or_overrides_lock() {
        let start = Instant::now();
        let mut state = InputModeState::new(Language::English);

        state.press_shift(start);
        assert!(!state.apply_auto_capitalization(Some("Hello ")));
        assert_eq!(state.shift(), ShiftState::On);

        state.press_shift(start + ms(100));
        assert!(!state.apply_auto_capitalization(Some("")));
        assert_eq!(state.shift(), ShiftState::Locked);
    }

    #[test]
    fn test_auto_cap_suspended_in_symbols() {
        let mut state = InputModeState::new(Language::English);
        state.toggle_symbols();

        assert!(!state.apply_auto_capitalization(None));
        assert_eq!(state.shift(), ShiftState::Off);
    }

    #[test]
    fn test_symbol_pages() {
        let mut state = InputModeState::new(Language::Russian);
        assert_eq!(state.layer(), Layer::Letters);

        assert!(!state.toggle_extended());
        assert_eq!(state.layer(), Layer::Letters);

        state.toggle_symbols();
        assert_eq!(state.layer(), Layer::Symbols1);
        assert!(state.toggle_extended());
        assert_eq!(state.layer(), Layer::Symbols2);

        // Leaving symbols clears the extended page
        state.toggle_symbols();
        assert_eq!(state.layer(), Layer::Letters);
        assert!(!state.extended_active());

        state.toggle_symbols();
        assert_eq!(state.layer(), Layer::Symbols1);
    }

    #[test]
    fn test_language_switch_clears_caps() {
        let start = Instant::now();
        let mut state = InputModeState::new(Language::English);
        state.press_shift(start);
        state.press_shift(start + ms(100));
        assert!(state.is_caps_locked());

        state.switch_language();
        assert_eq!(state.language(), Language::Russian);
        assert_eq!(state.shift(), ShiftState::Off);
        assert_eq!(state.display_glyph("ж"), "ж");
    }

    #[test]
    fn test_affects_keys_ignores_timestamp() {
        let start = Instant::now();
        let mut a = InputModeState::new(Language::English);
        a.press_shift(start);
        let mut b = a.clone();
        b.last_shift_press = Some(start + ms(50));

        assert!(!a.affects_keys(&b));

        b.toggle_symbols();
        assert!(a.affects_keys(&b));
    }
}
