// SPDX-License-Identifier: GPL-3.0-only

//! The keyboard controller.
//!
//! [`Keyboard`] owns one session: the catalog, the mode state, the key
//! registry, the overlays and the host collaborators. Hosts feed it touch,
//! timer and lifecycle events; it resolves touches, applies transitions,
//! writes to the [`TextSink`] and regenerates the registry when the mode
//! changes.
//!
//! # Gestures
//!
//! A gesture runs from `touch_down` to `touch_up` or `touch_cancel`. The key
//! under the initial touch owns it for its whole lifetime, even if the
//! registry is regenerated while the finger is down.
//!
//! - Delete deletes on touch down and starts autorepeat
//! - Glyph keys show a preview on touch down and, if they have alternates,
//!   start the long-press timer
//! - Everything else acts on touch up, if the touch is still on the key
//! - Dragging off the key cancels the gesture for good
//!
//! A touch is on its key while inside the key's hit region. A key reached
//! across a gap also keeps the touch while it stays within the gap radius and
//! no other key is hit directly.
//! - A horizontal swipe on the spacebar switches language and consumes the
//!   gesture
//!
//! Every event carries its own timestamp. Timers due at or before that time
//! fire before the event itself is handled.

use std::time::Instant;

use crate::app_settings::SPACE_SWIPE_MIN_DISTANCE;
use crate::config::{KeyMetrics, KeyboardConfig, TouchDetectionConfig};
use crate::input::{biased_distance, hit_region, resolve, HitKind, InputModeState};
use crate::layout::{KeyClass, LayoutCatalog, LayoutError, ModifierFunction};
use crate::renderer::{
    key_styles, AlternatesPopup, HitZone, Key, KeyPreview, KeyStyle, KeyboardView,
    OverlayManager, Palette, Point, PopupStyle, RenderedKey,
};
use crate::sink::{KeyboardHost, TextSink};

/// The key that owns a gesture, as it was when the touch began.
#[derive(Debug, Clone)]
struct TouchedKey {
    index: usize,
    rendered: RenderedKey,
    kind: HitKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GesturePhase {
    /// The owner will be activated if the touch lifts inside it
    Pressed,
    /// The alternates popup is open; lifting selects or dismisses
    Selecting,
    /// Nothing happens on lift
    Consumed,
}

#[derive(Debug, Clone)]
struct Gesture {
    owner: Option<TouchedKey>,
    origin: Point,
    phase: GesturePhase,
}

impl Gesture {
    fn new(owner: Option<TouchedKey>, origin: Point, phase: GesturePhase) -> Self {
        Self {
            owner,
            origin,
            phase,
        }
    }
}

enum MoveOutcome {
    Stay,
    LanguageSwipe,
    DragOut,
}

/// One keyboard session.
pub struct Keyboard<S, H> {
    catalog: LayoutCatalog,
    touch: TouchDetectionConfig,
    pending_touch: Option<TouchDetectionConfig>,
    metrics: KeyMetrics,
    state: InputModeState,
    view: KeyboardView,
    overlays: OverlayManager,
    palette: Palette,
    gesture: Option<Gesture>,
    active: bool,
    sink: S,
    host: H,
}

impl<S: TextSink, H: KeyboardHost> Keyboard<S, H> {
    /// Creates an inactive session.
    ///
    /// The registry is generated immediately, so a catalog missing the initial
    /// language's letters is rejected here.
    pub fn new(
        catalog: LayoutCatalog,
        config: KeyboardConfig,
        sink: S,
        host: H,
    ) -> Result<Self, LayoutError> {
        let state = InputModeState::new(config.language);
        let view = KeyboardView::generate(
            &catalog,
            &state,
            &config.metrics,
            host.needs_input_mode_switch_key(),
        )?;
        let palette = Palette::for_appearance(sink.appearance_is_dark());

        Ok(Self {
            catalog,
            touch: config.touch,
            pending_touch: None,
            metrics: config.metrics,
            state,
            view,
            overlays: OverlayManager::new(),
            palette,
            gesture: None,
            active: false,
            sink,
            host,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// The keyboard is shown: refresh the theme and run auto-capitalization.
    pub fn become_active(&mut self, now: Instant) {
        self.fire_due(now);
        self.active = true;
        self.palette = Palette::for_appearance(self.sink.appearance_is_dark());
        self.after_text_change();
        self.regenerate();
        tracing::info!(
            "Keyboard active ({}, {:?})",
            self.state.language(),
            self.state.shift()
        );
    }

    /// The keyboard is about to be hidden: drop the gesture, overlays and timers.
    pub fn will_deactivate(&mut self) {
        self.gesture = None;
        self.overlays.clear_all();
        self.apply_pending_touch_config();
        self.active = false;
        tracing::info!("Keyboard deactivated");
    }

    /// The host's document or focus changed.
    pub fn text_did_change(&mut self) {
        let before = self.state.clone();
        self.palette = Palette::for_appearance(self.sink.appearance_is_dark());
        self.after_text_change();
        self.sync_view(&before);
    }

    /// The surface width changed.
    pub fn resize(&mut self, surface_width: f32) {
        if !(surface_width > 0.0) {
            tracing::warn!("Ignoring resize to width {}", surface_width);
            return;
        }
        self.metrics.surface_width = surface_width;
        self.regenerate();
    }

    /// Replaces the touch configuration.
    ///
    /// While a touch is in progress the new config is held back until it ends.
    pub fn set_touch_config(&mut self, config: TouchDetectionConfig) {
        if self.gesture.is_some() {
            tracing::debug!("Touch config change deferred until the touch ends");
            self.pending_touch = Some(config);
        } else {
            self.touch = config;
        }
    }

    // ========================================================================
    // Touch Events
    // ========================================================================

    /// A finger touched the surface.
    pub fn touch_down(&mut self, point: Point, now: Instant) {
        if !self.active {
            tracing::debug!("Touch down ignored while inactive");
            return;
        }
        let before = self.state.clone();
        self.fire_due(now);

        if self.gesture.take().is_some() {
            tracing::warn!("Touch down before the previous touch ended; abandoning it");
            self.overlays.hide_preview();
            self.overlays.cancel_long_press();
            self.overlays.stop_delete_repeat();
        }

        let gesture = self.begin_gesture(point, now);
        self.gesture = Some(gesture);
        self.sync_view(&before);
    }

    /// The finger moved.
    pub fn touch_move(&mut self, point: Point, now: Instant) {
        if !self.active {
            return;
        }
        let before = self.state.clone();
        self.fire_due(now);

        match self.classify_move(point) {
            MoveOutcome::Stay => {}
            MoveOutcome::LanguageSwipe => {
                self.consume_gesture();
                self.overlays.hide_preview();
                self.overlays.cancel_long_press();
                self.apply_language_switch();
            }
            MoveOutcome::DragOut => {
                self.consume_gesture();
                self.overlays.hide_preview();
                self.overlays.cancel_long_press();
                self.overlays.stop_delete_repeat();
                tracing::debug!("Touch dragged off its key");
            }
        }

        self.sync_view(&before);
    }

    /// The finger lifted.
    pub fn touch_up(&mut self, point: Point, now: Instant) {
        if !self.active {
            return;
        }
        let before = self.state.clone();
        self.fire_due(now);

        if let Some(gesture) = self.gesture.take() {
            self.overlays.hide_preview();
            self.overlays.cancel_long_press();
            self.overlays.stop_delete_repeat();

            match gesture.phase {
                GesturePhase::Consumed => {}
                GesturePhase::Selecting => self.finish_selection(point),
                GesturePhase::Pressed => {
                    if let Some(touched) = gesture.owner {
                        if self.owns_point(&touched, point) {
                            self.activate(&touched.rendered.key, now);
                        } else {
                            tracing::debug!(
                                "Touch lifted off '{}'; not activated",
                                touched.rendered.key.identity
                            );
                        }
                    }
                }
            }
        }

        self.apply_pending_touch_config();
        self.sync_view(&before);
    }

    /// The host cancelled the touch. Nothing is emitted.
    pub fn touch_cancel(&mut self, now: Instant) {
        if !self.active {
            return;
        }
        let before = self.state.clone();
        self.fire_due(now);

        if self.gesture.take().is_some() {
            self.overlays.clear_all();
            tracing::debug!("Touch cancelled");
        }

        self.apply_pending_touch_config();
        self.sync_view(&before);
    }

    /// Fires every timer due at or before `now`.
    pub fn tick(&mut self, now: Instant) {
        if !self.active {
            return;
        }
        let before = self.state.clone();
        self.fire_due(now);
        self.sync_view(&before);
    }

    /// Switches to the next language, as a spacebar swipe does.
    pub fn switch_language(&mut self) {
        let before = self.state.clone();
        self.apply_language_switch();
        self.sync_view(&before);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current mode.
    pub fn state(&self) -> &InputModeState {
        &self.state
    }

    /// Current key registry.
    pub fn view(&self) -> &KeyboardView {
        &self.view
    }

    /// Current overlays.
    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.overlays.next_deadline()
    }

    /// Current palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Styles for every key in registry order.
    pub fn key_styles(&self) -> Vec<KeyStyle> {
        key_styles(&self.palette, &self.view, &self.state)
    }

    /// Colours of the key preview, if one is shown.
    pub fn preview_style(&self) -> Option<KeyStyle> {
        self.overlays
            .preview()
            .map(|_| self.palette.preview_style())
    }

    /// Colours of the alternates popup, if one is open.
    pub fn popup_style(&self) -> Option<PopupStyle> {
        self.overlays
            .popup()
            .map(|popup| self.palette.popup_style(popup.options.len()))
    }

    /// Debug hit-zone overlay, empty unless enabled in the touch config.
    pub fn hit_zones(&self) -> Vec<HitZone> {
        self.view.hit_zones(&self.touch)
    }

    /// Touch configuration in effect.
    pub fn touch_config(&self) -> &TouchDetectionConfig {
        &self.touch
    }

    /// Layout metrics in effect.
    pub fn metrics(&self) -> &KeyMetrics {
        &self.metrics
    }

    /// Returns `true` between `become_active` and `will_deactivate`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` while a touch is in progress.
    pub fn is_touching(&self) -> bool {
        self.gesture.is_some()
    }

    /// The text sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The text sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn begin_gesture(&mut self, point: Point, now: Instant) -> Gesture {
        if let Some(popup) = self.overlays.popup() {
            // Spacing between options still belongs to the popup
            if popup.contains(point) {
                return Gesture::new(None, point, GesturePhase::Selecting);
            }
            self.overlays.dismiss_popup();
            return Gesture::new(None, point, GesturePhase::Consumed);
        }

        let Some(resolution) = resolve(point, self.view.keys(), &self.touch) else {
            tracing::trace!("Touch dropped: no key nearby");
            return Gesture::new(None, point, GesturePhase::Consumed);
        };
        let Some(rendered) = self.view.key(resolution.index).cloned() else {
            return Gesture::new(None, point, GesturePhase::Consumed);
        };
        let index = resolution.index;
        let kind = resolution.kind;

        match rendered.key.class {
            KeyClass::Modifier(ModifierFunction::Delete) => {
                self.sink.delete_backward();
                self.after_text_change();
                self.overlays.start_delete_repeat(now);
            }
            class if class.shows_preview() => {
                self.overlays.show_preview(KeyPreview::new(
                    index,
                    rendered.key.display.clone(),
                    rendered.frame,
                ));
                if rendered.key.has_alternates() {
                    self.overlays.schedule_long_press(index, now);
                }
            }
            _ => {}
        }

        Gesture::new(
            Some(TouchedKey {
                index,
                rendered,
                kind,
            }),
            point,
            GesturePhase::Pressed,
        )
    }

    fn classify_move(&self, point: Point) -> MoveOutcome {
        let Some(gesture) = self.gesture.as_ref() else {
            return MoveOutcome::Stay;
        };
        if gesture.phase != GesturePhase::Pressed {
            return MoveOutcome::Stay;
        }
        let Some(touched) = gesture.owner.as_ref() else {
            return MoveOutcome::Stay;
        };

        if touched.rendered.key.class == KeyClass::Spacebar
            && (point.x - gesture.origin.x).abs() >= SPACE_SWIPE_MIN_DISTANCE
        {
            return MoveOutcome::LanguageSwipe;
        }
        if !self.owns_point(touched, point) {
            return MoveOutcome::DragOut;
        }
        MoveOutcome::Stay
    }

    /// Returns `true` if `point` still counts as being on the gesture's key.
    ///
    /// A key reached across a gap keeps the touch while it stays within the
    /// gap radius and no other key is hit directly.
    fn owns_point(&self, touched: &TouchedKey, point: Point) -> bool {
        if hit_region(&touched.rendered, &self.touch).contains(point) {
            return true;
        }
        if touched.kind == HitKind::Direct {
            return false;
        }

        match resolve(point, self.view.keys(), &self.touch) {
            Some(resolution) if resolution.kind == HitKind::Direct => {
                resolution.index == touched.index
            }
            _ => {
                biased_distance(point, touched.rendered.frame.center(), &self.touch)
                    <= self.touch.max_gap_detection_distance
            }
        }
    }

    fn consume_gesture(&mut self) {
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.phase = GesturePhase::Consumed;
        }
    }

    fn fire_due(&mut self, now: Instant) {
        let outcome = self.overlays.tick(now);

        if outcome.deletes > 0 {
            tracing::trace!("{} repeated delete(s)", outcome.deletes);
        }
        for _ in 0..outcome.deletes {
            self.sink.delete_backward();
            self.after_text_change();
        }

        if let Some(owner) = outcome.long_press {
            self.open_alternates(owner);
        }
    }

    fn open_alternates(&mut self, owner: usize) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        if gesture.phase != GesturePhase::Pressed {
            return;
        }
        let Some(touched) = gesture.owner.as_ref().filter(|touched| touched.index == owner) else {
            return;
        };

        let options = touched
            .rendered
            .key
            .alternates
            .iter()
            .map(|alternate| self.state.display_glyph(alternate))
            .collect();
        let popup = AlternatesPopup::new(
            owner,
            options,
            touched.rendered.frame,
            self.metrics.surface_width,
        );

        gesture.phase = GesturePhase::Selecting;
        self.overlays.open_popup(popup);
    }

    fn finish_selection(&mut self, point: Point) {
        let choice = self.overlays.popup().and_then(|popup| {
            popup
                .option_at(point)
                .and_then(|index| popup.options.get(index))
                .map(|option| option.text.clone())
        });
        self.overlays.dismiss_popup();

        match choice {
            Some(alternate) => {
                let text = self.state.emit_letter(&alternate);
                tracing::debug!("Alternate '{}' selected", text);
                self.insert(&text);
            }
            None => tracing::debug!("Popup closed without a selection"),
        }
    }

    fn activate(&mut self, key: &Key, now: Instant) {
        tracing::debug!("Activated '{}'", key.identity);
        match key.class {
            KeyClass::Letter => {
                let text = self.state.emit_letter(&key.identity);
                self.insert(&text);
            }
            KeyClass::Digit | KeyClass::Symbol => self.insert(&key.identity),
            KeyClass::Spacebar => self.insert(" "),
            KeyClass::Enter => self.insert("\n"),
            KeyClass::Globe => {
                tracing::info!("Switching to the next system keyboard");
                self.host.advance_to_next_input_mode();
            }
            KeyClass::Modifier(ModifierFunction::Shift) => self.state.press_shift(now),
            KeyClass::Modifier(ModifierFunction::SymbolsToggle) => self.state.toggle_symbols(),
            KeyClass::Modifier(ModifierFunction::ExtendedToggle) => {
                self.state.toggle_extended();
            }
            // Delete acts on touch down
            KeyClass::Modifier(ModifierFunction::Delete) => {}
        }
    }

    fn insert(&mut self, text: &str) {
        self.sink.insert_text(text);
        self.after_text_change();
    }

    fn after_text_change(&mut self) {
        let context = self.sink.text_before_cursor();
        self.state.apply_auto_capitalization(context.as_deref());
    }

    fn apply_language_switch(&mut self) {
        self.state.switch_language();
        self.after_text_change();
    }

    fn apply_pending_touch_config(&mut self) {
        if let Some(config) = self.pending_touch.take() {
            tracing::debug!("Applying deferred touch config");
            self.touch = config;
        }
    }

    fn sync_view(&mut self, before: &InputModeState) {
        if before.affects_keys(&self.state) {
            self.regenerate();
        }
    }

    fn regenerate(&mut self) {
        self.overlays.clear_transient();
        let include_globe = self.host.needs_input_mode_switch_key();
        if let Err(err) =
            self.view
                .regenerate(&self.catalog, &self.state, &self.metrics, include_globe)
        {
            tracing::error!("Failed to regenerate keys, keeping the previous set: {}", err);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ShiftState;
    use crate::layout::{Language, Layer};
    use crate::sink::{MemoryHost, MemorySink};
    use std::time::Duration;

    type TestKeyboard = Keyboard<MemorySink, MemoryHost>;

    fn keyboard_with(text: &str, language: Language, start: Instant) -> TestKeyboard {
        let config = KeyboardConfig {
            language,
            ..KeyboardConfig::default()
        };
        let mut keyboard = Keyboard::new(
            LayoutCatalog::builtin().unwrap(),
            config,
            MemorySink::new(text),
            MemoryHost::new(true),
        )
        .unwrap();
        keyboard.become_active(start);
        keyboard
    }

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    fn center(keyboard: &TestKeyboard, identity: &str) -> Point {
        keyboard
            .view()
            .find(identity)
            .unwrap_or_else(|| panic!("no key '{}'", identity))
            .frame
            .center()
    }

    fn tap(keyboard: &mut TestKeyboard, identity: &str, now: Instant) {
        let point = center(keyboard, identity);
        keyboard.touch_down(point, now);
        keyboard.touch_up(point, now);
    }

    /// Test 1: Session start capitalizes the first letter only
    #[test]
    fn test_first_letter_capitalized() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("", Language::English, start);
        assert_eq!(keyboard.state().shift(), ShiftState::On);
        assert_eq!(keyboard.view().find("t").unwrap().key.display, "T");

        tap(&mut keyboard, "t", at(start, 100));
        assert_eq!(keyboard.state().shift(), ShiftState::Off);
        assert_eq!(keyboard.view().find("t").unwrap().key.display, "t");

        tap(&mut keyboard, "e", at(start, 200));
        assert_eq!(keyboard.sink().text(), "Te");
    }

    /// Test 2: Space, enter, digits and symbols
    #[test]
    fn test_other_classes_emit() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("ok", Language::English, start);

        tap(&mut keyboard, "7", at(start, 10));
        tap(&mut keyboard, ",", at(start, 20));
        tap(&mut keyboard, "space", at(start, 30));
        tap(&mut keyboard, "enter", at(start, 40));
        assert_eq!(keyboard.sink().text(), "ok7, \n");
        // The newline re-enabled shift
        assert_eq!(keyboard.state().shift(), ShiftState::On);
    }

    /// Test 3: Delete autorepeat emits exactly on schedule
    #[test]
    fn test_delete_autorepeat() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("abcdefgh", Language::English, start);
        let delete = center(&keyboard, "delete");

        keyboard.touch_down(delete, start);
        assert_eq!(keyboard.sink().delete_count(), 1);

        keyboard.tick(at(start, 500));
        assert_eq!(keyboard.sink().delete_count(), 1);

        keyboard.tick(at(start, 600));
        keyboard.tick(at(start, 700));
        keyboard.touch_up(delete, at(start, 800));
        assert_eq!(keyboard.sink().delete_count(), 4);
        assert_eq!(keyboard.sink().text(), "abcd");

        keyboard.tick(at(start, 2000));
        assert_eq!(keyboard.sink().delete_count(), 4);
        assert!(keyboard.next_deadline().is_none());
    }

    /// Test 4: Cancelling a held delete stops it without a trailing delete
    #[test]
    fn test_delete_cancel() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("abc", Language::English, start);

        keyboard.touch_down(center(&keyboard, "delete"), start);
        keyboard.touch_cancel(at(start, 550));
        keyboard.tick(at(start, 1000));

        assert_eq!(keyboard.sink().delete_count(), 1);
        assert_eq!(keyboard.sink().text(), "ab");
    }

    /// Test 5: Long press on the soft sign offers the hard sign
    #[test]
    fn test_long_press_selects_alternate() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("съел", Language::Russian, start);
        let soft_sign = center(&keyboard, "ь");

        keyboard.touch_down(soft_sign, start);
        assert_eq!(keyboard.overlays().preview().unwrap().glyph, "ь");

        keyboard.tick(at(start, 500));
        let popup = keyboard.overlays().popup().unwrap();
        let texts: Vec<&str> = popup.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["ь", "ъ"]);
        assert!(keyboard.overlays().preview().is_none());

        let hard_sign = popup.options[1].frame.center();
        keyboard.touch_move(hard_sign, at(start, 600));
        keyboard.touch_up(hard_sign, at(start, 650));

        assert_eq!(keyboard.sink().text(), "съелъ");
        assert!(keyboard.overlays().popup().is_none());
    }

    /// Test 6: Popup options follow shift, and selection consumes one-shot shift
    #[test]
    fn test_long_press_with_shift() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("", Language::Russian, start);
        assert_eq!(keyboard.state().shift(), ShiftState::On);

        keyboard.touch_down(center(&keyboard, "ь"), start);
        keyboard.tick(at(start, 500));
        let popup = keyboard.overlays().popup().unwrap();
        assert_eq!(popup.options[0].text, "Ь");
        assert_eq!(popup.options[1].text, "Ъ");

        let hard_sign = popup.options[1].frame.center();
        keyboard.touch_up(hard_sign, at(start, 700));
        assert_eq!(keyboard.sink().text(), "Ъ");
        assert_eq!(keyboard.state().shift(), ShiftState::Off);
    }

    /// Test 7: Lifting without choosing an option emits nothing
    #[test]
    fn test_long_press_dismissed_on_lift() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        let e = center(&keyboard, "e");

        keyboard.touch_down(e, start);
        keyboard.tick(at(start, 600));
        assert!(keyboard.overlays().popup().is_some());

        keyboard.touch_up(e, at(start, 700));
        assert_eq!(keyboard.sink().text(), "x");
        assert!(keyboard.overlays().is_idle());
    }

    /// Test 8: A short press on a key with alternates is a plain tap
    #[test]
    fn test_short_press_emits_base() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        let e = center(&keyboard, "e");

        keyboard.touch_down(e, start);
        keyboard.touch_up(e, at(start, 300));
        keyboard.tick(at(start, 1000));

        assert_eq!(keyboard.sink().text(), "xe");
        assert!(keyboard.overlays().popup().is_none());
    }

    /// Test 9: Touching outside an open popup dismisses it and is consumed
    #[test]
    fn test_touch_outside_popup() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);

        keyboard.touch_down(center(&keyboard, "e"), start);
        keyboard.tick(at(start, 500));
        assert!(keyboard.overlays().popup().is_some());

        // A second touch lands on "m" while the popup is open
        let m = center(&keyboard, "m");
        keyboard.touch_down(m, at(start, 600));
        assert!(keyboard.overlays().popup().is_none());
        keyboard.touch_up(m, at(start, 650));

        assert_eq!(keyboard.sink().text(), "x");
    }

    /// Test 10: Dragging off a key cancels it even if the finger returns
    #[test]
    fn test_drag_out_cancels() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        let q = center(&keyboard, "q");

        keyboard.touch_down(q, start);
        assert!(keyboard.overlays().preview().is_some());

        keyboard.touch_move(Point::new(q.x, q.y + 60.0), at(start, 50));
        assert!(keyboard.overlays().preview().is_none());

        keyboard.touch_move(q, at(start, 100));
        keyboard.touch_up(q, at(start, 150));
        assert_eq!(keyboard.sink().text(), "x");
    }

    /// Test 11: Spacebar swipe switches language and inserts no space
    #[test]
    fn test_space_swipe_switches_language() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("hi", Language::English, start);
        let space = center(&keyboard, "space");

        keyboard.touch_down(space, start);
        keyboard.touch_move(Point::new(space.x - 20.0, space.y), at(start, 30));
        assert_eq!(keyboard.state().language(), Language::English);

        keyboard.touch_move(Point::new(space.x - 35.0, space.y), at(start, 60));
        assert_eq!(keyboard.state().language(), Language::Russian);
        assert!(keyboard.view().find("й").is_some());
        assert_eq!(keyboard.view().find("space").unwrap().key.display, "РУ space");

        keyboard.touch_up(Point::new(space.x - 35.0, space.y), at(start, 90));
        assert_eq!(keyboard.sink().text(), "hi");
    }

    /// Test 12: Globe asks the host and is hidden when the host says so
    #[test]
    fn test_globe() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("", Language::English, start);
        tap(&mut keyboard, "globe", at(start, 10));
        assert_eq!(keyboard.host().switch_requests, 1);

        keyboard.host_mut().needs_switch_key = false;
        keyboard.text_did_change();
        keyboard.resize(375.0);
        assert!(keyboard.view().find("globe").is_none());
    }

    /// Test 13: Symbol pages and the suspension of auto-capitalization
    #[test]
    fn test_symbol_pages() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("a.", Language::English, start);

        tap(&mut keyboard, "symbols", at(start, 10));
        assert_eq!(keyboard.view().layer(), Layer::Symbols1);

        tap(&mut keyboard, "space", at(start, 20));
        // Sentence start, but auto-cap is suspended in symbols
        assert_eq!(keyboard.state().shift(), ShiftState::Off);

        tap(&mut keyboard, "extended", at(start, 30));
        assert_eq!(keyboard.view().layer(), Layer::Symbols2);
        tap(&mut keyboard, "€", at(start, 40));

        tap(&mut keyboard, "symbols", at(start, 50));
        assert_eq!(keyboard.view().layer(), Layer::Letters);
        assert_eq!(keyboard.sink().text(), "a. €");
    }

    /// Test 14: A touch config swap waits for the touch to end
    #[test]
    fn test_touch_config_deferred() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        let wide = TouchDetectionConfig {
            max_gap_detection_distance: 80.0,
            ..TouchDetectionConfig::default()
        };

        keyboard.touch_down(center(&keyboard, "q"), start);
        keyboard.set_touch_config(wide.clone());
        assert_eq!(keyboard.touch_config().max_gap_detection_distance, 25.0);

        keyboard.touch_up(center(&keyboard, "q"), at(start, 50));
        assert_eq!(keyboard.touch_config(), &wide);
    }

    /// Test 15: Far-away touches are dropped
    #[test]
    fn test_dropped_touch() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        let far = Point::new(-200.0, -200.0);

        keyboard.touch_down(far, start);
        keyboard.touch_up(far, at(start, 50));
        assert_eq!(keyboard.sink().text(), "x");
        assert!(!keyboard.is_touching());
    }

    /// Test 16: Nothing happens while inactive
    #[test]
    fn test_inactive_ignores_touches() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        keyboard.touch_down(center(&keyboard, "delete"), start);
        keyboard.will_deactivate();
        assert!(keyboard.overlays().is_idle());

        let q = center(&keyboard, "q");
        keyboard.touch_down(q, at(start, 700));
        keyboard.touch_up(q, at(start, 750));

        // Only the delete from before deactivation
        assert_eq!(keyboard.sink().text(), "");
        assert_eq!(keyboard.sink().delete_count(), 1);
    }

    /// Test 17: Unfocused sink swallows edits and auto-cap sees no context
    #[test]
    fn test_unfocused_sink() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("abc", Language::English, start);
        keyboard.sink_mut().set_focused(false);

        tap(&mut keyboard, "q", at(start, 10));
        assert_eq!(keyboard.sink().text(), "abc");
        // No context counts as a sentence start
        assert_eq!(keyboard.state().shift(), ShiftState::On);
    }

    /// Test 18: A tap just past the edge key snaps to it and types it
    #[test]
    fn test_gap_fallback_tap_activates() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        let q = keyboard.view().find("q").unwrap().frame;
        let edge = Point::new(0.5, q.center().y);

        let resolution = resolve(edge, keyboard.view().keys(), keyboard.touch_config()).unwrap();
        assert_eq!(resolution.kind, HitKind::GapFallback);
        assert_eq!(keyboard.view().key(resolution.index).unwrap().key.identity, "q");

        keyboard.touch_down(edge, start);
        keyboard.touch_up(edge, at(start, 50));
        assert_eq!(keyboard.sink().text(), "xq");

        // Sliding from the gap onto a neighbour still drags out
        keyboard.touch_down(edge, at(start, 200));
        keyboard.touch_move(center(&keyboard, "w"), at(start, 250));
        keyboard.touch_up(center(&keyboard, "w"), at(start, 300));
        assert_eq!(keyboard.sink().text(), "xq");
    }

    /// Test 19: A touch between rows survives moving in place
    #[test]
    fn test_gap_fallback_between_rows() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        keyboard.set_touch_config(TouchDetectionConfig {
            max_gap_detection_distance: 40.0,
            ..TouchDetectionConfig::default()
        });
        let t = keyboard.view().find("t").unwrap().frame;
        let below = Point::new(t.center().x, t.max_y() + 4.0);

        let resolution = resolve(below, keyboard.view().keys(), keyboard.touch_config()).unwrap();
        assert_eq!(resolution.kind, HitKind::GapFallback);
        let identity = keyboard
            .view()
            .key(resolution.index)
            .unwrap()
            .key
            .identity
            .clone();

        keyboard.touch_down(below, start);
        keyboard.touch_move(below, at(start, 30));
        keyboard.touch_up(below, at(start, 60));
        assert_eq!(keyboard.sink().text(), format!("x{}", identity));
    }

    /// Test 20: Delete reached across a gap keeps repeating while held
    #[test]
    fn test_gap_fallback_delete_repeats() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("abcdefgh", Language::English, start);
        let delete = keyboard.view().find("delete").unwrap().frame;
        let edge = Point::new(delete.max_x() + 2.0, delete.center().y);

        let resolution = resolve(edge, keyboard.view().keys(), keyboard.touch_config()).unwrap();
        assert_eq!(resolution.kind, HitKind::GapFallback);
        assert_eq!(keyboard.view().key(resolution.index).unwrap().key.identity, "delete");

        keyboard.touch_down(edge, start);
        keyboard.touch_move(Point::new(edge.x + 0.5, edge.y), at(start, 100));
        keyboard.tick(at(start, 700));
        keyboard.touch_up(edge, at(start, 750));

        assert_eq!(keyboard.sink().delete_count(), 3);
        assert_eq!(keyboard.sink().text(), "abcde");
    }

    /// Test 21: A touch in the spacing between popup options keeps the popup
    #[test]
    fn test_touch_between_popup_options() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);

        keyboard.touch_down(center(&keyboard, "e"), start);
        keyboard.tick(at(start, 500));
        let popup = keyboard.overlays().popup().unwrap().clone();
        assert_eq!(popup.options.len(), 5);

        let spacing = Point::new(
            popup.options[0].frame.max_x() + 5.0,
            popup.options[0].frame.center().y,
        );
        assert!(popup.contains(spacing));
        assert!(popup.option_at(spacing).is_none());

        // A second touch lands between the first two options
        keyboard.touch_down(spacing, at(start, 600));
        assert!(keyboard.overlays().popup().is_some());

        let grave = popup.options[2].frame.center();
        keyboard.touch_move(grave, at(start, 650));
        keyboard.touch_up(grave, at(start, 700));

        assert_eq!(keyboard.sink().text(), "xè");
        assert!(keyboard.overlays().is_idle());
    }

    /// Test 22: Overlay colours follow the palette
    #[test]
    fn test_overlay_styles() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("x", Language::English, start);
        assert!(keyboard.preview_style().is_none());
        assert!(keyboard.popup_style().is_none());

        keyboard.touch_down(center(&keyboard, "e"), start);
        let preview = keyboard.preview_style().unwrap();
        assert_eq!(preview.background, keyboard.palette().preview_background());
        assert_eq!(preview.text, keyboard.palette().text);

        keyboard.tick(at(start, 500));
        assert!(keyboard.preview_style().is_none());
        let popup = keyboard.popup_style().unwrap();
        assert_eq!(popup.background, keyboard.palette().popup_background());
        assert_eq!(popup.options.len(), 5);
        assert_eq!(popup.options[1].background, keyboard.palette().accent);
    }

    #[test]
    fn test_theme_follows_appearance() {
        let start = Instant::now();
        let mut keyboard = keyboard_with("", Language::English, start);
        assert!(!keyboard.palette().dark);

        keyboard.sink_mut().set_dark(true);
        keyboard.text_did_change();
        assert!(keyboard.palette().dark);
        assert_eq!(keyboard.key_styles().len(), keyboard.view().keys().len());
    }
}
