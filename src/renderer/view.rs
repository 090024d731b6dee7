// SPDX-License-Identifier: GPL-3.0-only

//! The key registry: every key currently on screen, with its frame.
//!
//! A [`KeyboardView`] is generated from the catalog and the current
//! [`InputModeState`]. Any mode change that alters casing or the active layer
//! generates a fresh view and replaces the old one wholesale, so touches are
//! always resolved against a consistent key set.
//!
//! Rows are laid out top to bottom: the number row first, then the rows of the
//! active layout.

use crate::config::{KeyMetrics, TouchDetectionConfig};
use crate::input::{hit_region, InputModeState, TouchTarget};
use crate::layout::{
    KeyClass, KeyTemplate, LayoutCatalog, LayoutError, Layer, Language, ModifierFunction,
};
use crate::renderer::sizing::{layout_row, row_origin_y, surface_height, Rect};
use crate::renderer::theme::{hit_zone_color, Color};

/// A key as laid out for the current mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Canonical identity from the catalog
    pub identity: String,
    /// Label shown on the key, cased for the current mode
    pub display: String,
    /// Key classification
    pub class: KeyClass,
    /// Long-press alternates in canonical form
    pub alternates: Vec<String>,
}

impl Key {
    /// Builds the on-screen key for a catalog template under `state`.
    pub fn from_template(template: &KeyTemplate, state: &InputModeState) -> Self {
        Self {
            identity: template.identity.clone(),
            display: display_label(template, state),
            class: template.class,
            alternates: template.alternates.clone(),
        }
    }

    /// Returns `true` if the key opens a popup on long press.
    pub fn has_alternates(&self) -> bool {
        !self.alternates.is_empty()
    }
}

/// A key with its position on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedKey {
    /// The key
    pub key: Key,
    /// Visual bounds
    pub frame: Rect,
    /// Row index, counting the number row as row 0
    pub row: usize,
    /// Position within the row
    pub column: usize,
}

impl TouchTarget for RenderedKey {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn class(&self) -> KeyClass {
        self.key.class
    }
}

/// Expanded hit region of one key, for the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitZone {
    /// Registry index of the key
    pub index: usize,
    /// Expanded hit region
    pub region: Rect,
    /// Overlay colour
    pub color: Color,
}

/// Label shown on a key under the given mode.
pub fn display_label(template: &KeyTemplate, state: &InputModeState) -> String {
    match template.class {
        KeyClass::Letter => state.display_glyph(&template.identity),
        KeyClass::Digit | KeyClass::Symbol => template.identity.clone(),
        KeyClass::Modifier(ModifierFunction::Shift) => "⇧".to_string(),
        KeyClass::Modifier(ModifierFunction::Delete) => "⌫".to_string(),
        KeyClass::Modifier(ModifierFunction::SymbolsToggle) => {
            if state.symbols_active() { "ABC" } else { "!#1" }.to_string()
        }
        KeyClass::Modifier(ModifierFunction::ExtendedToggle) => {
            if state.extended_active() { "2/2" } else { "1/2" }.to_string()
        }
        KeyClass::Spacebar => format!("{} space", state.language().code()),
        KeyClass::Enter => "↵".to_string(),
        KeyClass::Globe => "🌐".to_string(),
    }
}

// ============================================================================
// Keyboard View
// ============================================================================

/// The generated key registry.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardView {
    keys: Vec<RenderedKey>,
    language: Language,
    layer: Layer,
    height: f32,
    generation: u64,
}

impl Default for KeyboardView {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            language: Language::default(),
            layer: Layer::Letters,
            height: 0.0,
            generation: 0,
        }
    }
}

impl KeyboardView {
    /// Generates the registry for `state`.
    ///
    /// The globe key is only laid out when `include_globe` is set; the row it
    /// sits in is distributed without it.
    pub fn generate(
        catalog: &LayoutCatalog,
        state: &InputModeState,
        metrics: &KeyMetrics,
        include_globe: bool,
    ) -> Result<Self, LayoutError> {
        let layout = catalog.layout(state.language(), state.layer())?;

        let rows: Vec<Vec<&KeyTemplate>> = std::iter::once(catalog.number_row())
            .chain(layout.rows.iter().map(Vec::as_slice))
            .map(|row| {
                row.iter()
                    .filter(|template| include_globe || template.class != KeyClass::Globe)
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();

        let mut keys = Vec::with_capacity(rows.iter().map(Vec::len).sum());
        for (row_index, row) in rows.iter().enumerate() {
            let frames = layout_row(row, row_origin_y(row_index, metrics), metrics);
            for (column, (template, frame)) in row.iter().zip(frames).enumerate() {
                keys.push(RenderedKey {
                    key: Key::from_template(template, state),
                    frame,
                    row: row_index,
                    column,
                });
            }
        }

        tracing::debug!(
            "Generated {} keys for ({}, {}) in {} rows",
            keys.len(),
            state.language(),
            state.layer(),
            rows.len()
        );

        Ok(Self {
            keys,
            language: state.language(),
            layer: state.layer(),
            height: surface_height(rows.len(), metrics),
            generation: 0,
        })
    }

    /// Replaces this registry with a freshly generated one.
    ///
    /// On error the current registry is left untouched.
    pub fn regenerate(
        &mut self,
        catalog: &LayoutCatalog,
        state: &InputModeState,
        metrics: &KeyMetrics,
        include_globe: bool,
    ) -> Result<(), LayoutError> {
        let mut next = Self::generate(catalog, state, metrics, include_globe)?;
        next.generation = self.generation + 1;
        *self = next;
        Ok(())
    }

    /// All keys in row order.
    pub fn keys(&self) -> &[RenderedKey] {
        &self.keys
    }

    /// Key at a registry index.
    pub fn key(&self, index: usize) -> Option<&RenderedKey> {
        self.keys.get(index)
    }

    /// First key with the given identity.
    pub fn find(&self, identity: &str) -> Option<&RenderedKey> {
        self.keys.iter().find(|rendered| rendered.key.identity == identity)
    }

    /// Language the registry was generated for.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Layer the registry was generated for.
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Height of the keyboard surface.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Incremented on every regeneration.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Expanded hit regions for the debug overlay.
    ///
    /// Empty unless the config enables the overlay.
    pub fn hit_zones(&self, config: &TouchDetectionConfig) -> Vec<HitZone> {
        if !config.show_hit_zone_overlay {
            return Vec::new();
        }
        self.keys
            .iter()
            .enumerate()
            .map(|(index, rendered)| HitZone {
                index,
                region: hit_region(rendered, config),
                color: hit_zone_color(rendered.key.class),
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn generate(state: &InputModeState, include_globe: bool) -> KeyboardView {
        let catalog = LayoutCatalog::builtin().unwrap();
        KeyboardView::generate(&catalog, state, &KeyMetrics::default(), include_globe).unwrap()
    }

    fn displays(view: &KeyboardView, row: usize) -> Vec<String> {
        view.keys()
            .iter()
            .filter(|rendered| rendered.row == row)
            .map(|rendered| rendered.key.display.clone())
            .collect()
    }

    #[test]
    fn test_number_row_comes_first() {
        let view = generate(&InputModeState::default(), true);

        assert_eq!(displays(&view, 0), ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"]);
        assert_eq!(view.key(0).unwrap().frame.y, 8.0);
        assert_eq!(displays(&view, 1)[0], "q");
        assert_eq!(view.layer(), Layer::Letters);
    }

    #[test]
    fn test_display_follows_shift() {
        let mut state = InputModeState::default();
        state.press_shift(Instant::now());
        let view = generate(&state, true);

        assert_eq!(displays(&view, 1)[..3], ["Q", "W", "E"]);
        // Identities stay canonical
        assert_eq!(view.find("q").unwrap().key.display, "Q");
        // Digits are unaffected
        assert_eq!(displays(&view, 0)[0], "1");
    }

    #[test]
    fn test_function_labels() {
        let mut state = InputModeState::new(Language::Russian);
        let view = generate(&state, true);

        assert_eq!(displays(&view, 3).first().unwrap(), "⇧");
        assert_eq!(displays(&view, 3).last().unwrap(), "⌫");
        assert_eq!(displays(&view, 4), ["!#1", ",", "РУ space", ".", "↵", "🌐"]);

        state.toggle_symbols();
        let view = generate(&state, true);
        assert_eq!(displays(&view, 3)[0], "1/2");
        assert_eq!(displays(&view, 4)[0], "ABC");
        assert_eq!(displays(&view, 4)[2], "РУ space");

        state.toggle_extended();
        let view = generate(&state, true);
        assert_eq!(displays(&view, 3)[0], "2/2");
        assert_eq!(view.layer(), Layer::Symbols2);
    }

    #[test]
    fn test_globe_hidden_when_not_needed() {
        let state = InputModeState::default();

        let with_globe = generate(&state, true);
        let space = with_globe.find("space").unwrap();
        // 375 - 8 insets - 30 spacing - 270 fixed
        assert_eq!(space.frame.width, 67.0);

        let without_globe = generate(&state, false);
        assert!(without_globe.find("globe").is_none());
        let space = without_globe.find("space").unwrap();
        // 375 - 8 insets - 24 spacing - 220 fixed
        assert_eq!(space.frame.width, 123.0);
    }

    #[test]
    fn test_regenerate_replaces_registry() {
        let catalog = LayoutCatalog::builtin().unwrap();
        let metrics = KeyMetrics::default();
        let mut state = InputModeState::default();
        let mut view = KeyboardView::generate(&catalog, &state, &metrics, true).unwrap();
        assert_eq!(view.generation(), 0);

        state.switch_language();
        view.regenerate(&catalog, &state, &metrics, true).unwrap();

        assert_eq!(view.generation(), 1);
        assert_eq!(view.language(), Language::Russian);
        assert!(view.find("q").is_none());
        assert!(view.find("й").is_some());
        // 10 + 11 + 11 + 11 + 6
        assert_eq!(view.keys().len(), 49);
    }

    #[test]
    fn test_rows_do_not_overlap() {
        let view = generate(&InputModeState::default(), true);

        for pair in view.keys().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.row == b.row {
                assert!(a.frame.max_x() <= b.frame.x);
            } else {
                assert!(a.frame.max_y() <= b.frame.y);
            }
        }
        assert_eq!(view.height(), surface_height(5, &KeyMetrics::default()));
    }

    #[test]
    fn test_hit_zones_follow_overlay_flag() {
        let view = generate(&InputModeState::default(), true);
        let mut config = TouchDetectionConfig::default();
        assert!(view.hit_zones(&config).is_empty());

        config.show_hit_zone_overlay = true;
        let zones = view.hit_zones(&config);
        assert_eq!(zones.len(), view.keys().len());

        let first = &zones[0];
        let frame = view.key(0).unwrap().frame;
        assert_eq!(first.region.x, frame.x - 3.0);
        assert_eq!(first.region.y, frame.y - 5.0);
        assert_eq!(first.color, hit_zone_color(KeyClass::Digit));
    }
}
