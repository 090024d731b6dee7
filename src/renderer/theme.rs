// SPDX-License-Identifier: GPL-3.0-only

//! Colours for the keyboard surface, keys and overlays.
//!
//! The palette is derived from the host's appearance (dark or light). Styles
//! are computed by walking the key registry and looking at each key's class,
//! never its displayed label.
//!
//! # Colour Roles
//!
//! - `background`: Keyboard surface
//! - `key`: Glyph keys
//! - `special_key`: Function keys, spacebar, enter and globe
//! - `text`: Key labels
//! - `accent`: Active shift label and highlighted popup option

use crate::input::InputModeState;
use crate::layout::{KeyClass, ModifierFunction};
use crate::renderer::view::{Key, KeyboardView};

/// An RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);

    /// Opaque black.
    pub const BLACK: Color = Color::from_rgb(0.0, 0.0, 0.0);

    /// Creates an opaque colour from float components.
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates an opaque colour from 8-bit components.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Returns the same colour with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// System colours the palette is built from.
mod system {
    use super::Color;

    pub fn blue() -> Color {
        Color::from_rgb8(0, 122, 255)
    }

    pub fn green() -> Color {
        Color::from_rgb8(52, 199, 89)
    }

    pub fn purple() -> Color {
        Color::from_rgb8(175, 82, 222)
    }

    pub fn orange() -> Color {
        Color::from_rgb8(255, 149, 0)
    }

    pub fn red() -> Color {
        Color::from_rgb8(255, 59, 48)
    }

    pub fn gray2_dark() -> Color {
        Color::from_rgb8(99, 99, 102)
    }

    pub fn gray3_dark() -> Color {
        Color::from_rgb8(72, 72, 74)
    }

    pub fn gray4_light() -> Color {
        Color::from_rgb8(209, 209, 214)
    }

    pub fn gray5_light() -> Color {
        Color::from_rgb8(229, 229, 234)
    }
}

// ============================================================================
// Palette
// ============================================================================

/// Colour set for one appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Whether this is the dark palette
    pub dark: bool,
    /// Keyboard surface
    pub background: Color,
    /// Glyph key background
    pub key: Color,
    /// Function key background
    pub special_key: Color,
    /// Key label colour
    pub text: Color,
    /// Highlight colour
    pub accent: Color,
}

impl Palette {
    /// Palette for a light host appearance.
    pub fn light() -> Self {
        Self {
            dark: false,
            background: system::gray5_light(),
            key: Color::WHITE,
            special_key: system::gray4_light(),
            text: Color::BLACK,
            accent: system::blue(),
        }
    }

    /// Palette for a dark host appearance.
    pub fn dark() -> Self {
        Self {
            dark: true,
            background: Color::BLACK,
            key: system::gray3_dark(),
            special_key: system::gray2_dark(),
            text: Color::WHITE,
            accent: system::blue(),
        }
    }

    /// Picks the palette for the host appearance.
    pub fn for_appearance(dark: bool) -> Self {
        if dark { Self::dark() } else { Self::light() }
    }

    /// Background of the key preview bubble.
    pub fn preview_background(&self) -> Color {
        if self.dark { self.key } else { Color::WHITE }
    }

    /// Background of the alternates popup panel.
    pub fn popup_background(&self) -> Color {
        Color::WHITE
    }

    /// Colours of the key preview bubble.
    pub fn preview_style(&self) -> KeyStyle {
        KeyStyle {
            background: self.preview_background(),
            text: self.text,
        }
    }

    /// Colours of a popup holding `count` options.
    pub fn popup_style(&self, count: usize) -> PopupStyle {
        PopupStyle {
            background: self.popup_background(),
            options: (0..count).map(|index| self.popup_option(index)).collect(),
        }
    }

    /// Background and label colour of a popup option.
    ///
    /// The first option is the key's own glyph and stays plain; the others
    /// are highlighted.
    pub fn popup_option(&self, index: usize) -> KeyStyle {
        if index == 0 {
            KeyStyle {
                background: Color::WHITE,
                text: Color::BLACK,
            }
        } else {
            KeyStyle {
                background: self.accent,
                text: Color::WHITE,
            }
        }
    }
}

// ============================================================================
// Key Styles
// ============================================================================

/// Background and label colour of one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyStyle {
    /// Key background
    pub background: Color,
    /// Label colour
    pub text: Color,
}

/// Colours of the alternates popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupStyle {
    /// Panel background
    pub background: Color,
    /// One style per option, in order
    pub options: Vec<KeyStyle>,
}

/// Style of a single key under the given mode.
pub fn key_style(palette: &Palette, key: &Key, state: &InputModeState) -> KeyStyle {
    match key.class {
        KeyClass::Modifier(ModifierFunction::Shift) if state.is_uppercase() => KeyStyle {
            background: Color::WHITE,
            text: palette.accent,
        },
        KeyClass::Letter | KeyClass::Digit | KeyClass::Symbol => KeyStyle {
            background: palette.key,
            text: palette.text,
        },
        KeyClass::Modifier(_) | KeyClass::Spacebar | KeyClass::Enter | KeyClass::Globe => {
            KeyStyle {
                background: palette.special_key,
                text: palette.text,
            }
        }
    }
}

/// Styles for every key in the registry, in registry order.
pub fn key_styles(palette: &Palette, view: &KeyboardView, state: &InputModeState) -> Vec<KeyStyle> {
    view.keys()
        .iter()
        .map(|rendered| key_style(palette, &rendered.key, state))
        .collect()
}

/// Debug overlay colour for a key class.
pub fn hit_zone_color(class: KeyClass) -> Color {
    let base = match class {
        KeyClass::Letter => system::blue(),
        KeyClass::Digit => system::green(),
        KeyClass::Symbol => system::purple(),
        KeyClass::Modifier(_) | KeyClass::Enter | KeyClass::Globe => system::orange(),
        KeyClass::Spacebar => system::red(),
    };
    base.with_alpha(0.2)
}

// ============================================================================
// Tests
// ============================================================================
