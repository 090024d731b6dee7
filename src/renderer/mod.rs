// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard view model for the Galaxy keyboard.
//!
//! This module turns catalog layouts into positioned keys and tracks the
//! transient overlays drawn on top of them. It does not draw anything itself;
//! a host toolkit reads the registry, styles and overlays and renders them.
//!
//! # Architecture
//!
//! - **sizing**: Points, rectangles, insets and row distribution.
//! - **view**: The key registry (`KeyboardView`) generated from the catalog
//!   and the current mode, plus the debug hit-zone overlay.
//! - **theme**: Dark and light palettes and per-key styles derived by walking
//!   the registry.
//! - **overlay**: Key preview, alternates popup, and the long-press and delete
//!   autorepeat deadlines (`OverlayManager`).
//!
//! # Usage
//!
//! ```rust,ignore
//! use galaxy_keyboard::config::KeyMetrics;
//! use galaxy_keyboard::input::InputModeState;
//! use galaxy_keyboard::layout::LayoutCatalog;
//! use galaxy_keyboard::renderer::{key_styles, KeyboardView, Palette};
//!
//! let catalog = LayoutCatalog::builtin()?;
//! let state = InputModeState::default();
//! let view = KeyboardView::generate(&catalog, &state, &KeyMetrics::default(), true)?;
//!
//! let palette = Palette::for_appearance(true);
//! for (rendered, style) in view.keys().iter().zip(key_styles(&palette, &view, &state)) {
//!     println!("{} at {:?} on {:?}", rendered.key.display, rendered.frame, style.background);
//! }
//! ```
//!
//! # Overlay Timers
//!
//! The overlay manager never spawns timers. Callers ask for the next deadline,
//! sleep until then and call `tick(now)`:
//!
//! ```rust,ignore
//! if let Some(deadline) = overlays.next_deadline() {
//!     sleep_until(deadline).await;
//!     let due = overlays.tick(Instant::now());
//!     for _ in 0..due.deletes {
//!         sink.delete_backward();
//!     }
//! }
//! ```

pub mod overlay;
pub mod sizing;
pub mod theme;
pub mod view;

// Re-export public API
pub use overlay::{AlternatesPopup, KeyPreview, OverlayManager, PopupOption, TickOutcome};
pub use sizing::{Insets, Point, Rect};
pub use theme::{hit_zone_color, key_style, key_styles, Color, KeyStyle, Palette, PopupStyle};
pub use view::{display_label, HitZone, Key, KeyboardView, RenderedKey};
