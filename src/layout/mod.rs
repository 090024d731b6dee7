// SPDX-License-Identifier: GPL-3.0-only

//! Layout catalog for the Galaxy keyboard.
//!
//! This module owns the static key data: which keys appear, in which rows, for
//! each (language, layer) pair, plus the number row shown above every layer.
//!
//! # Features
//!
//! - **JSON sheets**: Layouts are described in `resources/layouts/*.json` and
//!   embedded at build time
//! - **Shared layers**: A sheet without a `language` applies to every language
//!   (the symbol pages)
//! - **Startup validation**: Missing layers, non-canonical identities and
//!   malformed rows are rejected before the keyboard is shown
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use galaxy_keyboard::layout::{Language, Layer, LayoutCatalog};
//!
//! let catalog = LayoutCatalog::builtin()?;
//! let letters = catalog.layout(Language::Russian, Layer::Letters)?;
//! println!("{} keys", letters.key_count());
//! ```
//!
//! # Sheet Format
//!
//! ```json
//! {
//!     "name": "Russian",
//!     "language": "russian",
//!     "layers": {
//!         "letters": [
//!             ["й", "ц", "у"],
//!             [{"function": "shift"}, {"glyph": "ь", "alternates": ["ь", "ъ"]}, {"function": "delete"}]
//!         ]
//!     }
//! }
//! ```
//!
//! Display casing is never stored in the sheets. Glyph identities are lowercase
//! and the input state machine applies shift when it generates the visible keys.

// Sub-modules
pub mod catalog;
pub mod types;
pub mod validation;

// Re-export public API - Catalog
pub use catalog::{parse_sheet, LayoutCatalog, BUILTIN_SHEETS};

// Re-export public API - Error handling types
pub use types::{LayoutError, Severity, ValidationIssue};

// Re-export public API - Data structures
pub use types::{
    CellDef, KeyClass, KeyFunction, KeyTemplate, Language, Layer, Layout, LayoutSheet,
    ModifierFunction,
};

// ============================================================================
// Public API Tests
// ============================================================================
