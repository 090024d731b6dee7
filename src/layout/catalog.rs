// SPDX-License-Identifier: GPL-3.0-only

//! Layout catalog: loading and lookup of per-language, per-layer key data.
//!
//! The built-in layouts ship as JSON sheets under `resources/layouts/` and are
//! embedded into the binary. A catalog is assembled and validated once, at
//! session start; after that [`LayoutCatalog::layout`] is a pure lookup.

use std::collections::HashMap;

use rust_embed::RustEmbed;

use crate::layout::types::{
    KeyTemplate, Language, Layer, Layout, LayoutError, LayoutSheet, ValidationIssue,
};
use crate::layout::validation::validate_catalog;

/// Layout sheets bundled with the keyboard.
#[derive(RustEmbed)]
#[folder = "resources/layouts/"]
struct LayoutAssets;

/// Names of the bundled sheets, in assembly order.
pub const BUILTIN_SHEETS: [&str; 4] = ["common.json", "english.json", "russian.json", "symbols.json"];

/// Validated set of layouts, addressable by (language, layer).
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    layouts: HashMap<(Language, Layer), Layout>,
    number_row: Vec<KeyTemplate>,
    warnings: Vec<ValidationIssue>,
}

impl LayoutCatalog {
    /// Loads and validates the bundled layout sheets.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if a sheet is missing, malformed, or the
    /// assembled catalog fails validation.
    pub fn builtin() -> Result<Self, LayoutError> {
        let mut sheets = Vec::with_capacity(BUILTIN_SHEETS.len());

        for name in BUILTIN_SHEETS {
            let file = LayoutAssets::get(name).ok_or_else(|| LayoutError::MissingResource {
                name: name.to_string(),
            })?;
            let json = std::str::from_utf8(&file.data).map_err(|source| {
                LayoutError::InvalidEncoding {
                    name: name.to_string(),
                    source,
                }
            })?;
            sheets.push(parse_sheet(json, Some(name))?);
        }

        Self::from_sheets(sheets)
    }

    /// Builds a catalog from JSON sheet strings.
    ///
    /// Useful for tests and custom layouts; the same validation as
    /// [`LayoutCatalog::builtin`] applies.
    pub fn from_json_sheets(sheets: &[&str]) -> Result<Self, LayoutError> {
        let parsed = sheets
            .iter()
            .map(|json| parse_sheet(json, None))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_sheets(parsed)
    }

    /// Assembles parsed sheets into a catalog and validates it.
    ///
    /// Sheets without a language contribute their layers to every language.
    /// Language-specific sheets are applied afterwards and take precedence.
    pub fn from_sheets(sheets: Vec<LayoutSheet>) -> Result<Self, LayoutError> {
        let mut layouts = HashMap::new();
        let mut number_row = Vec::new();

        let (shared, specific): (Vec<_>, Vec<_>) =
            sheets.into_iter().partition(|sheet| sheet.language.is_none());

        for sheet in shared.iter().chain(specific.iter()) {
            if let Some(cells) = &sheet.number_row {
                number_row = cells.iter().map(|cell| cell.to_template()).collect();
            }

            let languages: Vec<Language> = match sheet.language {
                Some(language) => vec![language],
                None => Language::ALL.to_vec(),
            };

            for (layer, rows) in &sheet.layers {
                let rows: Vec<Vec<KeyTemplate>> = rows
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.to_template()).collect())
                    .collect();

                for language in &languages {
                    layouts.insert(
                        (*language, *layer),
                        Layout {
                            language: *language,
                            layer: *layer,
                            rows: rows.clone(),
                        },
                    );
                }
            }
        }

        let warnings = validate_catalog(&layouts, &number_row)?;
        for warning in &warnings {
            tracing::warn!("Layout catalog: {}", warning);
        }

        tracing::debug!(
            "Layout catalog ready: {} layouts, {} warnings",
            layouts.len(),
            warnings.len()
        );

        Ok(Self {
            layouts,
            number_row,
            warnings,
        })
    }

    /// Returns the layout for a (language, layer) pair.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::MissingLayer`] if the pair is not in the catalog.
    pub fn layout(&self, language: Language, layer: Layer) -> Result<&Layout, LayoutError> {
        self.layouts
            .get(&(language, layer))
            .ok_or(LayoutError::MissingLayer { language, layer })
    }

    /// The number row shown above every layer.
    pub fn number_row(&self) -> &[KeyTemplate] {
        &self.number_row
    }

    /// Non-fatal issues found while validating the catalog.
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }
}

/// Parses a single layout sheet from JSON.
pub fn parse_sheet(json: &str, resource: Option<&str>) -> Result<LayoutSheet, LayoutError> {
    serde_json::from_str(json).map_err(|e| LayoutError::json_error(e, resource))
}

// ============================================================================
// Tests
// ============================================================================
