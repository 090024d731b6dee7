// SPDX-License-Identifier: GPL-3.0-only

//! Validation rules for the layout catalog.
//!
//! Fatal issues (missing layers, empty rows, keys whose identity is not in
//! canonical lowercase form, layers without exactly one delete key) fail the
//! whole catalog. Everything else is collected as a warning.

use std::collections::{HashMap, HashSet};

use crate::layout::types::{
    KeyClass, KeyTemplate, Language, Layer, Layout, LayoutError, ModifierFunction, Severity,
    ValidationIssue,
};

/// Validates an assembled catalog.
///
/// Returns the non-fatal warnings on success, or a
/// [`LayoutError::ValidationError`] carrying every issue if any is fatal.
pub fn validate_catalog(
    layouts: &HashMap<(Language, Layer), Layout>,
    number_row: &[KeyTemplate],
) -> Result<Vec<ValidationIssue>, LayoutError> {
    let mut issues = Vec::new();

    validate_completeness(layouts, &mut issues);
    validate_number_row(number_row, &mut issues);

    // Sorted so issue order is stable across runs
    let mut keys: Vec<&(Language, Layer)> = layouts.keys().collect();
    keys.sort();
    for key in keys {
        if let Some(layout) = layouts.get(key) {
            validate_layout(layout, &mut issues);
        }
    }

    collect_warnings(issues)
}

/// Checks that every (language, layer) pair of the closed enums is present.
pub fn validate_completeness(
    layouts: &HashMap<(Language, Layer), Layout>,
    issues: &mut Vec<ValidationIssue>,
) {
    for language in Language::ALL {
        for layer in Layer::ALL {
            if !layouts.contains_key(&(language, layer)) {
                issues.push(
                    ValidationIssue::new(
                        Severity::Error,
                        "No layout defined",
                        format!("{}.{}", language, layer),
                    )
                    .with_suggestion("Add the layer to the language sheet or to a shared sheet"),
                );
            }
        }
    }
}

fn validate_number_row(number_row: &[KeyTemplate], issues: &mut Vec<ValidationIssue>) {
    if number_row.is_empty() {
        issues.push(
            ValidationIssue::new(Severity::Error, "Number row is missing", "number_row")
                .with_suggestion("Add a \"number_row\" entry to a shared sheet"),
        );
        return;
    }

    for (index, key) in number_row.iter().enumerate() {
        if key.class != KeyClass::Digit {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                format!("'{}' in the number row is not a digit", key.identity),
                format!("number_row[{}]", index),
            ));
        }
    }
}

/// Validates the rows and keys of a single layout.
pub fn validate_layout(layout: &Layout, issues: &mut Vec<ValidationIssue>) {
    let layout_path = format!("{}.{}", layout.language, layout.layer);

    if layout.rows.is_empty() {
        issues.push(ValidationIssue::new(
            Severity::Error,
            "Layout has no rows",
            layout_path.clone(),
        ));
        return;
    }

    let mut seen = HashSet::new();
    let mut delete_keys = 0;
    let mut has_shift = false;

    for (row_idx, row) in layout.rows.iter().enumerate() {
        if row.is_empty() {
            issues.push(
                ValidationIssue::new(
                    Severity::Error,
                    "Row is empty",
                    format!("{}.rows[{}]", layout_path, row_idx),
                )
                .with_suggestion("Remove the row or add keys to it"),
            );
            continue;
        }

        for (key_idx, key) in row.iter().enumerate() {
            let key_path = format!("{}.rows[{}][{}]", layout_path, row_idx, key_idx);

            match key.class {
                KeyClass::Modifier(ModifierFunction::Delete) => delete_keys += 1,
                KeyClass::Modifier(ModifierFunction::Shift) => has_shift = true,
                _ => {}
            }

            validate_key(key, &key_path, issues);

            if key.class.emits_glyph() && !seen.insert(key.identity.as_str()) {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    format!("'{}' appears more than once in this layout", key.identity),
                    key_path,
                ));
            }
        }
    }

    if delete_keys != 1 {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                format!("Expected exactly one delete key, found {}", delete_keys),
                layout_path.clone(),
            )
            .with_suggestion("Add {\"function\": \"delete\"} to one row"),
        );
    }

    if layout.layer == Layer::Letters && !has_shift {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            "Letter layout has no shift key",
            layout_path,
        ));
    }
}

/// Validates a single key template.
pub fn validate_key(key: &KeyTemplate, key_path: &str, issues: &mut Vec<ValidationIssue>) {
    if key.identity.is_empty() {
        issues.push(ValidationIssue::new(
            Severity::Error,
            "Key identity is empty",
            key_path,
        ));
        return;
    }

    if key.class.emits_glyph() && key.identity.to_lowercase() != key.identity {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                format!("Key identity '{}' is not lowercase", key.identity),
                key_path,
            )
            .with_suggestion(format!(
                "Store '{}'; casing is applied from the shift state",
                key.identity.to_lowercase()
            )),
        );
    }

    if let Some(width) = key.width
        && !(width > 0.0)
    {
        issues.push(ValidationIssue::new(
            Severity::Error,
            format!("Key width must be positive, got {}", width),
            format!("{}.width", key_path),
        ));
    }

    if key.has_alternates() {
        if !key.class.emits_glyph() {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                "Alternates on a function key are ignored",
                format!("{}.alternates", key_path),
            ));
        }

        for (alt_idx, alternate) in key.alternates.iter().enumerate() {
            if alternate.is_empty() || alternate.to_lowercase() != *alternate {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    format!("Alternate '{}' must be a non-empty lowercase glyph", alternate),
                    format!("{}.alternates[{}]", key_path, alt_idx),
                ));
            }
        }
    }
}

/// Splits issues into a fatal error or the list of warnings.
pub fn collect_warnings(
    issues: Vec<ValidationIssue>,
) -> Result<Vec<ValidationIssue>, LayoutError> {
    if issues.iter().any(ValidationIssue::is_error) {
        return Err(LayoutError::validation_error(issues));
    }
    Ok(issues)
}

// ============================================================================
// Tests
// ============================================================================
