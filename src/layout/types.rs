// SPDX-License-Identifier: GPL-3.0-only

//! Core data types for the layout catalog.
//!
//! This module defines the languages and layers the keyboard knows about, the
//! key templates stored in the catalog, the serde model of the layout JSON
//! files, and the error types returned when catalog data is unusable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Error Handling Types
// ============================================================================

/// Severity level for catalog validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal issue that prevents the catalog from being used
    Error,
    /// Non-fatal issue that should be addressed
    Warning,
}

/// A validation issue discovered while checking catalog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity level (Error or Warning)
    pub severity: Severity,
    /// Human-readable description of the issue
    pub message: String,
    /// Path to the offending entry (e.g., "russian.letters.rows[2][4]")
    pub field_path: String,
    /// Optional suggestion for how to fix the issue
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            field_path: field_path.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to the validation issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Returns `true` if this issue is fatal.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity_str = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };

        write!(f, "[{}] {}: {}", severity_str, self.field_path, self.message)?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

/// Configuration error raised by the layout catalog.
///
/// Every variant is fatal: a catalog that fails to load or validate must not
/// be used, since the alternative is shipping a blank or partial keyboard.
#[derive(Debug)]
pub enum LayoutError {
    /// No layout is defined for the requested language and layer
    MissingLayer {
        /// Requested language
        language: Language,
        /// Requested layer
        layer: Layer,
    },

    /// A bundled layout resource could not be found
    MissingResource {
        /// Resource file name
        name: String,
    },

    /// A layout resource is not valid UTF-8
    InvalidEncoding {
        /// Resource file name
        name: String,
        /// The underlying decoding error
        source: std::str::Utf8Error,
    },

    /// JSON parsing error
    JsonError {
        /// The underlying JSON parsing error
        source: serde_json::Error,
        /// Resource name being parsed, if known
        resource: Option<String>,
        /// Line number where the error occurred (from serde_json)
        line_number: usize,
    },

    /// Validation errors found in the catalog
    ValidationError {
        /// All issues found, including warnings
        issues: Vec<ValidationIssue>,
    },
}

impl LayoutError {
    /// Creates a JSON parsing error for a named resource.
    pub fn json_error(source: serde_json::Error, resource: Option<&str>) -> Self {
        let line_number = source.line();
        Self::JsonError {
            source,
            resource: resource.map(str::to_string),
            line_number,
        }
    }

    /// Creates a validation error from a list of issues.
    pub fn validation_error(issues: Vec<ValidationIssue>) -> Self {
        Self::ValidationError { issues }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::MissingLayer { language, layer } => {
                write!(f, "No layout defined for ({}, {})", language, layer)
            }
            LayoutError::MissingResource { name } => {
                write!(f, "Layout resource '{}' is not bundled", name)
            }
            LayoutError::InvalidEncoding { name, source } => {
                write!(f, "Layout resource '{}' is not valid UTF-8: {}", name, source)
            }
            LayoutError::JsonError {
                source,
                resource,
                line_number,
            } => {
                write!(f, "JSON parsing error")?;
                if let Some(name) = resource {
                    write!(f, " in '{}'", name)?;
                }
                write!(f, " at line {}: {}", line_number, source)?;
                write!(f, "\n  Suggestion: Check the JSON syntax at the indicated line")
            }
            LayoutError::ValidationError { issues } => {
                let errors: Vec<&ValidationIssue> =
                    issues.iter().filter(|issue| issue.is_error()).collect();
                write!(f, "Layout validation failed with {} error(s):", errors.len())?;
                for (i, issue) in errors.iter().enumerate() {
                    write!(f, "\n  {}. {}", i + 1, issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::InvalidEncoding { source, .. } => Some(source),
            LayoutError::JsonError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::json_error(err, None)
    }
}

// ============================================================================
// Languages and Layers
// ============================================================================

/// Languages with a letter layer in the catalog.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English (QWERTY)
    #[default]
    English,
    /// Russian (ЙЦУКЕН)
    Russian,
}

impl Language {
    /// All supported languages, in switching order.
    pub const ALL: [Language; 2] = [Language::English, Language::Russian];

    /// Short code shown on the spacebar.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Russian => "РУ",
        }
    }

    /// The language a spacebar swipe switches to.
    pub fn next(self) -> Language {
        match self {
            Language::English => Language::Russian,
            Language::Russian => Language::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Russian => write!(f, "russian"),
        }
    }
}

/// Mutually exclusive key sets shown below the number row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    /// Letter keys of the active language
    #[serde(rename = "letters")]
    Letters,
    /// First symbols page ("1/2")
    #[serde(rename = "symbols_1")]
    Symbols1,
    /// Second symbols page ("2/2")
    #[serde(rename = "symbols_2")]
    Symbols2,
}

impl Layer {
    /// All layers, in display order.
    pub const ALL: [Layer; 3] = [Layer::Letters, Layer::Symbols1, Layer::Symbols2];
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Letters => write!(f, "letters"),
            Layer::Symbols1 => write!(f, "symbols_1"),
            Layer::Symbols2 => write!(f, "symbols_2"),
        }
    }
}

// ============================================================================
// Key Classes and Templates
// ============================================================================

/// Function keys that change mode or edit text instead of emitting a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierFunction {
    /// Shift / caps lock
    Shift,
    /// Delete backward, with autorepeat
    Delete,
    /// Letters <-> symbols
    SymbolsToggle,
    /// Symbols page 1 <-> page 2
    ExtendedToggle,
}

/// Classification of a key. Drives insets, preview eligibility and activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    /// Letter; casing follows shift state
    Letter,
    /// Digit
    Digit,
    /// Punctuation or other symbol glyph
    Symbol,
    /// Function key
    Modifier(ModifierFunction),
    /// Spacebar; also hosts the language swipe
    Spacebar,
    /// Return
    Enter,
    /// Next-keyboard key
    Globe,
}

impl KeyClass {
    /// Classifies a glyph by its characters.
    pub fn for_glyph(glyph: &str) -> KeyClass {
        if glyph.is_empty() {
            return KeyClass::Symbol;
        }
        if glyph.chars().all(|c| c.is_ascii_digit()) {
            KeyClass::Digit
        } else if glyph.chars().all(char::is_alphabetic) {
            KeyClass::Letter
        } else {
            KeyClass::Symbol
        }
    }

    /// Returns `true` for keys that insert their own glyph.
    pub fn emits_glyph(self) -> bool {
        matches!(self, KeyClass::Letter | KeyClass::Digit | KeyClass::Symbol)
    }

    /// Returns `true` for keys that get a preview bubble on press.
    pub fn shows_preview(self) -> bool {
        self.emits_glyph()
    }
}

/// A key as stored in the catalog.
///
/// Templates carry no display casing; the state machine derives the displayed
/// glyph from `identity` when a layout is generated.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTemplate {
    /// Canonical lowercase glyph, or a function name for non-glyph keys
    pub identity: String,
    /// Key classification
    pub class: KeyClass,
    /// Ordered long-press alternates (empty when the key has none)
    pub alternates: Vec<String>,
    /// Fixed width in points; `None` shares the remaining row width
    pub width: Option<f32>,
}

impl KeyTemplate {
    /// Creates a glyph key template, classifying it by its characters.
    pub fn glyph(glyph: impl Into<String>) -> Self {
        let identity = glyph.into();
        let class = KeyClass::for_glyph(&identity);
        Self {
            identity,
            class,
            alternates: Vec::new(),
            width: None,
        }
    }

    /// Creates a template for a function key.
    pub fn function(function: KeyFunction) -> Self {
        Self {
            identity: function.identity().to_string(),
            class: function.class(),
            alternates: Vec::new(),
            width: None,
        }
    }

    /// Sets the long-press alternates.
    pub fn with_alternates(mut self, alternates: Vec<String>) -> Self {
        self.alternates = alternates;
        self
    }

    /// Sets a fixed width in points.
    pub fn with_width(mut self, width: Option<f32>) -> Self {
        self.width = width;
        self
    }

    /// Returns `true` if the key opens a popup on long press.
    pub fn has_alternates(&self) -> bool {
        !self.alternates.is_empty()
    }
}

/// The key set for one (language, layer) pair, without the number row.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Language this layout belongs to
    pub language: Language,
    /// Layer this layout belongs to
    pub layer: Layer,
    /// Ordered rows of ordered keys
    pub rows: Vec<Vec<KeyTemplate>>,
}

impl Layout {
    /// Iterates every key template in row order.
    pub fn keys(&self) -> impl Iterator<Item = &KeyTemplate> {
        self.rows.iter().flatten()
    }

    /// Total number of keys across all rows.
    pub fn key_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

// ============================================================================
// JSON Resource Model
// ============================================================================

/// Non-glyph key names as written in the layout JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFunction {
    /// Shift key
    Shift,
    /// Delete key
    Delete,
    /// Letters/symbols toggle
    SymbolsToggle,
    /// Symbols page toggle
    ExtendedToggle,
    /// Spacebar
    Space,
    /// Return key
    Enter,
    /// Next-keyboard key
    Globe,
}

impl KeyFunction {
    /// Identity stored on templates of this function.
    pub fn identity(self) -> &'static str {
        match self {
            KeyFunction::Shift => "shift",
            KeyFunction::Delete => "delete",
            KeyFunction::SymbolsToggle => "symbols",
            KeyFunction::ExtendedToggle => "extended",
            KeyFunction::Space => "space",
            KeyFunction::Enter => "enter",
            KeyFunction::Globe => "globe",
        }
    }

    /// Key class for this function.
    pub fn class(self) -> KeyClass {
        match self {
            KeyFunction::Shift => KeyClass::Modifier(ModifierFunction::Shift),
            KeyFunction::Delete => KeyClass::Modifier(ModifierFunction::Delete),
            KeyFunction::SymbolsToggle => KeyClass::Modifier(ModifierFunction::SymbolsToggle),
            KeyFunction::ExtendedToggle => KeyClass::Modifier(ModifierFunction::ExtendedToggle),
            KeyFunction::Space => KeyClass::Spacebar,
            KeyFunction::Enter => KeyClass::Enter,
            KeyFunction::Globe => KeyClass::Globe,
        }
    }
}

/// A cell in a layout JSON row.
///
/// Plain strings are glyph keys; objects either name a function or describe a
/// glyph key with a width or alternates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellDef {
    /// Bare glyph, e.g. `"q"`
    Glyph(String),
    /// Function key, e.g. `{"function": "shift"}`
    Function {
        /// Which function
        function: KeyFunction,
        /// Fixed width in points
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f32>,
    },
    /// Glyph key with extra properties, e.g. `{"glyph": "ь", "alternates": ["ь", "ъ"]}`
    Detailed {
        /// The key's glyph
        glyph: String,
        /// Fixed width in points
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f32>,
        /// Long-press alternates
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        alternates: Vec<String>,
    },
}

impl CellDef {
    /// Converts the JSON cell into a catalog template.
    pub fn to_template(&self) -> KeyTemplate {
        match self {
            CellDef::Glyph(glyph) => KeyTemplate::glyph(glyph.clone()),
            CellDef::Function { function, width } => {
                KeyTemplate::function(*function).with_width(*width)
            }
            CellDef::Detailed {
                glyph,
                width,
                alternates,
            } => KeyTemplate::glyph(glyph.clone())
                .with_width(*width)
                .with_alternates(alternates.clone()),
        }
    }
}

/// One layout JSON file.
///
/// A sheet with a `language` contributes layers for that language only; a
/// sheet without one contributes its layers to every language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSheet {
    /// Human-readable sheet name
    pub name: String,
    /// Language the layers belong to; `None` means every language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    /// Number row shared by all layers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_row: Option<Vec<CellDef>>,
    /// Rows per layer
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub layers: HashMap<Layer, Vec<Vec<CellDef>>>,
}

// ============================================================================
// Tests
// ============================================================================
