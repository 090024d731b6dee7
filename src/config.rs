// SPDX-License-Identifier: GPL-3.0-only

//! Session configuration.
//!
//! A [`KeyboardConfig`] is read once when a session starts, either from the
//! defaults or from a JSON file. Every field is optional in the file; missing
//! values fall back to the defaults tuned on real typing.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app_settings;
use crate::layout::{KeyClass, Language};
use crate::renderer::sizing::Insets;

/// Geometry parameters for touch resolution.
///
/// Insets follow the usual edge-inset convention: negative values grow the hit
/// region beyond the key's visual bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchDetectionConfig {
    /// Left/right inset for letters, digits and symbols
    pub horizontal_inset: f32,
    /// Top inset for letters, digits and symbols
    pub vertical_inset_above: f32,
    /// Bottom inset for letters, digits and symbols
    pub vertical_inset_below: f32,
    /// Largest biased distance at which a missed touch still snaps to a key
    pub max_gap_detection_distance: f32,
    /// Distance multiplier applied when the touch is below a key's centre
    pub vertical_bias: f32,
    /// Inset on every edge of modifier, enter and globe keys
    pub modifier_key_inset: f32,
    /// Inset on every edge of the spacebar
    pub space_bar_inset: f32,
    /// Expose expanded hit regions for a debug overlay
    pub show_hit_zone_overlay: bool,
}

impl Default for TouchDetectionConfig {
    fn default() -> Self {
        Self {
            horizontal_inset: -3.0,
            vertical_inset_above: -5.0,
            vertical_inset_below: -3.0,
            max_gap_detection_distance: 25.0,
            vertical_bias: 1.2,
            modifier_key_inset: -1.0,
            space_bar_inset: -5.0,
            show_hit_zone_overlay: false,
        }
    }
}

impl TouchDetectionConfig {
    /// Returns the hit-region insets for a key class.
    pub fn insets_for(&self, class: KeyClass) -> Insets {
        match class {
            KeyClass::Letter | KeyClass::Digit | KeyClass::Symbol => Insets {
                top: self.vertical_inset_above,
                left: self.horizontal_inset,
                bottom: self.vertical_inset_below,
                right: self.horizontal_inset,
            },
            KeyClass::Spacebar => Insets::uniform(self.space_bar_inset),
            KeyClass::Modifier(_) | KeyClass::Enter | KeyClass::Globe => {
                Insets::uniform(self.modifier_key_inset)
            }
        }
    }
}

/// Point sizes used to lay out key frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMetrics {
    /// Width of the keyboard surface
    pub surface_width: f32,
    /// Height of every key
    pub key_height: f32,
    /// Vertical gap between rows
    pub row_spacing: f32,
    /// Horizontal gap between keys
    pub key_spacing: f32,
    /// Inset from the left and right surface edges
    pub side_inset: f32,
    /// Inset from the top surface edge
    pub top_inset: f32,
}

impl Default for KeyMetrics {
    fn default() -> Self {
        Self {
            surface_width: app_settings::DEFAULT_SURFACE_WIDTH,
            key_height: app_settings::DEFAULT_KEY_HEIGHT,
            row_spacing: app_settings::DEFAULT_ROW_SPACING,
            key_spacing: app_settings::DEFAULT_KEY_SPACING,
            side_inset: app_settings::DEFAULT_SIDE_INSET,
            top_inset: app_settings::DEFAULT_TOP_INSET,
        }
    }
}

/// Everything a keyboard session is configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Touch resolution parameters
    pub touch: TouchDetectionConfig,
    /// Key frame geometry
    pub metrics: KeyMetrics,
    /// Language the session starts in
    pub language: Language,
}

impl KeyboardConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            file_path: path.display().to_string(),
        })?;

        let config: KeyboardConfig =
            serde_json::from_str(&json).map_err(|source| ConfigError::Json {
                line_number: source.line(),
                source,
                file_path: Some(path.display().to_string()),
            })?;

        config.validate()?;
        tracing::debug!("Loaded keyboard config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: KeyboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make touch resolution or layout meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let touch = &self.touch;
        if !(touch.max_gap_detection_distance >= 0.0) {
            return Err(ConfigError::invalid(
                "touch.max_gap_detection_distance",
                "must be zero or positive",
            ));
        }
        if !(touch.vertical_bias >= 1.0) {
            return Err(ConfigError::invalid(
                "touch.vertical_bias",
                "must be at least 1.0",
            ));
        }

        let metrics = &self.metrics;
        let positive = [
            ("metrics.surface_width", metrics.surface_width),
            ("metrics.key_height", metrics.key_height),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(field, "must be positive"));
            }
        }

        let non_negative = [
            ("metrics.row_spacing", metrics.row_spacing),
            ("metrics.key_spacing", metrics.key_spacing),
            ("metrics.side_inset", metrics.side_inset),
            ("metrics.top_inset", metrics.top_inset),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::invalid(field, "must be zero or positive"));
            }
        }

        Ok(())
    }
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    Io {
        /// The underlying I/O error
        source: std::io::Error,
        /// Path that was being read
        file_path: String,
    },

    /// The configuration is not valid JSON for [`KeyboardConfig`]
    Json {
        /// The underlying JSON error
        source: serde_json::Error,
        /// Path being parsed, if loaded from a file
        file_path: Option<String>,
        /// Line number reported by serde_json
        line_number: usize,
    },

    /// A value is out of range
    InvalidValue {
        /// Dotted path to the field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    /// Creates an out-of-range value error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { source, file_path } => {
                write!(f, "I/O error reading config '{}': {}", file_path, source)?;
                write!(f, "\n  Suggestion: Check that the file exists and you have read permissions")
            }
            ConfigError::Json {
                source,
                file_path,
                line_number,
            } => {
                write!(f, "Config parsing error")?;
                if let Some(path) = file_path {
                    write!(f, " in file '{}'", path)?;
                }
                write!(f, " at line {}: {}", line_number, source)
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            line_number: source.line(),
            source,
            file_path: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ModifierFunction;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_tuned_values() {
        let config = TouchDetectionConfig::default();
        assert_eq!(config.horizontal_inset, -3.0);
        assert_eq!(config.vertical_inset_above, -5.0);
        assert_eq!(config.vertical_inset_below, -3.0);
        assert_eq!(config.max_gap_detection_distance, 25.0);
        assert_eq!(config.vertical_bias, 1.2);
        assert_eq!(config.modifier_key_inset, -1.0);
        assert_eq!(config.space_bar_inset, -5.0);
        assert!(!config.show_hit_zone_overlay);
    }

    #[test]
    fn test_insets_per_class() {
        let config = TouchDetectionConfig::default();

        let letter = config.insets_for(KeyClass::Letter);
        assert_eq!(letter.top, -5.0);
        assert_eq!(letter.bottom, -3.0);
        assert_eq!(letter.left, -3.0);
        assert_eq!(letter.right, -3.0);

        assert_eq!(config.insets_for(KeyClass::Spacebar), Insets::uniform(-5.0));
        assert_eq!(
            config.insets_for(KeyClass::Modifier(ModifierFunction::Delete)),
            Insets::uniform(-1.0)
        );
        assert_eq!(config.insets_for(KeyClass::Globe), Insets::uniform(-1.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = KeyboardConfig::from_json(
            r#"{"touch": {"max_gap_detection_distance": 40}, "language": "russian"}"#,
        )
        .unwrap();

        assert_eq!(config.touch.max_gap_detection_distance, 40.0);
        assert_eq!(config.touch.vertical_bias, 1.2);
        assert_eq!(config.language, Language::Russian);
        assert_eq!(config.metrics, KeyMetrics::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = KeyboardConfig::from_json(r#"{"touch": {"vertical_bias": 0.5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "touch.vertical_bias"));

        let err = KeyboardConfig::from_json(r#"{"metrics": {"surface_width": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("metrics.surface_width"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"metrics": {{"surface_width": 414}}}}"#).unwrap();

        let config = KeyboardConfig::load(file.path()).unwrap();
        assert_eq!(config.metrics.surface_width, 414.0);
    }

    #[test]
    fn test_load_errors() {
        let err = KeyboardConfig::load("/nonexistent/galaxy/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\n  \"touch\": [\n}}").unwrap();
        let err = KeyboardConfig::load(file.path()).unwrap_err();
        match err {
            ConfigError::Json {
                file_path,
                line_number,
                ..
            } => {
                assert!(file_path.is_some());
                assert!(line_number >= 2);
            }
            other => panic!("expected JSON error, got {:?}", other),
        }
    }
}
