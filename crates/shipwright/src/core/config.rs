//! Editor configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```rust
//! use shipwright::core::EditorConfig;
//!
//! let config = EditorConfig::from_json(r#"{ "history": { "limit": 10 } }"#).unwrap();
//! assert_eq!(config.history.limit, 10);
//! assert_eq!(config.inference.endpoint_tolerance, 20.0);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{EditorError, EditorResult, Theme};

/// Thresholds for matching connector endpoints and labels to nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Node boxes are grown by this much before the containment test
    pub endpoint_tolerance: f64,
    /// Nearest-center fallback rejects nodes further away than this
    pub max_match_distance: f64,
    /// Labels further than this from a connector midpoint stay unassociated
    pub label_max_distance: f64,
    /// Paths with fewer coordinates than this are skipped
    pub min_path_numbers: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint_tolerance: 20.0,
            max_match_distance: 200.0,
            label_max_distance: 150.0,
            min_path_numbers: 4,
        }
    }
}

/// Boundary intersection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionConfig {
    /// Centers closer than this are treated as coincident
    pub coincide_epsilon: f64,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            coincide_epsilon: 0.1,
        }
    }
}

/// History track settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of past entries kept per track
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

/// Inline label editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelEditorConfig {
    /// Blur events this soon after opening are ignored
    pub blur_grace_ms: u64,
}

impl Default for LabelEditorConfig {
    fn default() -> Self {
        Self { blur_grace_ms: 150 }
    }
}

/// How entity connectors are routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStyle {
    /// Three axis-aligned segments
    Elbow,
    /// One cubic curve with axis-aligned tangents
    #[default]
    Bezier,
}

/// Entity connector routing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    pub route_style: RouteStyle,
    pub arrow_length: f64,
    pub arrow_half_width: f64,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            route_style: RouteStyle::Bezier,
            arrow_length: 10.0,
            arrow_half_width: 5.0,
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub inference: InferenceConfig,
    pub intersection: IntersectionConfig,
    pub history: HistoryConfig,
    pub label_editor: LabelEditorConfig,
    pub entity: EntityConfig,
    pub theme: Theme,
}

impl EditorConfig {
    /// Parse a JSON config, filling missing fields with defaults
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> EditorResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> EditorResult<()> {
        if self.history.limit == 0 {
            return Err(EditorError::config_error("history.limit must be at least 1"));
        }
        if self.inference.min_path_numbers < 4 {
            return Err(EditorError::config_error(
                "inference.min_path_numbers must be at least 4",
            ));
        }
        Ok(())
    }
}
