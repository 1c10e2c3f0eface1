use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::history::DEFAULT_MAX_UNDO;

/// Authoring settings loaded from `editor.toml`.
///
/// ```toml
/// max_undo = 200
/// drag_speed = 0.05
///
/// [display_names]
/// MoveX = "Move Horizontally"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Undo depth for each open document.
    pub max_undo: usize,
    /// Show the read-only `$type` row above each module's fields.
    pub show_type_field: bool,
    /// Value change per pixel when dragging numeric fields.
    pub drag_speed: f64,
    /// Label overrides keyed by module type name.
    pub display_names: BTreeMap<String, String>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
            show_type_field: false,
            drag_speed: 0.1,
            display_names: BTreeMap::new(),
        }
    }
}

impl EditorSettings {
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("failed to parse editor settings: {e}"))
    }
}

/// Load settings from a TOML file.
///
/// Returns `Err` with a human-readable message if the file cannot be read
/// or parsed.
pub fn load_settings(path: &Path) -> Result<EditorSettings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    toml::from_str(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Load settings, falling back to defaults if the file is missing or invalid.
pub fn load_or_default(path: &Path) -> EditorSettings {
    match load_settings(path) {
        Ok(settings) => {
            log::info!(
                "Loaded editor settings from {} (max_undo {})",
                path.display(),
                settings.max_undo
            );
            settings
        }
        Err(e) => {
            log::warn!("No editor settings ({e}), using defaults");
            EditorSettings::default()
        }
    }
}
