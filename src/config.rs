//! Editor and layout configuration.
//!
//! Both structs deserialize from partial camelCase objects, so the JS side
//! only has to pass the options it wants to change.

use serde::{Deserialize, Serialize};

use crate::layout::{LayoutMode, Size};

/// Default branch palette for the colorful theme.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#e85d75", "#f0a04b", "#e3c84b", "#5fb878", "#4fb3bf", "#5b8def", "#8e6cd8", "#d86cb0",
];

/// Spacing and appearance parameters for the layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Horizontal distance between a parent's far edge and its children.
    pub horizontal_gap: f32,
    /// Vertical space added below every node when stacking siblings.
    pub vertical_gap: f32,
    /// Box size used for image nodes instead of measuring.
    pub image_size: Size,
    /// Branch colors cycled by first-level index.
    pub palette: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: 40.0,
            vertical_gap: 16.0,
            image_size: Size::new(96.0, 64.0),
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

/// Top-level editor options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undo steps kept.
    pub history_capacity: usize,
    pub layout_mode: LayoutMode,
    pub layout: LayoutConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            layout_mode: LayoutMode::default(),
            layout: LayoutConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.layout_mode, LayoutMode::Both);
        assert_eq!(config.layout.palette.len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: EditorConfig = serde_json::from_str(
            r#"{"historyCapacity": 5, "layoutMode": "right", "layout": {"verticalGap": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.layout_mode, LayoutMode::Right);
        assert_eq!(config.layout.vertical_gap, 4.0);
        assert_eq!(config.layout.horizontal_gap, 40.0);
    }
}
