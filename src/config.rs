use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROOT_COLOR: &str = "#FF6B6B";
pub const DEFAULT_CENTER_COLOR: &str = "#FFD700";
pub const DEFAULT_LEVEL_COLORS: [&str; 6] =
    ["#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
    pub root_color: String,
    pub level_colors: Vec<String>,
    pub center_color: String,
    pub chat_room_grouping: bool,
    #[serde(skip)]
    pub center_node_id: Option<String>,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            root_color: DEFAULT_ROOT_COLOR.to_owned(),
            level_colors: DEFAULT_LEVEL_COLORS.map(str::to_owned).to_vec(),
            center_color: DEFAULT_CENTER_COLOR.to_owned(),
            chat_room_grouping: false,
            center_node_id: None,
        }
    }
}

impl GraphOptions {
    /// Color for a non-root node; an empty palette falls back to the root color.
    pub fn level_color(&self, level: usize) -> &str {
        if self.level_colors.is_empty() {
            return &self.root_color;
        }
        &self.level_colors[level % self.level_colors.len()]
    }

    pub fn with_center(mut self, center_node_id: Option<String>) -> Self {
        self.center_node_id = center_node_id;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(flatten)]
    pub graph: GraphOptions,
    pub view_mode: ViewMode,
}

pub fn load_config(path: &Path) -> Result<SessionConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_color_wraps_around_palette() {
        let options = GraphOptions::default();
        assert_eq!(options.level_color(1), "#00ff00");
        assert_eq!(options.level_color(7), "#00ff00");
    }

    #[test]
    fn empty_palette_uses_root_color() {
        let options = GraphOptions {
            level_colors: Vec::new(),
            ..GraphOptions::default()
        };
        assert_eq!(options.level_color(3), DEFAULT_ROOT_COLOR);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r##"{"rootColor": "#123456", "viewMode": "3d"}"##)
                .expect("config parses");

        assert_eq!(config.graph.root_color, "#123456");
        assert_eq!(config.graph.level_colors.len(), 6);
        assert_eq!(config.view_mode, ViewMode::ThreeD);
    }
}
