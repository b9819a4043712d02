use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LoadError;
use crate::ir::Direction;

/// Size assumed for nodes the editor has not measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

impl Default for NodeSize {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub direction: Direction,
    pub rank_spacing: f32,
    pub node_spacing: f32,
    pub edge_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Uniform box every node occupies during layout; also the fallback
    /// size for side selection.
    pub node_size: NodeSize,
    pub padding_left: f32,
    pub padding_right: f32,
    /// Outward distance of the drawn handle dots from each side midpoint.
    pub handle_offset: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopDown,
            rank_spacing: 120.0,
            node_spacing: 80.0,
            edge_spacing: 40.0,
            margin_x: 40.0,
            margin_y: 40.0,
            node_size: NodeSize::default(),
            padding_left: 20.0,
            padding_right: 20.0,
            handle_offset: 3.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    rankdir: Option<String>,
    ranksep: Option<f32>,
    nodesep: Option<f32>,
    edgesep: Option<f32>,
    marginx: Option<f32>,
    marginy: Option<f32>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    padding_left: Option<f32>,
    padding_right: Option<f32>,
    handle_offset: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig, LoadError> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = parse_document(&contents, is_json5(path))?;
    apply_config_file(LayoutConfig::default(), parsed)
}

/// Parses a config from an in-memory JSON string, e.g. one handed over by
/// the browser editor.
pub fn parse_config(contents: &str) -> Result<LayoutConfig, LoadError> {
    let parsed: ConfigFile = parse_document(contents, false)?;
    apply_config_file(LayoutConfig::default(), parsed)
}

fn apply_config_file(
    mut config: LayoutConfig,
    file: ConfigFile,
) -> Result<LayoutConfig, LoadError> {
    if let Some(token) = file.rankdir {
        config.direction =
            Direction::from_token(&token).ok_or(LoadError::InvalidDirection(token))?;
    }
    if let Some(v) = file.ranksep {
        config.rank_spacing = v;
    }
    if let Some(v) = file.nodesep {
        config.node_spacing = v;
    }
    if let Some(v) = file.edgesep {
        config.edge_spacing = v;
    }
    if let Some(v) = file.marginx {
        config.margin_x = v;
    }
    if let Some(v) = file.marginy {
        config.margin_y = v;
    }
    if let Some(v) = file.node_width {
        config.node_size.width = v;
    }
    if let Some(v) = file.node_height {
        config.node_size.height = v;
    }
    if let Some(v) = file.padding_left {
        config.padding_left = v;
    }
    if let Some(v) = file.padding_right {
        config.padding_right = v;
    }
    if let Some(v) = file.handle_offset {
        config.handle_offset = v;
    }
    Ok(config)
}

pub(crate) fn is_json5(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false)
}

pub(crate) fn parse_document<T: DeserializeOwned>(
    contents: &str,
    json5: bool,
) -> Result<T, LoadError> {
    if json5 {
        Ok(json5::from_str(contents)?)
    } else {
        Ok(serde_json::from_str(contents)?)
    }
}
