use flow_layout::{
    FlowDocument, LayoutConfig, NodeBox, edge_params as compute_edge_params, layout_document,
    parse_config,
};
use wasm_bindgen::prelude::*;

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn build_config(config_json: Option<String>) -> Result<LayoutConfig, String> {
    match config_json {
        Some(raw) => parse_config(&raw).map_err(|error| error.to_string()),
        None => Ok(LayoutConfig::default()),
    }
}

fn layout_json(doc_json: &str, config_json: Option<String>) -> Result<String, String> {
    let config = build_config(config_json)?;
    let document: FlowDocument =
        serde_json::from_str(doc_json).map_err(|error| error.to_string())?;
    serde_json::to_string(&layout_document(&document, &config))
        .map_err(|error| error.to_string())
}

fn edge_params_json(
    source_json: &str,
    target_json: &str,
    config_json: Option<String>,
) -> Result<String, String> {
    let config = build_config(config_json)?;
    let source: NodeBox = serde_json::from_str(source_json).map_err(|error| error.to_string())?;
    let target: NodeBox = serde_json::from_str(target_json).map_err(|error| error.to_string())?;
    let params = compute_edge_params(&source, &target, config.node_size);
    serde_json::to_string(&params).map_err(|error| error.to_string())
}

/// Auto-arranges a `{ nodes, edges }` document and returns it with new
/// positions and `sourceHandle`/`targetHandle` set.
#[wasm_bindgen]
pub fn layout_flow(doc_json: &str, config_json: Option<String>) -> Result<String, JsValue> {
    layout_json(doc_json, config_json).map_err(to_js_error)
}

/// Floating-edge parameters for two nodes at their current positions.
#[wasm_bindgen]
pub fn edge_params(
    source_json: &str,
    target_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    edge_params_json(source_json, target_json, config_json).map_err(to_js_error)
}
