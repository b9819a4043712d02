pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{LayoutConfig, NodeSize, load_config, parse_config};
pub use error::LoadError;
pub use ir::{Direction, EdgeRef, FlowDocument, NodeBox, NodeCategory, Point};
pub use layout::{
    EdgeLayout, EdgeParams, HandleId, LayoutResult, Side, compute_layout, edge_params,
    route_edges, select_sides,
};

#[cfg(feature = "cli")]
pub use cli::run;

/// Auto-arranges a whole document and returns it with new positions and
/// handle assignments.
/// Fields layout does not understand (node `data`, edge styling, unknown
/// node types, the viewport) come back as they went in.
pub fn layout_document(document: &FlowDocument, config: &LayoutConfig) -> FlowDocument {
    let mut laid_out = compute_layout(&document.nodes, &document.edges, config).into_document();
    laid_out.extra = document.extra.clone();
    laid_out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_document_keeps_editor_fields() {
        let json = r#"{
            "nodes": [
                {"id": "a", "type": "attack-action", "position": {"x": 0, "y": 0},
                 "data": {"name": "Phishing", "technique_id": "T1566"}},
                {"id": "b", "type": "custom-widget", "position": {"x": 0, "y": 0},
                 "data": {"label": "X"}, "selected": true}
            ],
            "edges": [
                {"id": "e1", "source": "a", "target": "b", "type": "floating", "animated": true},
                {"id": "e2", "source": "b", "target": "gone", "label": "stale",
                 "targetHandle": "left-target"}
            ],
            "viewport": {"x": 0, "y": 0, "zoom": 1.5}
        }"#;
        let document: FlowDocument = serde_json::from_str(json).unwrap();
        let laid_out = layout_document(&document, &LayoutConfig::default());

        let b = laid_out.node("b").unwrap();
        assert_eq!(b.category, Some(NodeCategory::Other("custom-widget".to_string())));
        assert_eq!(b.extra, document.nodes[1].extra);
        assert_eq!(laid_out.nodes[0].extra["data"]["technique_id"], "T1566");
        assert_eq!(laid_out.edges[0].extra["type"], "floating");
        assert_eq!(laid_out.edges[0].extra["animated"], true);
        assert!(laid_out.edges[0].source_handle.is_some());
        assert_eq!(laid_out.edges[1], document.edges[1]);
        assert_eq!(laid_out.extra["viewport"]["zoom"], 1.5);

        let value = serde_json::to_value(&laid_out).unwrap();
        assert_eq!(value["nodes"][1]["type"], "custom-widget");
        assert_eq!(value["nodes"][1]["data"]["label"], "X");
        assert_eq!(value["edges"][1]["label"], "stale");
    }
}
