use crate::config::LayoutConfig;
use crate::layout::{HandleId, LayoutResult, handle_markers};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub direction: String,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub category: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub handles: Vec<HandleDump>,
}

#[derive(Debug, Serialize)]
pub struct HandleDump {
    pub id: HandleId,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    pub source_handle: Option<HandleId>,
    pub target_handle: Option<HandleId>,
    pub points: Option<[[f32; 2]; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &LayoutResult, config: &LayoutConfig) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| {
                let (width, height) = node.size(config.node_size);
                NodeDump {
                    id: node.id.clone(),
                    category: node.category.as_ref().map(|c| c.as_str().to_string()),
                    x: node.position.x,
                    y: node.position.y,
                    width,
                    height,
                    handles: handle_markers(node, config.node_size, config.handle_offset)
                        .into_iter()
                        .map(|marker| HandleDump {
                            id: marker.id,
                            x: marker.center.x,
                            y: marker.center.y,
                        })
                        .collect(),
                }
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|routed| EdgeDump {
                id: routed.edge.id.clone(),
                source: routed.edge.source.clone(),
                target: routed.edge.target.clone(),
                source_handle: routed.edge.source_handle,
                target_handle: routed.edge.target_handle,
                points: routed
                    .params
                    .map(|p| [[p.sx, p.sy], [p.tx, p.ty]]),
            })
            .collect();

        LayoutDump {
            direction: config.direction.as_token().to_string(),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump_to<W: Write>(
    writer: W,
    layout: &LayoutResult,
    config: &LayoutConfig,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, config);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EdgeRef, NodeBox, NodeCategory};
    use crate::layout::route_edges;

    #[test]
    fn dump_uses_editor_type_tags() {
        let mut config = LayoutConfig::default();
        config.handle_offset = 5.0;
        let nodes = vec![
            NodeBox::new("a", 0.0, 0.0).with_category(NodeCategory::Action),
            NodeBox::new("b", 0.0, 0.0).with_category(NodeCategory::Other("custom".to_string())),
        ];
        let layout = LayoutResult {
            nodes,
            edges: Vec::new(),
        };
        let dump = LayoutDump::from_layout(&layout, &config);
        assert_eq!(dump.nodes[0].category.as_deref(), Some("attack-action"));
        assert_eq!(dump.nodes[1].category.as_deref(), Some("custom"));
        let right = dump.nodes[0]
            .handles
            .iter()
            .find(|h| h.id.as_str() == "right-target")
            .unwrap();
        assert_eq!((right.x, right.y), (205.0, 60.0));
    }

    #[test]
    fn dump_lists_points_for_routed_edges() {
        let config = LayoutConfig::default();
        let nodes = vec![
            NodeBox::new("a", 0.0, 0.0),
            NodeBox::new("b", 0.0, 300.0).with_size(100.0, 50.0),
        ];
        let edges = vec![EdgeRef::new("a", "b"), EdgeRef::new("a", "missing")];
        let layout = LayoutResult {
            edges: route_edges(&nodes, &edges, config.node_size),
            nodes,
        };

        let dump = LayoutDump::from_layout(&layout, &config);
        assert_eq!(dump.direction, "TB");
        assert_eq!((dump.nodes[0].width, dump.nodes[0].height), (200.0, 120.0));
        assert_eq!((dump.nodes[1].width, dump.nodes[1].height), (100.0, 50.0));
        assert_eq!(dump.edges[0].points, Some([[100.0, 120.0], [50.0, 300.0]]));
        assert_eq!(dump.edges[1].points, None);

        assert_eq!(dump.nodes[0].category, None);
        let handles = &dump.nodes[0].handles;
        assert_eq!(handles.len(), 8);
        let top_source = handles
            .iter()
            .find(|h| h.id == HandleId::source(crate::layout::Side::Top))
            .unwrap();
        assert_eq!((top_source.x, top_source.y), (100.0, -config.handle_offset));

        let mut out = Vec::new();
        write_layout_dump_to(&mut out, &layout, &config).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"bottom-source\""));
        assert!(text.contains("\"top-target\""));
    }
}
