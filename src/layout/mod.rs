//! Automatic arrangement of attack flow diagrams.
//!
//! Layout runs in two passes. A hierarchical engine ranks and places every
//! node as a uniform box, with edges between backbone (action) nodes weighted
//! so the technique chain stays short and straight. Each edge then gets the
//! pair of facing sides that suits the final positions.

mod engine;
mod sides;

use std::collections::HashMap;

use serde_json::Map;
use tracing::{debug, warn};

pub use engine::{DagreEngine, GraphOptions, LayoutEdge, LayoutEngine, LayoutGraph, LayoutVertex};
pub use sides::{
    EdgeParams, HandleId, HandleMarker, HandleRole, Side, SideSelection, anchor_point,
    edge_params, handle_markers, select_sides,
};

use crate::config::{LayoutConfig, NodeSize};
use crate::ir::{EdgeRef, FlowDocument, NodeBox, Point};

/// Weight of an edge joining two backbone nodes.
pub const BACKBONE_EDGE_WEIGHT: f32 = 10.0;
/// Weight of every other edge.
pub const DEFAULT_EDGE_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub edge: EdgeRef,
    /// `None` when an endpoint is not part of the diagram; `edge` is then
    /// passed through untouched.
    pub params: Option<EdgeParams>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub nodes: Vec<NodeBox>,
    pub edges: Vec<EdgeLayout>,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&NodeBox> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.node(id).map(|node| node.position)
    }

    pub fn into_document(self) -> FlowDocument {
        FlowDocument {
            nodes: self.nodes,
            edges: self.edges.into_iter().map(|layout| layout.edge).collect(),
            extra: Map::new(),
        }
    }
}

pub fn edge_weight(source: Option<&NodeBox>, target: Option<&NodeBox>) -> f32 {
    match (source, target) {
        (Some(source), Some(target)) if source.is_backbone() && target.is_backbone() => {
            BACKBONE_EDGE_WEIGHT
        }
        _ => DEFAULT_EDGE_WEIGHT,
    }
}

fn index_nodes(nodes: &[NodeBox]) -> HashMap<&str, &NodeBox> {
    let mut index = HashMap::with_capacity(nodes.len());
    for node in nodes {
        index.entry(node.id.as_str()).or_insert(node);
    }
    index
}

/// Builds the engine input: one uniform vertex per node and one weighted
/// edge per distinct connection between known nodes.
pub fn build_layout_graph(
    nodes: &[NodeBox],
    edges: &[EdgeRef],
    config: &LayoutConfig,
) -> LayoutGraph {
    let mut graph = LayoutGraph::new(GraphOptions::from_config(config));
    for node in nodes {
        graph.add_vertex(LayoutVertex {
            id: node.id.clone(),
            width: config.node_size.width,
            height: config.node_size.height,
            padding_left: config.padding_left,
            padding_right: config.padding_right,
        });
    }

    let index = index_nodes(nodes);
    for edge in edges {
        let source = index.get(edge.source.as_str()).copied();
        let target = index.get(edge.target.as_str()).copied();
        let weight = edge_weight(source, target);
        let layout_edge =
            LayoutEdge::new(edge.source.as_str(), edge.target.as_str()).with_weight(weight);
        if !graph.add_edge(layout_edge) && (source.is_none() || target.is_none()) {
            warn!(
                from = %edge.source,
                to = %edge.target,
                "edge references an unknown node; left out of layout"
            );
        }
    }
    graph
}

/// Lays the diagram out with [`DagreEngine`].
pub fn compute_layout(nodes: &[NodeBox], edges: &[EdgeRef], config: &LayoutConfig) -> LayoutResult {
    compute_layout_with(&DagreEngine, nodes, edges, config)
}

pub fn compute_layout_with<E: LayoutEngine + ?Sized>(
    engine: &E,
    nodes: &[NodeBox],
    edges: &[EdgeRef],
    config: &LayoutConfig,
) -> LayoutResult {
    let graph = build_layout_graph(nodes, edges, config);
    debug!(
        vertices = graph.vertices().len(),
        edges = graph.edges().len(),
        direction = config.direction.as_token(),
        "running hierarchical layout"
    );
    let centers = if graph.is_empty() {
        Default::default()
    } else {
        engine.layout(&graph)
    };

    let half_width = config.node_size.width / 2.0;
    let half_height = config.node_size.height / 2.0;
    let laid_out: Vec<NodeBox> = nodes
        .iter()
        .map(|node| {
            let mut placed = node.clone();
            match centers.get(&node.id) {
                Some(center) => {
                    placed.position = Point::new(center.x - half_width, center.y - half_height);
                }
                None => {
                    warn!(node = %node.id, "layout engine did not place node; keeping its position")
                }
            }
            placed
        })
        .collect();

    let routed = route_edges(&laid_out, edges, config.node_size);
    LayoutResult {
        nodes: laid_out,
        edges: routed,
    }
}

/// Assigns handles and anchor points to every edge at the nodes' current
/// positions. This is the whole job while a node is being dragged.
pub fn route_edges(nodes: &[NodeBox], edges: &[EdgeRef], defaults: NodeSize) -> Vec<EdgeLayout> {
    let index = index_nodes(nodes);
    edges
        .iter()
        .map(|edge| {
            let (Some(source), Some(target)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                debug!(from = %edge.source, to = %edge.target, "edge endpoint missing; not routed");
                return EdgeLayout {
                    edge: edge.clone(),
                    params: None,
                };
            };
            let params = edge_params(source, target, defaults);
            let mut routed = edge.clone();
            routed.source_handle = Some(params.source_handle_id);
            routed.target_handle = Some(params.target_handle_id);
            EdgeLayout {
                edge: routed,
                params: Some(params),
            }
        })
        .collect()
}
