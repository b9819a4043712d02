use std::collections::{BTreeMap, HashSet};

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use crate::config::LayoutConfig;
use crate::ir::{Direction, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphOptions {
    pub direction: Direction,
    pub rank_spacing: f32,
    pub node_spacing: f32,
    pub edge_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl GraphOptions {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            direction: config.direction,
            rank_spacing: config.rank_spacing,
            node_spacing: config.node_spacing,
            edge_spacing: config.edge_spacing,
            margin_x: config.margin_x,
            margin_y: config.margin_y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutVertex {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub padding_left: f32,
    pub padding_right: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    pub weight: f32,
    pub minlen: f32,
}

impl LayoutEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: 1.0,
            minlen: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

/// Directed, simple graph handed to a [`LayoutEngine`]. Vertices keep
/// insertion order; repeated ids and repeated `(source, target)` pairs are
/// ignored after the first.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGraph {
    pub options: GraphOptions,
    vertices: Vec<LayoutVertex>,
    edges: Vec<LayoutEdge>,
    vertex_ids: HashSet<String>,
    edge_keys: HashSet<(String, String)>,
}

impl LayoutGraph {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            vertices: Vec::new(),
            edges: Vec::new(),
            vertex_ids: HashSet::new(),
            edge_keys: HashSet::new(),
        }
    }

    pub fn add_vertex(&mut self, vertex: LayoutVertex) -> bool {
        if !self.vertex_ids.insert(vertex.id.clone()) {
            return false;
        }
        self.vertices.push(vertex);
        true
    }

    /// Rejects self-loops, edges touching unknown vertices, and repeats.
    pub fn add_edge(&mut self, edge: LayoutEdge) -> bool {
        if edge.source == edge.target
            || !self.has_vertex(&edge.source)
            || !self.has_vertex(&edge.target)
        {
            return false;
        }
        if !self
            .edge_keys
            .insert((edge.source.clone(), edge.target.clone()))
        {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn has_vertex(&self, id: &str) -> bool {
        self.vertex_ids.contains(id)
    }

    pub fn vertices(&self) -> &[LayoutVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&LayoutEdge> {
        self.edges
            .iter()
            .find(|edge| edge.source == source && edge.target == target)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// A hierarchical layout algorithm: takes the graph, returns the center of
/// every vertex it placed.
pub trait LayoutEngine {
    fn layout(&self, graph: &LayoutGraph) -> BTreeMap<String, Point>;
}

/// Sugiyama-style layout through `dagre_rust`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagreEngine;

impl LayoutEngine for DagreEngine {
    fn layout(&self, graph: &LayoutGraph) -> BTreeMap<String, Point> {
        let mut centers = BTreeMap::new();
        if graph.is_empty() {
            return centers;
        }

        let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
            DagreGraph::new(Some(GraphOption {
                directed: Some(true),
                multigraph: Some(false),
                compound: Some(false),
            }));

        let options = &graph.options;
        let mut graph_config = DagreConfig::default();
        graph_config.rankdir = Some(dagre_rankdir(options.direction).to_string());
        graph_config.ranksep = Some(options.rank_spacing);
        graph_config.nodesep = Some(options.node_spacing);
        graph_config.edgesep = Some(options.edge_spacing);
        graph_config.marginx = Some(options.margin_x);
        graph_config.marginy = Some(options.margin_y);
        dagre_graph.set_graph(graph_config);

        // dagre only sizes leaf nodes by width/height; padding matters to clusters.
        for vertex in graph.vertices() {
            let mut node = DagreNode::default();
            node.width = vertex.width;
            node.height = vertex.height;
            dagre_graph.set_node(vertex.id.clone(), Some(node));
        }

        for edge in graph.edges() {
            let mut edge_label = DagreEdge::default();
            edge_label.weight = Some(edge.weight);
            edge_label.minlen = Some(edge.minlen);
            let _ = dagre_graph.set_edge(&edge.source, &edge.target, Some(edge_label), None);
        }

        dagre_layout::run_layout(&mut dagre_graph);

        for vertex in graph.vertices() {
            let Some(dagre_node) = dagre_graph.node(&vertex.id) else {
                continue;
            };
            centers.insert(vertex.id.clone(), Point::new(dagre_node.x, dagre_node.y));
        }
        centers
    }
}

fn dagre_rankdir(direction: Direction) -> &'static str {
    match direction {
        Direction::TopDown => "tb",
        Direction::BottomTop => "bt",
        Direction::LeftRight => "lr",
        Direction::RightLeft => "rl",
    }
}
