use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::NodeSize;
use crate::layout::HandleId;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB")]
    TopDown,
    #[serde(rename = "BT")]
    BottomTop,
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "RL")]
    RightLeft,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "TB" | "TD" => Some(Self::TopDown),
            "BT" => Some(Self::BottomTop),
            "LR" => Some(Self::LeftRight),
            "RL" => Some(Self::RightLeft),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Direction::TopDown => "TB",
            Direction::BottomTop => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        }
    }
}

/// Node categories of an attack flow. `Action` nodes form the technique
/// backbone; everything hanging off them is auxiliary. Tags this crate does
/// not know are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Action,
    Asset,
    Condition,
    Operator,
    Malware,
    Tool,
    Infrastructure,
    Vulnerability,
    Url,
    Identity,
    Note,
    Other(String),
}

impl NodeCategory {
    const KNOWN: [NodeCategory; 11] = [
        NodeCategory::Action,
        NodeCategory::Asset,
        NodeCategory::Condition,
        NodeCategory::Operator,
        NodeCategory::Malware,
        NodeCategory::Tool,
        NodeCategory::Infrastructure,
        NodeCategory::Vulnerability,
        NodeCategory::Url,
        NodeCategory::Identity,
        NodeCategory::Note,
    ];

    pub fn from_tag(tag: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|category| category.as_str() == tag)
            .unwrap_or_else(|| NodeCategory::Other(tag.to_string()))
    }

    /// The `type` string the editor uses for this category.
    pub fn as_str(&self) -> &str {
        match self {
            NodeCategory::Action => "attack-action",
            NodeCategory::Asset => "attack-asset",
            NodeCategory::Condition => "attack-condition",
            NodeCategory::Operator => "attack-operator",
            NodeCategory::Malware => "malware",
            NodeCategory::Tool => "tool",
            NodeCategory::Infrastructure => "infrastructure",
            NodeCategory::Vulnerability => "vulnerability",
            NodeCategory::Url => "url",
            NodeCategory::Identity => "identity",
            NodeCategory::Note => "note",
            NodeCategory::Other(tag) => tag,
        }
    }

    pub fn is_backbone(&self) -> bool {
        match self {
            NodeCategory::Action => true,
            NodeCategory::Asset
            | NodeCategory::Condition
            | NodeCategory::Operator
            | NodeCategory::Malware
            | NodeCategory::Tool
            | NodeCategory::Infrastructure
            | NodeCategory::Vulnerability
            | NodeCategory::Url
            | NodeCategory::Identity
            | NodeCategory::Note
            | NodeCategory::Other(_) => false,
        }
    }
}

impl Serialize for NodeCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(NodeCategory::from_tag(&tag))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBox {
    pub id: String,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<NodeCategory>,
    /// Editor fields layout never looks at (`data`, `style`, ...), carried
    /// through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeBox {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            position: Point::new(x, y),
            width: None,
            height: None,
            category: None,
            extra: Map::new(),
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_category(mut self, category: NodeCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_backbone(&self) -> bool {
        self.category.as_ref().is_some_and(NodeCategory::is_backbone)
    }

    /// Width and height with `defaults` filling in sizes the editor has not
    /// measured yet. Zero and NaN count as unmeasured.
    pub fn size(&self, defaults: NodeSize) -> (f32, f32) {
        (
            measured(self.width).unwrap_or(defaults.width),
            measured(self.height).unwrap_or(defaults.height),
        )
    }

    pub fn center(&self, defaults: NodeSize) -> Point {
        let (width, height) = self.size(defaults);
        Point::new(
            self.position.x + width / 2.0,
            self.position.y + height / 2.0,
        )
    }
}

fn measured(value: Option<f32>) -> Option<f32> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<HandleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<HandleId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EdgeRef {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            extra: Map::new(),
        }
    }
}

/// A diagram as the editor exchanges it: nodes plus the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub nodes: Vec<NodeBox>,
    #[serde(default)]
    pub edges: Vec<EdgeRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowDocument {
    pub fn node(&self, id: &str) -> Option<&NodeBox> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmeasured_sizes_fall_back_to_defaults() {
        let defaults = NodeSize::default();
        let node = NodeBox::new("a", 0.0, 0.0);
        assert_eq!(node.size(defaults), (200.0, 120.0));

        let zero = NodeBox::new("b", 0.0, 0.0).with_size(0.0, f32::NAN);
        assert_eq!(zero.size(defaults), (200.0, 120.0));

        let sized = NodeBox::new("c", 10.0, 20.0).with_size(80.0, 40.0);
        assert_eq!(sized.size(defaults), (80.0, 40.0));
        assert_eq!(sized.center(defaults), Point::new(50.0, 40.0));
    }

    #[test]
    fn parses_editor_node_types() {
        let json = r#"{
            "nodes": [
                {"id": "a", "position": {"x": 1, "y": 2}, "type": "attack-action"},
                {"id": "b", "position": {"x": 0, "y": 0}, "type": "attack-asset", "width": 180},
                {"id": "c", "position": {"x": 0, "y": 0}, "type": "sticky-widget"},
                {"id": "d", "position": {"x": 0, "y": 0}}
            ],
            "edges": [{"id": "e1", "source": "a", "target": "b"}]
        }"#;
        let doc: FlowDocument = serde_json::from_str(json).expect("document should parse");
        assert_eq!(doc.nodes[0].category, Some(NodeCategory::Action));
        assert!(doc.nodes[0].is_backbone());
        assert_eq!(doc.nodes[1].category, Some(NodeCategory::Asset));
        assert_eq!(doc.nodes[1].width, Some(180.0));
        assert_eq!(
            doc.nodes[2].category,
            Some(NodeCategory::Other("sticky-widget".to_string()))
        );
        assert_eq!(doc.nodes[3].category, None);
        assert!(!doc.nodes[3].is_backbone());
        assert_eq!(doc.edges[0].source_handle, None);
        assert!(doc.node("c").is_some());
    }

    #[test]
    fn unknown_fields_and_tags_round_trip() {
        let json = r##"{
            "nodes": [{
                "id": "b",
                "type": "custom-widget",
                "position": {"x": 10.5, "y": 20.25},
                "data": {"label": "X", "techniqueId": "T1566"},
                "selected": true
            }],
            "edges": [{
                "source": "b",
                "target": "c",
                "type": "floating",
                "animated": true,
                "label": "then",
                "style": {"stroke": "#f00"}
            }],
            "viewport": {"zoom": 1.5}
        }"##;
        let doc: FlowDocument = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        let expected: Value = serde_json::from_str(json).unwrap();
        assert_eq!(value, expected);
        assert_eq!(doc.nodes[0].extra["data"]["label"], "X");
        assert_eq!(doc.edges[0].extra["type"], "floating");
    }

    #[test]
    fn category_tags_match_editor_types() {
        assert_eq!(NodeCategory::from_tag("attack-action"), NodeCategory::Action);
        assert_eq!(NodeCategory::from_tag("note"), NodeCategory::Note);
        assert_eq!(NodeCategory::Asset.as_str(), "attack-asset");
        let json = serde_json::to_string(&NodeCategory::Other("custom".into())).unwrap();
        assert_eq!(json, "\"custom\"");
    }

    #[test]
    fn direction_tokens() {
        assert_eq!(Direction::from_token("td"), Some(Direction::TopDown));
        assert_eq!(Direction::from_token("RL"), Some(Direction::RightLeft));
        assert_eq!(Direction::from_token("diagonal"), None);
        assert_eq!(Direction::LeftRight.as_token(), "LR");
    }
}
