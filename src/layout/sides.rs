use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::NodeSize;
use crate::error::LoadError;
use crate::ir::{NodeBox, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Unit vector pointing out of the box through this side.
    fn outward(self) -> (f32, f32) {
        match self {
            Side::Top => (0.0, -1.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
            Side::Right => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleRole {
    Source,
    Target,
}

impl HandleRole {
    fn as_str(self) -> &'static str {
        match self {
            HandleRole::Source => "source",
            HandleRole::Target => "target",
        }
    }
}

/// One of the eight connection handles every node carries, written
/// `{side}-{role}` on the wire ("top-source", "left-target", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId {
    pub side: Side,
    pub role: HandleRole,
}

impl HandleId {
    pub const ALL: [HandleId; 8] = [
        HandleId::target(Side::Top),
        HandleId::source(Side::Top),
        HandleId::target(Side::Bottom),
        HandleId::source(Side::Bottom),
        HandleId::target(Side::Left),
        HandleId::source(Side::Left),
        HandleId::target(Side::Right),
        HandleId::source(Side::Right),
    ];

    pub const fn source(side: Side) -> Self {
        Self {
            side,
            role: HandleRole::Source,
        }
    }

    pub const fn target(side: Side) -> Self {
        Self {
            side,
            role: HandleRole::Target,
        }
    }

    pub fn as_str(self) -> &'static str {
        match (self.side, self.role) {
            (Side::Top, HandleRole::Source) => "top-source",
            (Side::Top, HandleRole::Target) => "top-target",
            (Side::Bottom, HandleRole::Source) => "bottom-source",
            (Side::Bottom, HandleRole::Target) => "bottom-target",
            (Side::Left, HandleRole::Source) => "left-source",
            (Side::Left, HandleRole::Target) => "left-target",
            (Side::Right, HandleRole::Source) => "right-source",
            (Side::Right, HandleRole::Target) => "right-target",
        }
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandleId {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LoadError::InvalidHandle(s.to_string());
        let (side, role) = s.split_once('-').ok_or_else(invalid)?;
        let side = Side::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == side)
            .ok_or_else(invalid)?;
        let role = [HandleRole::Source, HandleRole::Target]
            .into_iter()
            .find(|candidate| candidate.as_str() == role)
            .ok_or_else(invalid)?;
        Ok(HandleId { side, role })
    }
}

impl Serialize for HandleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HandleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideSelection {
    pub source_side: Side,
    pub target_side: Side,
    pub source_handle: HandleId,
    pub target_handle: HandleId,
}

impl SideSelection {
    fn exiting(source_side: Side) -> Self {
        let target_side = source_side.opposite();
        Self {
            source_side,
            target_side,
            source_handle: HandleId::source(source_side),
            target_handle: HandleId::target(target_side),
        }
    }
}

/// Picks the sides an edge from `source` to `target` should leave and enter.
///
/// The axis along which the centers are further apart wins; on a tie the
/// horizontal sides are used. Coincident centers (self-loops, stacked
/// nodes) always resolve to top-source / bottom-target.
pub fn select_sides(source: &NodeBox, target: &NodeBox, defaults: NodeSize) -> SideSelection {
    let from = source.center(defaults);
    let to = target.center(defaults);
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx == 0.0 && dy == 0.0 {
        return SideSelection::exiting(Side::Top);
    }

    let side = if dx.abs() >= dy.abs() {
        if dx > 0.0 { Side::Right } else { Side::Left }
    } else if dy > 0.0 {
        Side::Bottom
    } else {
        Side::Top
    };
    SideSelection::exiting(side)
}

/// Midpoint of `side` on the node's rectangle.
pub fn anchor_point(node: &NodeBox, side: Side, defaults: NodeSize) -> Point {
    let (width, height) = node.size(defaults);
    let Point { x, y } = node.position;
    match side {
        Side::Top => Point::new(x + width / 2.0, y),
        Side::Bottom => Point::new(x + width / 2.0, y + height),
        Side::Left => Point::new(x, y + height / 2.0),
        Side::Right => Point::new(x + width, y + height / 2.0),
    }
}

/// Everything a renderer needs to draw a floating edge between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeParams {
    pub sx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
    pub source_pos: Side,
    pub target_pos: Side,
    pub source_handle_id: HandleId,
    pub target_handle_id: HandleId,
}

impl EdgeParams {
    pub fn source_point(&self) -> Point {
        Point::new(self.sx, self.sy)
    }

    pub fn target_point(&self) -> Point {
        Point::new(self.tx, self.ty)
    }
}

pub fn edge_params(source: &NodeBox, target: &NodeBox, defaults: NodeSize) -> EdgeParams {
    let sides = select_sides(source, target, defaults);
    let start = anchor_point(source, sides.source_side, defaults);
    let end = anchor_point(target, sides.target_side, defaults);
    EdgeParams {
        sx: start.x,
        sy: start.y,
        tx: end.x,
        ty: end.y,
        source_pos: sides.source_side,
        target_pos: sides.target_side,
        source_handle_id: sides.source_handle,
        target_handle_id: sides.target_handle,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandleMarker {
    pub id: HandleId,
    pub center: Point,
}

/// Positions of the eight handle dots drawn on a node. Source and target
/// handles of the same side overlap.
pub fn handle_markers(node: &NodeBox, defaults: NodeSize, offset: f32) -> [HandleMarker; 8] {
    HandleId::ALL.map(|id| {
        let anchor = anchor_point(node, id.side, defaults);
        let (ox, oy) = id.side.outward();
        HandleMarker {
            id,
            center: Point::new(anchor.x + ox * offset, anchor.y + oy * offset),
        }
    })
}
