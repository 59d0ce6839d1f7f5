//! Core scene data model for Maquette pages.
//!
//! A `Scene` is one editable page: canvas dimensions, a background color,
//! and a flat, z-ordered sequence of `Node`s (paint order = index order,
//! front = last). Node kinds are a closed tagged variant with no
//! open-ended dynamic property bags. Positions are absolute canvas units;
//! the rendering engine consumes them through the surface adapter.

use crate::filter::EffectChain;
use crate::id::NodeId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0]; serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RRGGBB` or `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            6 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    1.0,
                ))
            }
            8 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                let a = hex_val(bytes[6])? << 4 | hex_val(bytes[7])?;
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    a as f32 / 255.0,
                ))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color {s:?}")))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// AABB overlap test.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Canvas axis. A guide on `Axis::X` is a vertical line at a fixed x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

// ─── Text & stroke styling ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub weight: u16, // 100..900
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Lato".into(),
            weight: 400,
            size: 24.0,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// Explicit styling defaults handed to the surface adapter at construction.
/// New nodes pick these up instead of reading shared mutable globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefaults {
    pub font: FontSpec,
    pub text_fill: Color,
    pub shape_fill: Color,
    pub stroke: Option<Stroke>,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            text_fill: Color::BLACK,
            shape_fill: Color::rgba(0.85, 0.85, 0.85, 1.0),
            stroke: None,
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Geometric primitive carried by a shape node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect { corner_radius: f32 },
    Ellipse,
}

/// The node kinds that can appear on a page.
///
/// `Guide` is transient drag feedback: non-selectable, never serialized,
/// never exported. It exists only while a drag session is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Image {
        source: String,
        #[serde(default)]
        effects: EffectChain,
    },
    Text {
        content: String,
        font: FontSpec,
        fill: Color,
        #[serde(default)]
        align: TextAlign,
    },
    Shape {
        shape: ShapeKind,
        fill: Color,
        stroke: Option<Stroke>,
    },
    Guide {
        axis: Axis,
        at: f32,
    },
}

/// One visual element on a page: shared base record + closed kind variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees, clockwise.
    pub rotation: f32,
    /// 0.0 (transparent) ..= 1.0 (opaque).
    pub opacity: f32,
    pub selectable: bool,
    /// Free-form grouping label; also used to exclude nodes from export.
    pub label: Option<String>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            selectable: true,
            label: None,
            kind,
        }
    }

    /// An image node with an empty effect chain and a generated id.
    pub fn image(source: impl Into<String>) -> Self {
        Self::new(
            NodeId::with_prefix("image"),
            NodeKind::Image {
                source: source.into(),
                effects: EffectChain::default(),
            },
        )
    }

    /// A text node styled from the surface's defaults.
    pub fn text(content: impl Into<String>, defaults: &StyleDefaults) -> Self {
        Self::new(
            NodeId::with_prefix("text"),
            NodeKind::Text {
                content: content.into(),
                font: defaults.font.clone(),
                fill: defaults.text_fill,
                align: TextAlign::default(),
            },
        )
    }

    /// A shape node styled from the surface's defaults.
    pub fn shape(shape: ShapeKind, defaults: &StyleDefaults) -> Self {
        Self::new(
            NodeId::with_prefix("shape"),
            NodeKind::Shape {
                shape,
                fill: defaults.shape_fill,
                stroke: defaults.stroke.clone(),
            },
        )
    }

    /// A transient alignment guide. Never selectable, never persisted.
    pub fn guide(axis: Axis, at: f32, span: f32) -> Self {
        let mut node = Self::new(NodeId::with_prefix("guide"), NodeKind::Guide { axis, at });
        node.selectable = false;
        node.label = Some("snap-guide".into());
        match axis {
            Axis::X => {
                node.x = at;
                node.height = span;
            }
            Axis::Y => {
                node.y = at;
                node.width = span;
            }
        }
        node
    }

    /// Position + size as one rectangle.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
    }

    pub fn is_guide(&self) -> bool {
        matches!(self.kind, NodeKind::Guide { .. })
    }

    /// Builder-style frame assignment, for terse construction in callers.
    pub fn with_frame(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// One editable page: canvas dimensions, background, z-ordered nodes.
///
/// Invariants (violations are programming errors and fail fast):
/// - `width` and `height` are positive
/// - node ids are unique within the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub background: Color,
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new(id: impl Into<String>, width: f32, height: f32) -> Self {
        assert!(
            width > 0.0 && height > 0.0,
            "scene dimensions must be positive: {width}x{height}"
        );
        Self {
            id: id.into(),
            width,
            height,
            background: Color::WHITE,
            nodes: Vec::new(),
        }
    }

    /// Rebuild a scene from parts, validating instead of asserting.
    /// Used by the codec, where invalid input is malformed data rather
    /// than a bug.
    pub(crate) fn from_parts(
        id: String,
        width: f32,
        height: f32,
        background: Color,
        nodes: Vec<Node>,
    ) -> Result<Self, String> {
        if !(width > 0.0 && height > 0.0) {
            return Err(format!("non-positive canvas dimensions {width}x{height}"));
        }
        let mut seen = std::collections::HashSet::new();
        for node in &nodes {
            if node.is_guide() {
                return Err(format!("transient guide node {} in persisted scene", node.id));
            }
            if !seen.insert(node.id) {
                return Err(format!("duplicate node id {}", node.id));
            }
        }
        Ok(Self {
            id,
            width,
            height,
            background,
            nodes,
        })
    }

    pub fn canvas_bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }

    /// Nodes in paint order (front = last).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node at the front of the z-order.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        assert!(
            self.node(node.id).is_none(),
            "duplicate node id {} in scene {}",
            node.id,
            self.id
        );
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(pos))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Mutable lookup. Callers must not change the node's `id`.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn bounds_of(&self, id: NodeId) -> Option<Bounds> {
        self.node(id).map(Node::bounds)
    }

    /// Bounds of every non-guide node except `id`, in z-order.
    /// This is the sibling set the snap engine aligns against.
    pub fn sibling_bounds(&self, id: NodeId) -> Vec<Bounds> {
        self.nodes
            .iter()
            .filter(|n| n.id != id && !n.is_guide())
            .map(Node::bounds)
            .collect()
    }

    /// Remove every transient guide node. Returns the removed ids.
    pub fn clear_guides(&mut self) -> Vec<NodeId> {
        let removed: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_guide())
            .map(|n| n.id)
            .collect();
        self.nodes.retain(|n| !n.is_guide());
        removed
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Swap with the next node toward the front. Returns true on change.
    pub fn bring_forward(&mut self, id: NodeId) -> bool {
        match self.position(id) {
            Some(pos) if pos + 1 < self.nodes.len() => {
                self.nodes.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Swap with the previous node toward the back. Returns true on change.
    pub fn send_backward(&mut self, id: NodeId) -> bool {
        match self.position(id) {
            Some(pos) if pos > 0 => {
                self.nodes.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    /// Move to the front of the paint order (last index).
    pub fn bring_to_front(&mut self, id: NodeId) -> bool {
        match self.position(id) {
            Some(pos) if pos + 1 < self.nodes.len() => {
                let node = self.nodes.remove(pos);
                self.nodes.push(node);
                true
            }
            _ => false,
        }
    }

    /// Move to the back of the paint order (index 0).
    pub fn send_to_back(&mut self, id: NodeId) -> bool {
        match self.position(id) {
            Some(pos) if pos > 0 => {
                let node = self.nodes.remove(pos);
                self.nodes.insert(0, node);
                true
            }
            _ => false,
        }
    }

    /// Clone a node with a fresh id, offset slightly, placed at the front.
    /// Returns the new node's id.
    pub fn duplicate_node(&mut self, id: NodeId) -> Option<NodeId> {
        let original = self.node(id)?.clone();
        let prefix = match original.kind {
            NodeKind::Image { .. } => "image",
            NodeKind::Text { .. } => "text",
            NodeKind::Shape { .. } => "shape",
            NodeKind::Guide { .. } => return None,
        };
        let mut copy = original;
        copy.id = NodeId::with_prefix(prefix);
        copy.x += 10.0;
        copy.y += 10.0;
        Some(self.add_node(copy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with(ids: &[&str]) -> Scene {
        let mut scene = Scene::new("page", 700.0, 900.0);
        for id in ids {
            scene.add_node(
                Node::new(
                    NodeId::intern(id),
                    NodeKind::Shape {
                        shape: ShapeKind::Rect { corner_radius: 0.0 },
                        fill: Color::BLACK,
                        stroke: None,
                    },
                )
                .with_frame(0.0, 0.0, 10.0, 10.0),
            );
        }
        scene
    }

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6C5CE7").unwrap();
        assert_eq!(c.to_hex(), "#6C5CE7");

        let c2 = Color::from_hex("#FF000080").unwrap();
        assert!((c2.a - 128.0 / 255.0).abs() < 0.01);
        assert_eq!(c2.to_hex().len(), 9); // #RRGGBBAA
    }

    #[test]
    fn add_and_lookup() {
        let scene = scene_with(&["a", "b"]);
        assert_eq!(scene.len(), 2);
        assert!(scene.node(NodeId::intern("a")).is_some());
        assert!(scene.node(NodeId::intern("missing")).is_none());
    }

    #[test]
    #[should_panic(expected = "duplicate node id")]
    fn duplicate_id_fails_fast() {
        let mut scene = scene_with(&["a"]);
        scene.add_node(Node::new(
            NodeId::intern("a"),
            NodeKind::Guide {
                axis: Axis::X,
                at: 0.0,
            },
        ));
    }

    #[test]
    #[should_panic(expected = "dimensions must be positive")]
    fn zero_canvas_fails_fast() {
        let _ = Scene::new("bad", 0.0, 100.0);
    }

    #[test]
    fn z_order_operations() {
        let mut scene = scene_with(&["a", "b", "c"]);
        let a = NodeId::intern("a");
        let c = NodeId::intern("c");

        assert!(scene.bring_to_front(a));
        assert_eq!(scene.nodes().last().unwrap().id, a);
        // Already frontmost
        assert!(!scene.bring_to_front(a));

        assert!(scene.send_to_back(a));
        assert_eq!(scene.nodes()[0].id, a);

        assert!(scene.send_backward(c));
        assert!(scene.bring_forward(c));
        assert!(!scene.bring_forward(scene.nodes().last().unwrap().id));
    }

    #[test]
    fn sibling_bounds_excludes_self_and_guides() {
        let mut scene = scene_with(&["a", "b"]);
        scene.add_node(Node::guide(Axis::X, 350.0, 900.0));

        let siblings = scene.sibling_bounds(NodeId::intern("a"));
        assert_eq!(siblings.len(), 1);
    }

    #[test]
    fn clear_guides_removes_only_guides() {
        let mut scene = scene_with(&["a"]);
        scene.add_node(Node::guide(Axis::X, 100.0, 900.0));
        scene.add_node(Node::guide(Axis::Y, 450.0, 700.0));

        let removed = scene.clear_guides();
        assert_eq!(removed.len(), 2);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.nodes()[0].id, NodeId::intern("a"));
    }

    #[test]
    fn duplicate_offsets_and_renames() {
        let mut scene = scene_with(&["a"]);
        let copy_id = scene.duplicate_node(NodeId::intern("a")).unwrap();
        assert_ne!(copy_id, NodeId::intern("a"));

        let copy = scene.node(copy_id).unwrap();
        assert_eq!(copy.x, 10.0);
        assert_eq!(copy.y, 10.0);
        assert_eq!(scene.nodes().last().unwrap().id, copy_id);
    }

    #[test]
    fn guides_are_never_selectable() {
        let guide = Node::guide(Axis::Y, 450.0, 700.0);
        assert!(!guide.selectable);
        assert!(guide.is_guide());
    }
}
