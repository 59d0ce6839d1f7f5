//! Surface adapter: one mutable scene per open page.
//!
//! The surface owns the authoritative `Scene` and forwards every mutation
//! to the rendering engine through `RenderBackend`. Styling defaults are
//! an explicit value passed at construction; nodes never read shared
//! mutable globals. Serialization hands out the opaque versioned blob the
//! history manager and template gateway store whole.

use crate::backend::RenderBackend;
use maq_core::error::MalformedSceneError;
use maq_core::filter::EffectChain;
use maq_core::id::NodeId;
use maq_core::model::{Color, Node, NodeKind, Scene, StyleDefaults};
use maq_core::{deserialize_scene, serialize_scene};

// ─── Partial updates ─────────────────────────────────────────────────────

/// A closed partial-properties record for `update_node`.
///
/// `None` leaves a field untouched. Kind-specific fields (`content`,
/// `source`, `effects`, `fill`) are ignored when the target node's
/// variant does not carry them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub opacity: Option<f32>,
    pub selectable: Option<bool>,
    /// `Some(None)` clears the label.
    pub label: Option<Option<String>>,
    /// Text nodes only.
    pub content: Option<String>,
    /// Image nodes only.
    pub source: Option<String>,
    /// Image nodes only; replaces the whole chain.
    pub effects: Option<EffectChain>,
    /// Text and shape nodes.
    pub fill: Option<Color>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn effects(mut self, chain: EffectChain) -> Self {
        self.effects = Some(chain);
        self
    }

    fn apply(&self, node: &mut Node) {
        if let Some(x) = self.x {
            node.x = x;
        }
        if let Some(y) = self.y {
            node.y = y;
        }
        if let Some(width) = self.width {
            node.width = width;
        }
        if let Some(height) = self.height {
            node.height = height;
        }
        if let Some(rotation) = self.rotation {
            node.rotation = rotation;
        }
        if let Some(opacity) = self.opacity {
            node.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(selectable) = self.selectable {
            node.selectable = selectable;
        }
        if let Some(label) = &self.label {
            node.label = label.clone();
        }

        match &mut node.kind {
            NodeKind::Image { source, effects } => {
                if let Some(new_source) = &self.source {
                    *source = new_source.clone();
                }
                if let Some(chain) = &self.effects {
                    *effects = chain.clone();
                }
            }
            NodeKind::Text { content, fill, .. } => {
                if let Some(new_content) = &self.content {
                    *content = new_content.clone();
                }
                if let Some(new_fill) = self.fill {
                    *fill = new_fill;
                }
            }
            NodeKind::Shape { fill, .. } => {
                if let Some(new_fill) = self.fill {
                    *fill = new_fill;
                }
            }
            NodeKind::Guide { .. } => {}
        }
    }
}

// ─── Surface ─────────────────────────────────────────────────────────────

/// Façade over the rendering engine; owns one scene per open page.
pub struct Surface<B: RenderBackend> {
    scene: Scene,
    defaults: StyleDefaults,
    backend: B,
}

impl<B: RenderBackend> Surface<B> {
    /// Create a surface for a fresh page. Dimensions must be positive.
    pub fn new(
        page_id: impl Into<String>,
        width: f32,
        height: f32,
        defaults: StyleDefaults,
        mut backend: B,
    ) -> Self {
        let scene = Scene::new(page_id, width, height);
        backend.surface_created(&scene, &defaults);
        Self {
            scene,
            defaults,
            backend,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    // ─── Node mutations ──────────────────────────────────────────────────

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = self.scene.add_node(node);
        if let Some(added) = self.scene.node(id) {
            self.backend.node_added(added);
        }
        id
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let removed = self.scene.remove_node(id)?;
        self.backend.node_removed(id);
        Some(removed)
    }

    /// Apply a partial-properties update. Returns false for unknown ids.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        match self.scene.node_mut(id) {
            Some(node) => {
                patch.apply(node);
                self.backend.node_updated(node);
                true
            }
            None => false,
        }
    }

    /// Run an arbitrary in-place mutation, then notify the engine.
    /// The closure must not change the node's id.
    pub fn mutate_node(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) -> bool {
        match self.scene.node_mut(id) {
            Some(node) => {
                f(node);
                self.backend.node_updated(node);
                true
            }
            None => false,
        }
    }

    pub fn set_background(&mut self, color: Color) {
        self.scene.background = color;
        self.backend.scene_replaced(&self.scene);
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    pub fn bring_forward(&mut self, id: NodeId) -> bool {
        let changed = self.scene.bring_forward(id);
        self.reordered(changed)
    }

    pub fn send_backward(&mut self, id: NodeId) -> bool {
        let changed = self.scene.send_backward(id);
        self.reordered(changed)
    }

    pub fn bring_to_front(&mut self, id: NodeId) -> bool {
        let changed = self.scene.bring_to_front(id);
        self.reordered(changed)
    }

    pub fn send_to_back(&mut self, id: NodeId) -> bool {
        let changed = self.scene.send_to_back(id);
        self.reordered(changed)
    }

    pub fn duplicate_node(&mut self, id: NodeId) -> Option<NodeId> {
        let copy_id = self.scene.duplicate_node(id)?;
        if let Some(copy) = self.scene.node(copy_id) {
            self.backend.node_added(copy);
        }
        Some(copy_id)
    }

    fn reordered(&mut self, changed: bool) -> bool {
        if changed {
            self.backend.scene_replaced(&self.scene);
        }
        changed
    }

    // ─── Serialization ───────────────────────────────────────────────────

    /// The scene as an opaque versioned text blob (guides excluded).
    pub fn serialize(&self) -> String {
        serialize_scene(&self.scene)
    }

    /// Restore a full node set from a payload, replacing current contents.
    ///
    /// The payload is parsed and validated completely before the swap, so
    /// on any failure the surface keeps its prior valid scene.
    pub fn deserialize(&mut self, payload: &str) -> Result<(), MalformedSceneError> {
        let scene = deserialize_scene(payload)?;
        log::debug!("scene {:?} restored with {} nodes", scene.id, scene.len());
        self.scene = scene;
        self.backend.scene_replaced(&self.scene);
        Ok(())
    }

    /// Rasterize the scene through the engine. The longest scene edge is
    /// mapped to `max_dimension`.
    pub fn render_to_image(&mut self, max_dimension: u32) -> Vec<u8> {
        self.backend.render_to_image(&self.scene, max_dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullBackend;
    use maq_core::model::{Axis, ShapeKind};
    use pretty_assertions::assert_eq;

    /// Records which notifications reached the engine.
    #[derive(Default)]
    struct RecordingBackend {
        events: Vec<String>,
    }

    impl RenderBackend for RecordingBackend {
        fn surface_created(&mut self, _scene: &Scene, _defaults: &StyleDefaults) {
            self.events.push("created".into());
        }

        fn node_added(&mut self, node: &Node) {
            self.events.push(format!("added {}", node.id));
        }

        fn node_removed(&mut self, id: NodeId) {
            self.events.push(format!("removed {id}"));
        }

        fn node_updated(&mut self, node: &Node) {
            self.events.push(format!("updated {}", node.id));
        }

        fn scene_replaced(&mut self, _scene: &Scene) {
            self.events.push("replaced".into());
        }

        fn render_to_image(&mut self, _scene: &Scene, max_dimension: u32) -> Vec<u8> {
            self.events.push(format!("render {max_dimension}"));
            vec![0xC0, 0xFF, 0xEE]
        }
    }

    fn surface() -> Surface<RecordingBackend> {
        Surface::new(
            "page-1",
            700.0,
            900.0,
            StyleDefaults::default(),
            RecordingBackend::default(),
        )
    }

    #[test]
    fn mutations_notify_the_engine() {
        let mut s = surface();
        let id = s.add_node(Node::image("a.jpg").with_frame(0.0, 0.0, 100.0, 100.0));
        s.update_node(id, &NodePatch::new().at(50.0, 60.0));
        s.remove_node(id);

        assert_eq!(
            s.backend.events,
            vec![
                "created".to_string(),
                format!("added {id}"),
                format!("updated {id}"),
                format!("removed {id}"),
            ]
        );
    }

    #[test]
    fn patch_moves_and_resizes() {
        let mut s = surface();
        let id = s.add_node(Node::image("a.jpg").with_frame(0.0, 0.0, 100.0, 100.0));
        assert!(s.update_node(id, &NodePatch::new().at(30.0, 40.0).sized(200.0, 150.0)));

        let bounds = s.scene().bounds_of(id).unwrap();
        assert_eq!((bounds.x, bounds.y), (30.0, 40.0));
        assert_eq!((bounds.width, bounds.height), (200.0, 150.0));
    }

    #[test]
    fn patch_clamps_opacity() {
        let mut s = surface();
        let id = s.add_node(Node::image("a.jpg"));
        s.update_node(id, &NodePatch::new().opacity(2.5));
        assert_eq!(s.scene().node(id).unwrap().opacity, 1.0);
    }

    #[test]
    fn kind_specific_patch_fields_ignored_on_mismatch() {
        let mut s = surface();
        let id = s.add_node(Node::image("a.jpg"));
        let patch = NodePatch {
            content: Some("unused".into()),
            fill: Some(Color::BLACK),
            ..NodePatch::default()
        };
        assert!(s.update_node(id, &patch));
        match &s.scene().node(id).unwrap().kind {
            NodeKind::Image { source, .. } => assert_eq!(source, "a.jpg"),
            _ => panic!("expected Image"),
        }
    }

    #[test]
    fn unknown_node_update_returns_false() {
        let mut s = surface();
        assert!(!s.update_node(NodeId::intern("ghost"), &NodePatch::new()));
    }

    #[test]
    fn deserialize_failure_keeps_prior_scene() {
        let mut s = surface();
        s.add_node(Node::image("a.jpg").with_frame(0.0, 0.0, 100.0, 100.0));
        let before = s.serialize();

        assert!(s.deserialize("{\"version\":1,").is_err());
        assert_eq!(s.serialize(), before);
    }

    #[test]
    fn deserialize_replaces_full_node_set() {
        let mut s = surface();
        s.add_node(Node::image("old.jpg"));
        let snapshot = s.serialize();

        s.add_node(Node::image("newer.jpg"));
        assert_eq!(s.scene().len(), 2);

        s.deserialize(&snapshot).unwrap();
        assert_eq!(s.scene().len(), 1);
        assert!(s.backend.events.contains(&"replaced".to_string()));
    }

    #[test]
    fn serialize_excludes_live_guides() {
        let mut s = surface();
        s.add_node(Node::image("a.jpg"));
        s.add_node(Node::guide(Axis::X, 350.0, 900.0));

        let restored = maq_core::deserialize_scene(&s.serialize()).unwrap();
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn render_delegates_to_engine() {
        let mut s = surface();
        let bytes = s.render_to_image(480);
        assert_eq!(bytes, vec![0xC0, 0xFF, 0xEE]);
        assert!(s.backend.events.contains(&"render 480".to_string()));
    }

    #[test]
    fn z_order_passthrough_notifies_once_per_change() {
        let mut s = surface();
        let a = s.add_node(
            Node::shape(ShapeKind::Ellipse, &StyleDefaults::default())
                .with_frame(0.0, 0.0, 10.0, 10.0),
        );
        let _b = s.add_node(Node::image("b.jpg"));

        assert!(s.bring_to_front(a));
        // Already frontmost: no change, no notification.
        let events_before = s.backend.events.len();
        assert!(!s.bring_to_front(a));
        assert_eq!(s.backend.events.len(), events_before);
    }

    #[test]
    fn null_backend_renders_nothing() {
        let mut s = Surface::new(
            "p",
            100.0,
            100.0,
            StyleDefaults::default(),
            NullBackend,
        );
        assert!(s.render_to_image(256).is_empty());
    }
}
