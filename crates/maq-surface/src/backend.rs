//! Render-backend capability trait.
//!
//! The actual rendering engine (drawing, hit-testing, pixel math) lives
//! outside this repository. The surface adapter drives it through this
//! trait: every scene mutation becomes a notification the engine turns
//! into a re-paint request. Notifications must return promptly; the
//! engine paints on its own schedule and never blocks the caller.
//!
//! Implemented differently by each host environment:
//! - browser: bridges to the canvas engine
//! - tests/headless: `NullBackend` or a recording double

use maq_core::id::NodeId;
use maq_core::model::{Node, Scene, StyleDefaults};

/// Capability surface of the external rendering engine.
pub trait RenderBackend {
    /// A surface was created for `scene` with the given style defaults.
    fn surface_created(&mut self, scene: &Scene, defaults: &StyleDefaults) {
        let _ = (scene, defaults);
    }

    /// A node was appended at the front of the paint order.
    fn node_added(&mut self, node: &Node) {
        let _ = node;
    }

    /// A node left the scene.
    fn node_removed(&mut self, id: NodeId) {
        let _ = id;
    }

    /// A node's properties changed in place.
    fn node_updated(&mut self, node: &Node) {
        let _ = node;
    }

    /// The whole scene changed: restore from a payload, background or
    /// paint-order change. The engine rebuilds its node set.
    fn scene_replaced(&mut self, scene: &Scene) {
        let _ = scene;
    }

    /// Rasterize the scene, downscaled so its longest edge maps to
    /// `max_dimension`, and return the encoded image bytes.
    fn render_to_image(&mut self, scene: &Scene, max_dimension: u32) -> Vec<u8>;
}

/// A backend that paints nothing. Used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl RenderBackend for NullBackend {
    fn render_to_image(&mut self, _scene: &Scene, _max_dimension: u32) -> Vec<u8> {
        Vec::new()
    }
}
