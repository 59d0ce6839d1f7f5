//! Drag sessions: interactive node moves with snapping and guide feedback.
//!
//! A session runs for one pointer gesture. Every move tick feeds the
//! candidate position through the snap engine, applies the corrected
//! position through the surface, and refreshes the transient guide nodes.
//! Guides are cleared on the next tick, on commit, and on cancel,
//! whichever comes first. A committed gesture captures exactly one
//! history entry.

use crate::history::History;
use crate::snap::{SnapConfig, snap_bounds};
use maq_core::id::NodeId;
use maq_core::model::{Axis, Bounds, Node};
use maq_surface::{NodePatch, RenderBackend, Surface};
use smallvec::SmallVec;

/// One in-flight drag gesture over a single node.
pub struct DragSession {
    node: NodeId,
    origin: Bounds,
    guides: SmallVec<[NodeId; 2]>,
    config: SnapConfig,
}

impl DragSession {
    /// Start dragging `id`. Refuses unknown, non-selectable, and guide
    /// nodes.
    pub fn begin<B: RenderBackend>(
        surface: &Surface<B>,
        id: NodeId,
        config: SnapConfig,
    ) -> Option<Self> {
        let node = surface.scene().node(id)?;
        if node.is_guide() || !node.selectable {
            return None;
        }
        Some(Self {
            node: id,
            origin: node.bounds(),
            guides: SmallVec::new(),
            config,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn origin(&self) -> Bounds {
        self.origin
    }

    /// One pointer-move tick: snap the candidate top-left position,
    /// apply it, and refresh guides. Returns the applied bounds.
    pub fn update<B: RenderBackend>(
        &mut self,
        surface: &mut Surface<B>,
        x: f32,
        y: f32,
    ) -> Bounds {
        let mut candidate = self.origin;
        candidate.x = x;
        candidate.y = y;

        let canvas = surface.scene().canvas_bounds();
        let siblings = surface.scene().sibling_bounds(self.node);
        let outcome = snap_bounds(candidate, canvas, &siblings, self.config);

        self.clear_guides(surface);
        surface.update_node(
            self.node,
            &NodePatch::new().at(outcome.bounds.x, outcome.bounds.y),
        );

        let (scene_w, scene_h) = (surface.scene().width, surface.scene().height);
        for line in &outcome.lines {
            let span = match line.axis {
                Axis::X => scene_h,
                Axis::Y => scene_w,
            };
            let guide_id = surface.add_node(Node::guide(line.axis, line.at, span));
            self.guides.push(guide_id);
        }

        outcome.bounds
    }

    /// Pointer released: clear guides and capture the gesture as one
    /// history entry.
    pub fn commit<B: RenderBackend>(mut self, surface: &mut Surface<B>, history: &mut History) {
        self.clear_guides(surface);
        history.save_state(surface);
    }

    /// Abort the gesture: clear guides and put the node back where the
    /// drag started. Nothing is captured.
    pub fn cancel<B: RenderBackend>(mut self, surface: &mut Surface<B>) {
        self.clear_guides(surface);
        surface.update_node(
            self.node,
            &NodePatch::new().at(self.origin.x, self.origin.y),
        );
    }

    fn clear_guides<B: RenderBackend>(&mut self, surface: &mut Surface<B>) {
        for guide_id in self.guides.drain(..) {
            surface.remove_node(guide_id);
        }
    }
}
