//! Scene serialization codec.
//!
//! Produces the opaque versioned text blob that history snapshots and the
//! template gateway store whole; nothing outside this module and the
//! surface adapter interprets its structure. Transient guide nodes are
//! excluded on write and rejected on read: they never persist.

use crate::error::MalformedSceneError;
use crate::model::{Color, Node, Scene};
use serde::{Deserialize, Serialize};

/// Version tag embedded in every serialized scene.
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// The on-wire envelope. Field order is stable so identical scenes
/// serialize identically (history compares snapshots as strings).
#[derive(Serialize, Deserialize)]
struct SceneDoc {
    version: u32,
    id: String,
    width: f32,
    height: f32,
    background: Color,
    nodes: Vec<Node>,
}

/// Serialize a scene to its persisted text form. Guides are dropped.
pub fn serialize_scene(scene: &Scene) -> String {
    let doc = SceneDoc {
        version: SCENE_FORMAT_VERSION,
        id: scene.id.clone(),
        width: scene.width,
        height: scene.height,
        background: scene.background,
        nodes: scene
            .nodes()
            .iter()
            .filter(|n| !n.is_guide())
            .cloned()
            .collect(),
    };
    serde_json::to_string(&doc).expect("scene doc has no unserializable values")
}

/// Restore a scene from its persisted text form.
///
/// Fails with `MalformedSceneError` when the payload cannot be parsed,
/// names an unsupported node variant, was written by an unknown format
/// version, or violates scene invariants. Callers swap scenes only on
/// success, so a failed restore leaves prior state untouched.
pub fn deserialize_scene(payload: &str) -> Result<Scene, MalformedSceneError> {
    let doc: SceneDoc = serde_json::from_str(payload)
        .map_err(|e| MalformedSceneError::Parse(e.to_string()))?;
    if doc.version != SCENE_FORMAT_VERSION {
        return Err(MalformedSceneError::Version(doc.version));
    }
    Scene::from_parts(doc.id, doc.width, doc.height, doc.background, doc.nodes)
        .map_err(MalformedSceneError::Invalid)
}
