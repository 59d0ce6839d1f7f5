pub mod codec;
pub mod error;
pub mod filter;
pub mod id;
pub mod model;

pub use codec::{SCENE_FORMAT_VERSION, deserialize_scene, serialize_scene};
pub use error::MalformedSceneError;
pub use filter::{Adjustments, EffectChain, EffectOp, Preset, apply_adjustments, apply_preset};
pub use id::NodeId;
pub use model::*;
