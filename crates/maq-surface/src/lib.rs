pub mod backend;
pub mod surface;

pub use backend::{NullBackend, RenderBackend};
pub use surface::{NodePatch, Surface};
