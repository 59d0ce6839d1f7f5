pub mod drag;
pub mod history;
pub mod snap;

pub use drag::DragSession;
pub use history::{DEFAULT_HISTORY_CAPACITY, History, Snapshot};
pub use snap::{DEFAULT_SNAP_THRESHOLD, SnapConfig, SnapLine, SnapOutcome, snap_bounds};
