//! Snapshot-based undo/redo over full-scene serializations.
//!
//! History owns two bounded stacks of opaque snapshots. Every committed
//! user gesture captures one snapshot; undo/redo restore whole scenes
//! through the surface adapter. The central invariant: a restore must be
//! indistinguishable, from history's perspective, from "no user action
//! occurred". Captures requested while a restore is in flight are
//! swallowed so the restore cannot pollute its own history.

use maq_surface::{RenderBackend, Surface};

/// Default number of retained captures.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// An immutable serialized capture of an entire scene at one instant.
/// Owned exclusively by `History`; scenes never reference their own
/// snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Capture-state machine: `save_state` runs only from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Idle,
    Restoring,
}

/// Bounded undo/redo stacks for one editor session.
///
/// Created together with the page's surface (capturing an initial
/// snapshot immediately); dropped when the session ends.
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    capacity: usize,
    state: CaptureState,
}

impl History {
    pub fn new<B: RenderBackend>(surface: &Surface<B>) -> Self {
        Self::with_capacity(surface, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity<B: RenderBackend>(surface: &Surface<B>, capacity: usize) -> Self {
        assert!(capacity >= 1, "history capacity must be at least 1");
        Self {
            undo: vec![Snapshot(surface.serialize())],
            redo: Vec::new(),
            capacity,
            state: CaptureState::Idle,
        }
    }

    /// Capture the current scene onto the undo stack, evicting the oldest
    /// entry past capacity and clearing the redo stack.
    ///
    /// No-op (returning false) while an undo/redo restore is in flight.
    pub fn save_state<B: RenderBackend>(&mut self, surface: &Surface<B>) -> bool {
        if self.state == CaptureState::Restoring {
            return false;
        }
        self.push_undo(Snapshot(surface.serialize()));
        self.redo.clear();
        true
    }

    /// Step back one capture. Returns false (scene untouched) when only
    /// the floor entry remains.
    pub fn undo<B: RenderBackend>(&mut self, surface: &mut Surface<B>) -> bool {
        if self.undo.len() < 2 {
            return false;
        }
        let Some(current) = self.undo.pop() else {
            return false;
        };
        let Some(target) = self.undo.last().cloned() else {
            self.undo.push(current);
            return false;
        };

        self.state = CaptureState::Restoring;
        let restored = surface.deserialize(target.as_str());
        self.state = CaptureState::Idle;

        match restored {
            Ok(()) => {
                self.redo.push(current);
                true
            }
            Err(e) => {
                // Snapshots come from our own serializer; treat failure as
                // corrupt history and leave the stacks as they were.
                log::warn!("undo restore failed, keeping current state: {e}");
                self.undo.push(current);
                false
            }
        }
    }

    /// Step forward one capture. Returns false when nothing was undone.
    pub fn redo<B: RenderBackend>(&mut self, surface: &mut Surface<B>) -> bool {
        let Some(target) = self.redo.pop() else {
            return false;
        };

        self.state = CaptureState::Restoring;
        let restored = surface.deserialize(target.as_str());
        self.state = CaptureState::Idle;

        match restored {
            Ok(()) => {
                self.push_undo(target);
                true
            }
            Err(e) => {
                log::warn!("redo restore failed, keeping current state: {e}");
                self.redo.push(target);
                false
            }
        }
    }

    /// Discard both stacks and recapture the current state as the sole
    /// undo entry. Used when switching pages.
    pub fn clear<B: RenderBackend>(&mut self, surface: &Surface<B>) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push(Snapshot(surface.serialize()));
        self.state = CaptureState::Idle;
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of retained undo captures (including the floor entry).
    pub fn depth(&self) -> usize {
        self.undo.len()
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo.push(snapshot);
        if self.undo.len() > self.capacity {
            log::debug!("history at capacity {}, evicting oldest capture", self.capacity);
            self.undo.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maq_core::model::{Node, StyleDefaults};
    use maq_surface::NullBackend;

    fn surface() -> Surface<NullBackend> {
        Surface::new("page", 700.0, 900.0, StyleDefaults::default(), NullBackend)
    }

    #[test]
    fn initial_capture_is_the_floor() {
        let s = surface();
        let h = History::new(&s);
        assert_eq!(h.depth(), 1);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn captures_while_restoring_are_swallowed() {
        let s = surface();
        let mut h = History::new(&s);

        h.state = CaptureState::Restoring;
        assert!(!h.save_state(&s));
        assert_eq!(h.depth(), 1);

        h.state = CaptureState::Idle;
        assert!(h.save_state(&s));
        assert_eq!(h.depth(), 2);
    }

    #[test]
    fn undo_at_floor_is_a_silent_no_op() {
        let mut s = surface();
        s.add_node(Node::image("a.jpg"));
        let mut h = History::new(&s);

        let before = s.serialize();
        assert!(!h.undo(&mut s));
        assert_eq!(s.serialize(), before);
    }

    #[test]
    fn restore_state_resets_after_undo() {
        let mut s = surface();
        let mut h = History::new(&s);
        s.add_node(Node::image("a.jpg"));
        h.save_state(&s);

        assert!(h.undo(&mut s));
        assert_eq!(h.state, CaptureState::Idle);
        // A fresh capture works again after the restore finished.
        assert!(h.save_state(&s));
    }

    #[test]
    fn clear_recaptures_sole_entry() {
        let mut s = surface();
        let mut h = History::new(&s);
        s.add_node(Node::image("a.jpg"));
        h.save_state(&s);
        h.undo(&mut s);
        assert!(h.can_redo());

        h.clear(&s);
        assert_eq!(h.depth(), 1);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }
}
