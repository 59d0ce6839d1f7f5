//! Geometric snapping engine.
//!
//! Runs once per pointer-move tick while a node is being dragged. Given
//! the moving node's candidate bounds, the canvas bounds, and the sibling
//! bounds, it corrects the candidate position when an alignment line falls
//! within the snap threshold, and reports the lines so the caller can draw
//! transient guides.
//!
//! Priority per axis, first hit wins:
//! 1. candidate center vs canvas center
//! 2. candidate edges vs canvas edges (leading edge, then trailing)
//! 3. per sibling in z-order: candidate line vs sibling line, the full
//!    left/center/right (or top/center/bottom) pairing, candidate line
//!    in the outer loop
//!
//! The two axes resolve independently, so an X snap against a sibling can
//! combine with a Y snap against the canvas center. The engine is
//! advisory: it corrects a pending position before commit and never
//! rewrites committed state.

use maq_core::model::{Axis, Bounds};
use smallvec::SmallVec;

/// Default snap threshold in canvas units.
pub const DEFAULT_SNAP_THRESHOLD: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapConfig {
    pub threshold: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

/// An alignment line that justified an applied snap.
/// `Axis::X` is a vertical line at `at`; `Axis::Y` a horizontal one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapLine {
    pub axis: Axis,
    pub at: f32,
}

/// Corrected bounds plus the lines behind each applied snap (at most one
/// per axis).
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOutcome {
    pub bounds: Bounds,
    pub lines: SmallVec<[SnapLine; 2]>,
}

impl SnapOutcome {
    pub fn snapped(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// The three alignment lines of a rectangle on one axis:
/// leading edge, center, trailing edge.
fn alignment_lines(bounds: &Bounds, axis: Axis) -> [f32; 3] {
    match axis {
        Axis::X => [bounds.left(), bounds.center_x(), bounds.right()],
        Axis::Y => [bounds.top(), bounds.center_y(), bounds.bottom()],
    }
}

/// Resolve one axis. Returns the position delta to apply and the line
/// that justified it.
fn snap_axis(
    candidate: &Bounds,
    canvas: &Bounds,
    siblings: &[Bounds],
    axis: Axis,
    threshold: f32,
) -> Option<(f32, f32)> {
    let cand = alignment_lines(candidate, axis);
    let canvas_lines = alignment_lines(canvas, axis);

    // (1) canvas center
    let delta = canvas_lines[1] - cand[1];
    if delta.abs() <= threshold {
        return Some((delta, canvas_lines[1]));
    }

    // (2) canvas edges
    let delta = canvas_lines[0] - cand[0];
    if delta.abs() <= threshold {
        return Some((delta, canvas_lines[0]));
    }
    let delta = canvas_lines[2] - cand[2];
    if delta.abs() <= threshold {
        return Some((delta, canvas_lines[2]));
    }

    // (3) sibling lines, z-order
    for sibling in siblings {
        let sib = alignment_lines(sibling, axis);
        for cand_line in cand {
            for sib_line in sib {
                let delta = sib_line - cand_line;
                if delta.abs() <= threshold {
                    return Some((delta, sib_line));
                }
            }
        }
    }

    None
}

/// Correct a candidate position against the canvas and sibling bounds.
pub fn snap_bounds(
    candidate: Bounds,
    canvas: Bounds,
    siblings: &[Bounds],
    config: SnapConfig,
) -> SnapOutcome {
    let mut outcome = SnapOutcome {
        bounds: candidate,
        lines: SmallVec::new(),
    };

    if let Some((dx, line)) = snap_axis(&candidate, &canvas, siblings, Axis::X, config.threshold) {
        outcome.bounds.x += dx;
        outcome.lines.push(SnapLine {
            axis: Axis::X,
            at: line,
        });
    }
    if let Some((dy, line)) = snap_axis(&candidate, &canvas, siblings, Axis::Y, config.threshold) {
        outcome.bounds.y += dy;
        outcome.lines.push(SnapLine {
            axis: Axis::Y,
            at: line,
        });
    }

    outcome
}
