//! Hit testing: normalized point → box index.
//!
//! Boxes are painted in order, so the last one containing the point is
//! the one on top.

use redact_core::{BoundingBox, NormPoint};

/// Index of the topmost box under `p`, or `None` for background.
pub fn hit_test(boxes: &[BoundingBox], p: NormPoint) -> Option<usize> {
    boxes.iter().rposition(|b| b.contains(p))
}
