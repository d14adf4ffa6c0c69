pub mod color;
pub mod geometry;

pub use color::Color;
pub use geometry::{
    BoundingBox, DEFAULT_MODEL_LABEL, MANUAL_LABEL, NORM_MAX, NormPoint, PercentRect, clamp,
    normalize,
};

// Re-export kurbo's rectangle so downstream crates don't need a direct dependency
pub use kurbo::Rect;
