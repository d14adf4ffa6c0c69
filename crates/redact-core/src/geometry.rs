//! Normalized bounding-box geometry.
//!
//! Every box lives in a resolution-independent square where `(0, 0)` is
//! the top-left corner of the image and `(1000, 1000)` the bottom-right.
//! Conversions to pixel space (for compositing) and percentage space (for
//! DOM overlays) are pure and linear.
//!
//! `BoundingBox` fields are private: the only ways to build one go through
//! [`normalize`], so `xmin <= xmax`, `ymin <= ymax` and the `[0, 1000]`
//! range hold for every value of the type.

use kurbo::Rect;
use serde::Serialize;

/// Upper bound of the normalized coordinate space on both axes.
pub const NORM_MAX: u16 = 1000;

/// Label given to boxes drawn by hand.
pub const MANUAL_LABEL: &str = "manual redaction";

/// Label given to model boxes that arrive without one.
pub const DEFAULT_MODEL_LABEL: &str = "redacted region";

/// Clip a raw coordinate into `[0, 1000]`, rounding to the nearest unit.
///
/// NaN maps to 0.
pub fn clamp(value: f64) -> u16 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(NORM_MAX)) as u16
}

/// Build a box from two corners given in any order.
///
/// All four inputs are clamped first, then each axis is sorted.
pub fn normalize(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
    let (x1, y1, x2, y2) = (clamp(x1), clamp(y1), clamp(x2), clamp(y2));
    BoundingBox {
        xmin: x1.min(x2),
        ymin: y1.min(y2),
        xmax: x1.max(x2),
        ymax: y1.max(y2),
        label: None,
    }
}

// ─── Points ──────────────────────────────────────────────────────────────

/// A pointer position in normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormPoint {
    pub x: f32,
    pub y: f32,
}

impl NormPoint {
    /// Create a point, clipping both coordinates into `[0, 1000]`.
    pub fn new(x: f32, y: f32) -> Self {
        let max = f32::from(NORM_MAX);
        Self {
            x: if x.is_nan() { 0.0 } else { x.clamp(0.0, max) },
            y: if y.is_nan() { 0.0 } else { y.clamp(0.0, max) },
        }
    }

    /// Map a position inside a display surface of `width × height` CSS
    /// pixels into normalized space.
    ///
    /// The displayed size is unrelated to the image's native resolution.
    /// Returns `None` for a degenerate surface.
    pub fn from_display(x: f32, y: f32, width: f32, height: f32) -> Option<Self> {
        if !(width > 0.0 && height > 0.0) {
            log::debug!("pointer ignored on {width}x{height} display surface");
            return None;
        }
        let max = f32::from(NORM_MAX);
        Some(Self::new(x * max / width, y * max / height))
    }
}

// ─── Boxes ───────────────────────────────────────────────────────────────

/// An axis-aligned region to redact, in normalized coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BoundingBox {
    xmin: u16,
    ymin: u16,
    xmax: u16,
    ymax: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

/// Overlay placement in percent of the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Box spanning two normalized points, in any order.
    pub fn from_points(a: NormPoint, b: NormPoint) -> Self {
        normalize(f64::from(a.x), f64::from(a.y), f64::from(b.x), f64::from(b.y))
    }

    /// The whole image.
    pub fn full() -> Self {
        normalize(0.0, 0.0, f64::from(NORM_MAX), f64::from(NORM_MAX))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn xmin(&self) -> u16 {
        self.xmin
    }

    pub fn ymin(&self) -> u16 {
        self.ymin
    }

    pub fn xmax(&self) -> u16 {
        self.xmax
    }

    pub fn ymax(&self) -> u16 {
        self.ymax
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn width(&self) -> u16 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> u16 {
        self.ymax - self.ymin
    }

    /// Inclusive containment test in normalized space.
    pub fn contains(&self, p: NormPoint) -> bool {
        p.x >= f32::from(self.xmin)
            && p.x <= f32::from(self.xmax)
            && p.y >= f32::from(self.ymin)
            && p.y <= f32::from(self.ymax)
    }

    /// Scale into the pixel space of an image of `width × height`.
    ///
    /// Each coordinate is multiplied by `dimension / 1000`; the result is
    /// not rounded. `x0, y0` is the origin, `width()`/`height()` the size.
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> Rect {
        let sx = |v: u16| f64::from(v) * f64::from(width) / f64::from(NORM_MAX);
        let sy = |v: u16| f64::from(v) * f64::from(height) / f64::from(NORM_MAX);
        Rect::new(sx(self.xmin), sy(self.ymin), sx(self.xmax), sy(self.ymax))
    }

    /// Percentages for overlay positioning, independent of pixel size.
    pub fn to_percent_rect(&self) -> PercentRect {
        let pct = |v: u16| f64::from(v) * 100.0 / f64::from(NORM_MAX);
        PercentRect {
            top: pct(self.ymin),
            left: pct(self.xmin),
            width: pct(self.width()),
            height: pct(self.height()),
        }
    }
}
