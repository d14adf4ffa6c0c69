//! Source image + active boxes → redacted raster.
//!
//! The surface is always the image's native resolution. Each redaction
//! overwrites pixels outright (no blending), so nothing under a box
//! survives into the exported PNG.

use chrono::{DateTime, Utc};
use image::{ImageError, ImageFormat, Rgba, RgbaImage};
use redact_core::{BoundingBox, Color, Rect};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("could not encode PNG: {0}")]
    Encode(#[source] ImageError),
}

/// Compositing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeOptions {
    pub fill: Color,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self { fill: Color::BLACK }
    }
}

// ─── Source image ────────────────────────────────────────────────────────

/// An uploaded image: the encoded bytes as received plus the decoded raster.
///
/// Fixed for the lifetime of a session.
#[derive(Clone)]
pub struct SourceImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    pixels: RgbaImage,
}

impl SourceImage {
    /// Sniff the container format and decode to RGBA.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, RenderError> {
        let format = image::guess_format(&bytes).map_err(RenderError::Decode)?;
        let pixels = image::load_from_memory_with_format(&bytes, format)
            .map_err(RenderError::Decode)?
            .to_rgba8();
        log::debug!(
            "decoded {:?} source image {}x{}",
            format,
            pixels.width(),
            pixels.height()
        );
        Ok(Self {
            bytes,
            format,
            pixels,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("format", &self.format)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────

/// Draw `source` at the origin, then every box in order.
///
/// Full redraw on each call: the source is never mutated, so calling this
/// twice with the same inputs yields identical pixels.
pub fn render(source: &RgbaImage, boxes: &[BoundingBox], options: &CompositeOptions) -> RgbaImage {
    let mut surface = source.clone();
    paint_redactions(&mut surface, boxes, options.fill);
    surface
}

/// Fill every box onto `surface`, in place.
pub fn paint_redactions(surface: &mut RgbaImage, boxes: &[BoundingBox], fill: Color) {
    let (w, h) = surface.dimensions();
    let color = Rgba(fill.to_array());
    for b in boxes {
        let rect = b.to_pixel_rect(w, h);
        log::trace!(
            "REDACT {:?} ({:.1}, {:.1}) {:.1}x{:.1}",
            b.label(),
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height()
        );
        if let Some(span) = pixel_span(rect, w, h) {
            fill_span(surface, span, color);
        }
    }
}

/// Half-open pixel ranges `(x0..x1, y0..y1)` touched by `rect`.
///
/// A pixel is covered when its unit square overlaps the rectangle, so
/// fractional edges round outward. Empty rectangles cover nothing.
fn pixel_span(rect: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let lo = |v: f64, max: u32| v.floor().clamp(0.0, f64::from(max)) as u32;
    let hi = |v: f64, max: u32| v.ceil().clamp(0.0, f64::from(max)) as u32;
    let (x0, x1) = (lo(rect.x0, width), hi(rect.x1, width));
    let (y0, y1) = (lo(rect.y0, height), hi(rect.y1, height));
    (x0 < x1 && y0 < y1).then_some((x0, x1, y0, y1))
}

fn fill_span(img: &mut RgbaImage, (x0, x1, y0, y1): (u32, u32, u32, u32), color: Rgba<u8>) {
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

// ─── Export ──────────────────────────────────────────────────────────────

/// Encode the full-resolution surface as PNG.
pub fn export_png(surface: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    surface
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(buf.into_inner())
}

/// Download name for an export made at `at`: `redacted_<unix millis>.png`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("redacted_{}.png", at.timestamp_millis())
}
