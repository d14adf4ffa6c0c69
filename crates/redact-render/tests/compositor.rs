//! Integration tests: compositing and PNG export (redact-render).
//!
//! Builds small synthetic screenshots, burns redactions into them and
//! checks the exported raster pixel by pixel.

use image::{ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use redact_core::{BoundingBox, normalize};
use redact_render::{CompositeOptions, SourceImage, export_png, render};

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Every pixel distinct, so a stray overwrite can't hide.
fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 251) as u8, 255])
    })
}

fn encode(img: &RgbaImage) -> Vec<u8> {
    export_png(img).unwrap()
}

fn in_any_rect(boxes: &[BoundingBox], w: u32, h: u32, x: u32, y: u32) -> bool {
    boxes.iter().any(|b| {
        let r = b.to_pixel_rect(w, h);
        let (px, py) = (f64::from(x), f64::from(y));
        px + 1.0 > r.x0 && px < r.x1 && py + 1.0 > r.y0 && py < r.y1
    })
}

// ─── Shape of the surface ───────────────────────────────────────────────

#[test]
fn surface_matches_native_resolution() {
    let src = gradient(1179, 64);
    let out = render(&src, &[normalize(0.0, 0.0, 10.0, 10.0)], &CompositeOptions::default());
    assert_eq!(out.dimensions(), (1179, 64));
}

#[test]
fn no_boxes_is_identity() {
    let src = gradient(40, 30);
    let out = render(&src, &[], &CompositeOptions::default());
    assert_eq!(out, src);
}

#[test]
fn full_box_blacks_out_everything() {
    let src = gradient(33, 17);
    let out = render(&src, &[BoundingBox::full()], &CompositeOptions::default());
    assert!(out.pixels().all(|p| *p == BLACK));
}

// ─── Scenario E ─────────────────────────────────────────────────────────

#[test]
fn export_with_two_boxes_redacts_exactly_those_regions() {
    let (w, h) = (200, 120);
    let src = gradient(w, h);
    let boxes = vec![
        normalize(300.0, 100.0, 700.0, 180.0).with_label("balance"),
        normalize(505.0, 403.0, 652.0, 457.0).with_label("transfer"),
    ];

    let png = export_png(&render(&src, &boxes, &CompositeOptions::default())).unwrap();
    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
        .unwrap()
        .to_rgba8();

    assert_eq!(decoded.dimensions(), (w, h));
    for (x, y, px) in decoded.enumerate_pixels() {
        if in_any_rect(&boxes, w, h, x, y) {
            assert_eq!(*px, BLACK, "pixel ({x}, {y}) inside a box was not redacted");
        } else {
            assert_eq!(px, src.get_pixel(x, y), "pixel ({x}, {y}) outside boxes changed");
        }
    }
}

#[test]
fn box_interior_matches_pixel_rect() {
    let src = gradient(100, 100);
    let b = normalize(300.0, 100.0, 700.0, 180.0);
    let out = render(&src, std::slice::from_ref(&b), &CompositeOptions::default());

    // 30..70 × 10..18 exactly, no fractional edges at this size.
    for y in 0..100 {
        for x in 0..100 {
            let inside = (30..70).contains(&x) && (10..18).contains(&y);
            let expected = if inside { &BLACK } else { src.get_pixel(x, y) };
            assert_eq!(out.get_pixel(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

// ─── Idempotence ────────────────────────────────────────────────────────

#[test]
fn rendering_twice_is_pixel_identical() {
    let src = gradient(91, 47);
    let boxes = vec![
        normalize(120.0, 80.0, 333.0, 410.0),
        normalize(900.0, 900.0, 450.0, 610.0),
    ];
    let options = CompositeOptions::default();

    let first = render(&src, &boxes, &options);
    let second = render(&src, &boxes, &options);
    assert_eq!(first, second);
    assert_eq!(encode(&first), encode(&second));
}

// ─── Decode ─────────────────────────────────────────────────────────────

#[test]
fn source_image_decodes_png() {
    let src = gradient(12, 9);
    let source = SourceImage::decode(encode(&src)).unwrap();
    assert_eq!((source.width(), source.height()), (12, 9));
    assert_eq!(source.mime_type(), "image/png");
    assert_eq!(source.pixels(), &src);
}

#[test]
fn source_image_rejects_garbage() {
    assert!(SourceImage::decode(b"definitely not an image".to_vec()).is_err());
}
