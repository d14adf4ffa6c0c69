//! Canvas2D output for the composited raster.

use image::RgbaImage;
use wasm_bindgen::{Clamped, JsValue};
use web_sys::{CanvasRenderingContext2d, ImageData};

/// Blit `surface` onto the context's canvas at native resolution.
///
/// The backing canvas is resized to the image; CSS scales it for display,
/// so the overlay's percent placement lines up with the pixels.
pub fn draw(ctx: &CanvasRenderingContext2d, surface: &RgbaImage) -> Result<(), JsValue> {
    let (width, height) = surface.dimensions();
    if let Some(canvas) = ctx.canvas()
        && (canvas.width() != width || canvas.height() != height)
    {
        canvas.set_width(width);
        canvas.set_height(height);
    }
    let pixels = Clamped(surface.as_raw().as_slice());
    let data = ImageData::new_with_u8_clamped_array_and_sh(pixels, width, height)?;
    ctx.put_image_data(&data, 0.0, 0.0)
}
