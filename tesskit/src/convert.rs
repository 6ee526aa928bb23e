//! Conversion from host images to engine pixel buffers.
//!
//! Images are encoded to PNG in memory and handed to Leptonica, which
//! decodes them into its own raster format. This keeps the pixel layout
//! (depth, colormap, byte order) entirely on the native side.

use crate::engine::EngineApi;
use crate::error::{Result, TessError};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Whether the image has no pixels at all.
pub fn is_blank_canvas(image: &DynamicImage) -> bool {
    let (width, height) = image.dimensions();
    width == 0 || height == 0
}

/// Encode an image as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    if is_blank_canvas(image) {
        return Err(TessError::ImageConversion(format!(
            "image dimensions must be non-zero (got {}x{})",
            image.width(),
            image.height()
        )));
    }
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

/// Convert an image to an owned engine pixel buffer.
pub(crate) fn to_pix<E: EngineApi + ?Sized>(engine: &E, image: &DynamicImage) -> Result<E::Pix> {
    let png = encode_png(image)?;
    engine.read_pix(&png).ok_or_else(|| {
        TessError::ImageConversion(format!(
            "engine could not decode {}x{} image ({} bytes of PNG)",
            image.width(),
            image.height(),
            png.len()
        ))
    })
}
