use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Raster;
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> LayerstackResult<Raster> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(into_premul_raster(dyn_img))
}

/// Read and decode an image file, picking the decoder from the file extension.
pub fn decode_image_file(path: &Path) -> LayerstackResult<Raster> {
    let format = image::ImageFormat::from_path(path)
        .ok()
        .filter(|f| f.reading_enabled())
        .ok_or_else(|| {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            LayerstackError::codec_unavailable(path.display().to_string(), ext)
        })?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("read layer image '{}'", path.display()))?;
    let dyn_img = image::load_from_memory_with_format(&bytes, format)
        .with_context(|| format!("decode layer image '{}'", path.display()))?;
    Ok(into_premul_raster(dyn_img))
}

fn into_premul_raster(dyn_img: image::DynamicImage) -> Raster {
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);
    Raster {
        width,
        height,
        data,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
