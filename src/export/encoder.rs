use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::Raster;
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Consumer of exported layer rasters.
///
/// Every raster passed to [`LayerEncoder::encode`] has the canvas's pixel dimensions and
/// holds premultiplied RGBA8.
pub trait LayerEncoder {
    /// Extension appended to suggested file names, without the dot.
    fn extension(&self) -> &str;

    /// Encode one raster under `file_name`.
    fn encode(&mut self, file_name: &str, raster: &Raster) -> LayerstackResult<()>;
}

/// Writes each raster as an image file inside a directory, using the `image` crate.
#[derive(Debug)]
pub struct ImageFileEncoder {
    out_dir: PathBuf,
    extension: String,
    format: image::ImageFormat,
}

impl ImageFileEncoder {
    /// Fails with [`LayerstackError::CodecUnavailable`] when no writer exists for `extension`.
    pub fn new(out_dir: impl Into<PathBuf>, extension: &str) -> LayerstackResult<Self> {
        let out_dir = out_dir.into();
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        let format = writable_format(&extension)
            .ok_or_else(|| codec_unavailable(&out_dir.join(format!("*.{extension}")), &extension))?;
        Ok(Self {
            out_dir,
            extension,
            format,
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl LayerEncoder for ImageFileEncoder {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn encode(&mut self, file_name: &str, raster: &Raster) -> LayerstackResult<()> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(file_name);
        write_image(&path, raster, self.format)
    }
}

/// Write one raster to `path`, picking the format from the path's extension.
pub fn write_raster(path: &Path, raster: &Raster) -> LayerstackResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let format = writable_format(&ext).ok_or_else(|| codec_unavailable(path, &ext))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_image(path, raster, format)
}

fn writable_format(extension: &str) -> Option<image::ImageFormat> {
    image::ImageFormat::from_extension(extension).filter(|f| f.writing_enabled())
}

fn codec_unavailable(path: &Path, format: &str) -> LayerstackError {
    LayerstackError::codec_unavailable(path.display().to_string(), format)
}

fn write_image(path: &Path, raster: &Raster, format: image::ImageFormat) -> LayerstackResult<()> {
    let mut straight = raster.data.clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let rgba = image::RgbaImage::from_raw(raster.width, raster.height, straight)
        .ok_or_else(|| LayerstackError::validation("raster length does not match dimensions"))?;
    let img = image::DynamicImage::ImageRgba8(rgba);
    let img = match format {
        image::ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };

    match img.save_with_format(path, format) {
        Ok(()) => Ok(()),
        Err(image::ImageError::Unsupported(_)) => {
            Err(codec_unavailable(path, &format!("{format:?}").to_lowercase()))
        }
        Err(image::ImageError::IoError(e)) => Err(LayerstackError::Io(e)),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("encode '{}'", path.display()))
            .into()),
    }
}

/// Keeps encoded rasters in memory, in the order they were exported.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    extension: String,
    files: Vec<(String, Raster)>,
}

impl InMemoryEncoder {
    pub fn new() -> Self {
        Self::with_extension("png")
    }

    pub fn with_extension(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            files: Vec::new(),
        }
    }

    pub fn files(&self) -> &[(String, Raster)] {
        &self.files
    }

    pub fn get(&self, file_name: &str) -> Option<&Raster> {
        self.files
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, r)| r)
    }
}

impl LayerEncoder for InMemoryEncoder {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn encode(&mut self, file_name: &str, raster: &Raster) -> LayerstackResult<()> {
        self.files.push((file_name.to_string(), raster.clone()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/encoder.rs"]
mod tests;
