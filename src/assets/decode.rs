use std::path::Path;

use anyhow::Context;

use crate::config::CompositorConfig;
use crate::foundation::core::PixelSize;
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::RasterImage;
use crate::raster::rendered::RenderedImage;

/// A user-picked file: declared MIME type plus raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, deriving the MIME type from its extension.
    pub fn from_path(path: &Path) -> ImageResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let mime = image::ImageFormat::from_path(path)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime, bytes))
    }

    pub fn len_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Reject non-image MIME types and files above `max_bytes`.
pub fn validate_image_file(file: &ImageFile, max_bytes: u64) -> ImageResult<()> {
    if !file.mime.starts_with("image/") {
        return Err(ImageError::invalid_or_too_large(format!(
            "'{}' is not an image (type '{}')",
            file.name, file.mime
        )));
    }
    if file.len_bytes() > max_bytes {
        return Err(ImageError::invalid_or_too_large(format!(
            "'{}' is {} bytes, limit is {max_bytes}",
            file.name,
            file.len_bytes()
        )));
    }
    Ok(())
}

pub fn decode_image(bytes: &[u8]) -> ImageResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| ImageError::decode(e.to_string()))?;
    RasterImage::from_rgba_image(dyn_img.to_rgba8())
        .map_err(|_| ImageError::decode("decoded image has zero size"))
}

/// Target size so that neither side exceeds `max_dim`, aspect preserved, never upscaled.
pub fn fit_within(size: PixelSize, max_dim: u32) -> PixelSize {
    let ratio = (f64::from(max_dim) / f64::from(size.max_side())).min(1.0);
    if ratio >= 1.0 {
        return size;
    }
    size.scaled(ratio)
}

pub fn downscale_to_fit(img: &RasterImage, max_dim: u32) -> ImageResult<RasterImage> {
    let target = fit_within(img.size(), max_dim);
    if target == img.size() {
        return Ok(img.clone());
    }
    let resized = image::imageops::resize(
        &img.to_rgba_image()?,
        target.width,
        target.height,
        image::imageops::FilterType::Triangle,
    );
    RasterImage::from_rgba_image(resized)
}

/// Decoded design ready to be committed to a session.
#[derive(Clone, Debug)]
pub struct PreparedDesign {
    /// Downscaled working buffer every keying pass starts from.
    pub original: RasterImage,
    /// Encoding of `original`, shown until the background is removed.
    pub rendered: RenderedImage,
}

/// Validate and decode a body photo. Pure; safe to run off the session's thread.
pub fn prepare_body(file: &ImageFile, cfg: &CompositorConfig) -> ImageResult<RasterImage> {
    validate_image_file(file, cfg.max_file_bytes)?;
    let img = decode_image(&file.bytes)?;
    tracing::debug!(
        name = %file.name,
        width = img.width(),
        height = img.height(),
        "decoded body photo"
    );
    Ok(img)
}

/// Validate, decode and downscale a design. Pure; safe to run off the session's thread.
pub fn prepare_design(file: &ImageFile, cfg: &CompositorConfig) -> ImageResult<PreparedDesign> {
    validate_image_file(file, cfg.max_file_bytes)?;
    let decoded = decode_image(&file.bytes)?;
    let original = downscale_to_fit(&decoded, cfg.max_design_dim)?;
    let rendered = RenderedImage::encode(&original)?;
    tracing::debug!(
        name = %file.name,
        src_width = decoded.width(),
        src_height = decoded.height(),
        width = original.width(),
        height = original.height(),
        "decoded design"
    );
    Ok(PreparedDesign { original, rendered })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
