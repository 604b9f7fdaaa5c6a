use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::RasterImage;

/// PNG encoding of a layer as it is currently shown.
///
/// This is what undo snapshots and the flattener hold for the design layer, so both placement
/// and keying edits are captured without keeping extra raw buffers alive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    size: PixelSize,
    png: Arc<[u8]>,
}

impl RenderedImage {
    pub fn encode(img: &RasterImage) -> ImageResult<Self> {
        let rgba = img.to_rgba_image()?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode rendered layer as png")?;
        Ok(Self {
            size: img.size(),
            png: buf.into(),
        })
    }

    /// Wrap PNG bytes that were produced elsewhere. Dimensions are read from the header only.
    pub fn from_png_bytes(bytes: impl Into<Arc<[u8]>>) -> ImageResult<Self> {
        let png: Arc<[u8]> = bytes.into();
        let (w, h) = image::ImageReader::with_format(Cursor::new(&png[..]), image::ImageFormat::Png)
            .into_dimensions()
            .map_err(|e| ImageError::decode(format!("read png header: {e}")))?;
        let size = PixelSize::new(w, h).map_err(|_| ImageError::decode("png has zero size"))?;
        Ok(Self { size, png })
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Decode back into pixels. A broken encoding surfaces as [`ImageError::RenderFailure`].
    pub fn decode(&self) -> ImageResult<RasterImage> {
        let img = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)
            .map_err(|e| ImageError::render(format!("decode rendered layer: {e}")))?;
        RasterImage::from_rgba_image(img.to_rgba8())
    }

    /// True when both values share one encoding buffer.
    pub fn same_encoding(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.png, &other.png)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rendered.rs"]
mod tests;
