use std::sync::Arc;

use crate::foundation::core::{PixelRect, PixelSize};
use crate::foundation::error::{ImageError, ImageResult};

/// Decoded raster in row-major straight-alpha RGBA8.
///
/// The pixel buffer is immutable and shared on clone. Every derived buffer (crop, key, resample)
/// is an explicit copy built through [`RasterImage::from_rgba8`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    size: PixelSize,
    rgba8: Arc<[u8]>,
}

impl RasterImage {
    /// Wrap an owned RGBA8 buffer, checking that it matches `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> ImageResult<Self> {
        let size = PixelSize::new(width, height)?;
        let expected = size
            .area()
            .checked_mul(4)
            .ok_or_else(|| ImageError::render("raster buffer size overflow"))?;
        if rgba8.len() != expected {
            return Err(ImageError::render(format!(
                "raster buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            size,
            rgba8: rgba8.into(),
        })
    }

    /// Uniformly filled image.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ImageResult<Self> {
        let size = PixelSize::new(width, height)?;
        let buf = rgba.repeat(size.area());
        Self::from_rgba8(width, height, buf)
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn pixel_count(&self) -> usize {
        self.size.area()
    }

    /// Raw bytes, four per pixel.
    pub fn as_rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    /// Pixel at linear index `i` (row-major).
    pub fn pixel(&self, i: usize) -> Option<[u8; 4]> {
        let px = self.rgba8.get(i * 4..i * 4 + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixel(y as usize * self.size.width as usize + x as usize)
    }

    /// Count of pixels whose alpha is zero.
    pub fn transparent_count(&self) -> usize {
        self.rgba8.chunks_exact(4).filter(|px| px[3] == 0).count()
    }

    /// Copy out the sub-rectangle `rect`.
    pub fn crop(&self, rect: PixelRect) -> ImageResult<Self> {
        let x_end = rect.x.checked_add(rect.width);
        let y_end = rect.y.checked_add(rect.height);
        match (x_end, y_end) {
            (Some(xe), Some(ye)) if xe <= self.size.width && ye <= self.size.height => {}
            _ => return Err(ImageError::render("crop rectangle outside image bounds")),
        }

        let src_stride = self.size.width as usize * 4;
        let row_len = rect.width as usize * 4;
        let mut out = Vec::with_capacity(row_len * rect.height as usize);
        for row in rect.y..rect.y + rect.height {
            let start = row as usize * src_stride + rect.x as usize * 4;
            out.extend_from_slice(&self.rgba8[start..start + row_len]);
        }
        Self::from_rgba8(rect.width, rect.height, out)
    }

    pub(crate) fn from_rgba_image(img: image::RgbaImage) -> ImageResult<Self> {
        let (w, h) = img.dimensions();
        Self::from_rgba8(w, h, img.into_raw())
    }

    pub(crate) fn to_rgba_image(&self) -> ImageResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.size.width, self.size.height, self.rgba8.to_vec())
            .ok_or_else(|| ImageError::render("raster buffer does not match its dimensions"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
