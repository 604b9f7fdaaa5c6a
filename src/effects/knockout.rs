//! Near-white background removal.
//!
//! A pixel is keyed out when all three colour channels exceed `255 - threshold`; its alpha is
//! set to zero and every other channel is kept. The keyed buffer is then cropped to the tight
//! bounding box of the pixels that stayed visible.

use crate::foundation::core::PixelRect;
use crate::foundation::error::ImageResult;
use crate::raster::buffer::RasterImage;

/// Result of one keying pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Knockout {
    pub image: RasterImage,
    /// Crop window in the source buffer, `None` when nothing stayed visible.
    pub bounds: Option<PixelRect>,
}

/// Copy of `original` with near-white pixels made transparent. No crop.
pub fn key_near_white(original: &RasterImage, threshold: u8) -> ImageResult<RasterImage> {
    let floor = 255 - threshold;
    let mut data = original.as_rgba8().to_vec();
    for px in data.chunks_exact_mut(4) {
        if px[0] > floor && px[1] > floor && px[2] > floor {
            px[3] = 0;
        }
    }
    RasterImage::from_rgba8(original.width(), original.height(), data)
}

/// Tight bounding box of pixels with alpha > 0.
pub fn content_bounds(img: &RasterImage) -> Option<PixelRect> {
    let w = img.width() as usize;
    let mut min_x = usize::MAX;
    let mut min_y = usize::MAX;
    let mut max_x = 0usize;
    let mut max_y = 0usize;
    let mut any = false;

    for (row_idx, row) in img.as_rgba8().chunks_exact(w * 4).enumerate() {
        let mut first = None;
        let mut last = 0usize;
        for (x, px) in row.chunks_exact(4).enumerate() {
            if px[3] > 0 {
                first.get_or_insert(x);
                last = x;
            }
        }
        let Some(first) = first else {
            continue;
        };
        any = true;
        min_x = min_x.min(first);
        max_x = max_x.max(last);
        min_y = min_y.min(row_idx);
        max_y = row_idx;
    }

    if !any {
        return None;
    }
    Some(PixelRect {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    })
}

/// Key `original` at `threshold` and crop to content.
///
/// Always derives from the buffer it is given; callers pass the untouched original so repeated
/// passes never compound.
pub fn remove_background(original: &RasterImage, threshold: u8) -> ImageResult<Knockout> {
    let keyed = key_near_white(original, threshold)?;
    let bounds = content_bounds(&keyed);
    let image = match bounds {
        Some(rect) if rect.size() != keyed.size() => keyed.crop(rect)?,
        _ => keyed,
    };
    Ok(Knockout { image, bounds })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/knockout.rs"]
mod tests;
