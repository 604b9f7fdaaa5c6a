use crate::foundation::error::{ImageError, ImageResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Integer pixel dimensions (both > 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> ImageResult<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::render("pixel size must be at least 1x1"));
        }
        Ok(Self { width, height })
    }

    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn max_side(self) -> u32 {
        self.width.max(self.height)
    }

    pub fn center(self) -> Vec2 {
        Vec2::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// `round(self * factor)` per axis, never below 1.
    pub fn scaled(self, factor: f64) -> Self {
        fn axis(v: u32, factor: f64) -> u32 {
            let scaled = (f64::from(v) * factor).round();
            if scaled.is_finite() {
                scaled.clamp(1.0, f64::from(u32::MAX)) as u32
            } else {
                1
            }
        }

        Self {
            width: axis(self.width, factor),
            height: axis(self.height, factor),
        }
    }
}

/// Inclusive-exclusive pixel rectangle inside an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn size(self) -> PixelSize {
        PixelSize {
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
