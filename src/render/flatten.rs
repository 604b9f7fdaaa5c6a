use rayon::prelude::*;

use crate::effects::composite::{over_straight_dst, premultiply_rgba8_in_place};
use crate::foundation::core::{PixelSize, Point, Rect};
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::RasterImage;
use crate::transform::placement::{PlacementState, layer_to_output};

/// Largest output side, in pixels. Larger requests are scaled down to fit.
pub const MAX_OUTPUT_SIDE: u32 = 16_384;

/// Overlay drawn on top of the body during flattening.
#[derive(Clone, Copy, Debug)]
pub struct Overlay<'a> {
    pub image: &'a RasterImage,
    pub placement: &'a PlacementState,
}

/// Flatten the body (stretched to the stage) and an optional overlay into one buffer of
/// `round(stage * output_scale)` pixels, shrunk uniformly when a side would exceed
/// [`MAX_OUTPUT_SIDE`].
#[tracing::instrument(skip(body, overlay), fields(has_overlay = overlay.is_some()))]
pub fn flatten(
    body: &RasterImage,
    stage: PixelSize,
    output_scale: f64,
    overlay: Option<Overlay<'_>>,
) -> ImageResult<RasterImage> {
    if !output_scale.is_finite() || output_scale <= 0.0 {
        return Err(ImageError::render("output scale must be finite and > 0"));
    }
    let mut output_scale = output_scale;
    let mut out = stage.scaled(output_scale);
    if out.max_side() > MAX_OUTPUT_SIDE {
        let requested = (out.width, out.height);
        output_scale = f64::from(MAX_OUTPUT_SIDE) / f64::from(stage.max_side());
        out = stage.scaled(output_scale);
        tracing::warn!(
            ?requested,
            width = out.width,
            height = out.height,
            "output shrunk to the maximum side"
        );
    }

    let base = resample_to(body, out)?;
    let Some(overlay) = overlay else {
        return Ok(base);
    };

    let mut data = base.as_rgba8().to_vec();
    draw_overlay(&mut data, out, overlay, output_scale)?;
    RasterImage::from_rgba8(out.width, out.height, data)
}

fn resample_to(img: &RasterImage, size: PixelSize) -> ImageResult<RasterImage> {
    if img.size() == size {
        return Ok(img.clone());
    }
    let resized = image::imageops::resize(
        &img.to_rgba_image()?,
        size.width,
        size.height,
        image::imageops::FilterType::Triangle,
    );
    RasterImage::from_rgba_image(resized)
}

fn draw_overlay(
    dst: &mut [u8],
    out: PixelSize,
    overlay: Overlay<'_>,
    output_scale: f64,
) -> ImageResult<()> {
    let design = overlay.image;
    let xf = layer_to_output(overlay.placement, design.size(), out, output_scale);
    if !xf.determinant().is_normal() {
        return Err(ImageError::render("overlay transform is degenerate"));
    }
    let inv = xf.inverse();

    let bbox = xf.transform_rect_bbox(Rect::new(
        0.0,
        0.0,
        f64::from(design.width()),
        f64::from(design.height()),
    ));
    let x0 = bbox.x0.floor().max(0.0) as usize;
    let y0 = bbox.y0.floor().max(0.0) as usize;
    let x1 = (bbox.x1.ceil().min(f64::from(out.width))).max(0.0) as usize;
    let y1 = (bbox.y1.ceil().min(f64::from(out.height))).max(0.0) as usize;
    if x0 >= x1 || y0 >= y1 {
        tracing::debug!("overlay lies outside the output");
        return Ok(());
    }

    let mut premul = design.as_rgba8().to_vec();
    premultiply_rgba8_in_place(&mut premul);
    let tex = Texture {
        data: &premul,
        width: design.width() as i64,
        height: design.height() as i64,
    };

    let stride = out.width as usize * 4;
    dst.par_chunks_mut(stride)
        .enumerate()
        .skip(y0)
        .take(y1 - y0)
        .for_each(|(y, row)| {
            for x in x0..x1 {
                let p = inv * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let src = tex.sample_bilinear(p.x - 0.5, p.y - 0.5);
                if src[3] == 0 {
                    continue;
                }
                let px = &mut row[x * 4..x * 4 + 4];
                let blended = over_straight_dst([px[0], px[1], px[2], px[3]], src);
                px.copy_from_slice(&blended);
            }
        });
    Ok(())
}

/// Premultiplied texture with transparent surroundings.
struct Texture<'a> {
    data: &'a [u8],
    width: i64,
    height: i64,
}

impl Texture<'_> {
    fn texel(&self, x: i64, y: i64) -> [f32; 4] {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return [0.0; 4];
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = &self.data[i..i + 4];
        [
            f32::from(px[0]),
            f32::from(px[1]),
            f32::from(px[2]),
            f32::from(px[3]),
        ]
    }

    fn sample_bilinear(&self, u: f64, v: f64) -> [u8; 4] {
        let fx0 = u.floor();
        let fy0 = v.floor();
        let tx = (u - fx0) as f32;
        let ty = (v - fy0) as f32;
        let (x0, y0) = (fx0 as i64, fy0 as i64);

        let a = self.texel(x0, y0);
        let b = self.texel(x0 + 1, y0);
        let c = self.texel(x0, y0 + 1);
        let d = self.texel(x0 + 1, y0 + 1);

        let mut out = [0u8; 4];
        for i in 0..4 {
            let top = a[i] + (b[i] - a[i]) * tx;
            let bottom = c[i] + (d[i] - c[i]) * tx;
            out[i] = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
        }
        // Premultiplied colour may never exceed alpha.
        let a = out[3];
        out[0] = out[0].min(a);
        out[1] = out[1].min(a);
        out[2] = out[2].min(a);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/flatten.rs"]
mod tests;
