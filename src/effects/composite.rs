use crate::foundation::math::{mul_div255_u16, mul_div255_u8};

pub type PremulRgba8 = [u8; 4];
pub type StraightRgba8 = [u8; 4];

/// Premultiplied source-over.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

pub fn premultiply(px: StraightRgba8) -> PremulRgba8 {
    let a = u16::from(px[3]);
    match px[3] {
        0 => [0, 0, 0, 0],
        255 => px,
        _ => [
            mul_div255_u8(u16::from(px[0]), a),
            mul_div255_u8(u16::from(px[1]), a),
            mul_div255_u8(u16::from(px[2]), a),
            px[3],
        ],
    }
}

pub fn unpremultiply(px: PremulRgba8) -> StraightRgba8 {
    let a = u32::from(px[3]);
    match px[3] {
        0 => [0, 0, 0, 0],
        255 => px,
        _ => {
            let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
            [un(px[0]), un(px[1]), un(px[2]), px[3]]
        }
    }
}

pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let p = premultiply([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&p);
    }
}

/// Composite a premultiplied `src` over a straight-alpha `dst` pixel, returning straight alpha.
///
/// Fully opaque destinations (the usual body photo) never round-trip through premultiplied
/// space, so their untouched channels stay bit-exact.
pub fn over_straight_dst(dst: StraightRgba8, src: PremulRgba8) -> StraightRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if dst[3] == 255 {
        let inv = 255u16 - u16::from(src[3]);
        let mut out = [0u8; 4];
        for i in 0..3 {
            let d = mul_div255_u16(u16::from(dst[i]), inv);
            out[i] = (u16::from(src[i]) + d).min(255) as u8;
        }
        out[3] = 255;
        return out;
    }
    unpremultiply(over(premultiply(dst), src))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
