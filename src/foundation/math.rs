pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Truncated remainder modulo 360, so -365 wraps to -5 and 725 to 5.
pub fn wrap_degrees(deg: f64) -> f64 {
    let r = deg % 360.0;
    // Keep -0.0 out of snapshots and comparisons.
    if r == 0.0 { 0.0 } else { r }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
