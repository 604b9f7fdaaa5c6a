use crate::foundation::core::{Affine, PixelSize, Vec2};
use crate::foundation::math::wrap_degrees;

/// Where the design sits over the body.
///
/// `x`/`y` offset the design centre from the stage centre in stage pixels; `scale` and
/// `rotate_deg` apply about the design centre.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementState {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotate_deg: f64,
}

impl PlacementState {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        rotate_deg: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for PlacementState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Partial change to a [`PlacementState`]. Absolute values apply first, then deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
    pub rotate_deg: Option<f64>,
    pub dx: f64,
    pub dy: f64,
    pub dscale: f64,
    pub drotate_deg: f64,
}

impl PlacementUpdate {
    pub fn translate_to(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn translate_by(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            ..Self::default()
        }
    }

    pub fn scale_to(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn rotate_to(deg: f64) -> Self {
        Self {
            rotate_deg: Some(deg),
            ..Self::default()
        }
    }

    pub fn rotate_by(deg: f64) -> Self {
        Self {
            drotate_deg: deg,
            ..Self::default()
        }
    }

    /// Apply to `state`. `clamp_scale` bounds the final scale; rotation wraps modulo 360.
    pub fn apply(
        &self,
        state: PlacementState,
        clamp_scale: impl Fn(f64) -> f64,
    ) -> PlacementState {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };

        let mut next = state;
        if let Some(x) = self.x {
            next.x = finite_or(x, next.x);
        }
        if let Some(y) = self.y {
            next.y = finite_or(y, next.y);
        }
        if let Some(s) = self.scale {
            next.scale = finite_or(s, next.scale);
        }
        if let Some(r) = self.rotate_deg {
            next.rotate_deg = finite_or(r, next.rotate_deg);
        }
        next.x += finite_or(self.dx, 0.0);
        next.y += finite_or(self.dy, 0.0);
        next.scale = clamp_scale(next.scale + finite_or(self.dscale, 0.0));
        next.rotate_deg = wrap_degrees(next.rotate_deg + finite_or(self.drotate_deg, 0.0));
        next
    }
}

/// `T(x, y) * R(rotate) * S(scale)`: design-centred coordinates to stage-centre-relative ones.
pub fn compute_transform_matrix(state: &PlacementState) -> Affine {
    Affine::translate(Vec2::new(state.x, state.y))
        * Affine::rotate(state.rotate_deg.to_radians())
        * Affine::scale(state.scale)
}

/// Full mapping from design pixel space into an output buffer of `out` pixels that renders the
/// stage at `output_scale`.
pub fn layer_to_output(
    state: &PlacementState,
    design: PixelSize,
    out: PixelSize,
    output_scale: f64,
) -> Affine {
    Affine::translate(out.center())
        * Affine::scale(output_scale)
        * compute_transform_matrix(state)
        * Affine::translate(-design.center())
}

#[cfg(test)]
#[path = "../../tests/unit/transform/placement.rs"]
mod tests;
