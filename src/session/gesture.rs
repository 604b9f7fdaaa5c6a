use crate::foundation::core::{Point, Vec2};

/// Pointer drag in progress: where it started and the offset it started from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGesture {
    origin: Point,
    base: Vec2,
}

impl DragGesture {
    pub fn begin(pointer: Point, base: Vec2) -> Self {
        Self {
            origin: pointer,
            base,
        }
    }

    /// Offset for the current pointer position.
    pub fn offset_at(&self, pointer: Point) -> Vec2 {
        self.base + (pointer - self.origin)
    }
}

/// Rotate-left / rotate-right controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    pub fn signed(self, step_deg: f64) -> f64 {
        match self {
            Self::Left => -step_deg,
            Self::Right => step_deg,
        }
    }
}
