use std::path::{Path, PathBuf};

use crate::assets::decode::ImageFile;
use crate::foundation::core::{PixelSize, Point};
use crate::foundation::error::{ImageError, ImageResult};
use crate::session::compositor::Session;
use crate::session::gesture::RotateDirection;
use crate::transform::placement::PlacementUpdate;

/// One recorded editor action. A JSON array of these is an edit script.
///
/// ```json
/// [
///   { "op": "load_body", "path": "arm.jpg" },
///   { "op": "load_design", "path": "rose.png" },
///   { "op": "remove_background", "threshold": 40 },
///   { "op": "place", "update": { "x": 20, "scale": 0.8 }, "gesture_end": true },
///   { "op": "rotate", "direction": "left" }
/// ]
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    LoadBody {
        path: PathBuf,
    },
    LoadDesign {
        path: PathBuf,
    },
    RemoveBackground {
        /// Falls back to the configured default threshold.
        #[serde(default)]
        threshold: Option<u8>,
        #[serde(default = "default_push_undo")]
        push_undo: bool,
    },
    Place {
        update: PlacementUpdate,
        #[serde(default)]
        gesture_end: bool,
    },
    /// A complete pointer drag from `from` to `to`.
    Drag {
        from: Point,
        to: Point,
    },
    Rotate {
        direction: RotateDirection,
    },
    Undo,
    Reset,
    ToggleBodyEdit,
    SetStage {
        width: u32,
        height: u32,
    },
}

fn default_push_undo() -> bool {
    true
}

/// Parse a JSON edit script.
pub fn parse_script(json: &str) -> ImageResult<Vec<Action>> {
    serde_json::from_str(json)
        .map_err(|e| ImageError::Other(anyhow::Error::new(e).context("parse action script")))
}

impl Session {
    /// Apply one action. Relative paths resolve against `base_dir`.
    #[tracing::instrument(skip(self, base_dir))]
    pub fn apply(&mut self, action: &Action, base_dir: &Path) -> ImageResult<()> {
        match action {
            Action::LoadBody { path } => {
                let file = ImageFile::from_path(&base_dir.join(path))?;
                self.load_body(&file)
            }
            Action::LoadDesign { path } => {
                let file = ImageFile::from_path(&base_dir.join(path))?;
                self.load_design(&file)
            }
            Action::RemoveBackground {
                threshold,
                push_undo,
            } => {
                let t = threshold.unwrap_or(self.config().default_threshold);
                self.remove_background(t, *push_undo)
            }
            Action::Place {
                update,
                gesture_end,
            } => {
                self.set_placement(*update, *gesture_end);
                Ok(())
            }
            Action::Drag { from, to } => {
                self.begin_drag(*from);
                self.drag_to(*to);
                self.end_drag();
                Ok(())
            }
            Action::Rotate { direction } => self.rotate_step(*direction).map(|_| ()),
            Action::Undo => self.undo().map(|_| ()),
            Action::Reset => {
                self.reset();
                Ok(())
            }
            Action::ToggleBodyEdit => self.toggle_body_edit().map(|_| ()),
            Action::SetStage { width, height } => {
                self.set_stage_size(PixelSize::new(*width, *height)?);
                Ok(())
            }
        }
    }

    /// Apply actions in order, stopping at the first error.
    pub fn replay(&mut self, actions: &[Action], base_dir: &Path) -> ImageResult<()> {
        for (idx, action) in actions.iter().enumerate() {
            self.apply(action, base_dir).inspect_err(
                |e| tracing::warn!(step = idx, error = %e, "action script stopped"),
            )?;
        }
        tracing::debug!(steps = actions.len(), "action script replayed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/action.rs"]
mod tests;
