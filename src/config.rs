//! Compositor configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields the stock
//! settings: 8 MiB upload limit, 1200 px design cap, 2048 px default stage,
//! threshold 30, scale range 0.1..=3.0,
//! 5 degree rotate steps and 2x export.

use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{ImageError, ImageResult};

/// Default upload limit (8 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 8 * 1024 * 1024;
/// Default longest side of a loaded design, in pixels.
pub const DEFAULT_MAX_DESIGN_DIM: u32 = 1200;
/// Default longest side of the preview stage when none is set explicitly.
pub const DEFAULT_MAX_STAGE_DIM: u32 = 2048;
/// Default near-white threshold.
pub const DEFAULT_THRESHOLD: u8 = 30;
/// Default export file name.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "tattoo-canvas.png";

/// Tunables for a [`crate::Session`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorConfig {
    /// Largest accepted upload, in bytes.
    pub max_file_bytes: u64,
    /// Designs are downscaled so neither side exceeds this.
    pub max_design_dim: u32,
    /// The default stage is the body photo fitted within this many pixels per side.
    pub max_stage_dim: u32,
    /// Threshold used when a caller does not pick one.
    pub default_threshold: u8,
    /// Lower bound of the scale control.
    pub scale_min: f64,
    /// Upper bound of the scale control.
    pub scale_max: f64,
    /// Degrees per rotate-left / rotate-right activation.
    pub rotate_step_deg: f64,
    /// Export resolution relative to the stage.
    pub output_scale: f64,
    /// File name offered for the flattened export.
    pub export_file_name: String,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_design_dim: DEFAULT_MAX_DESIGN_DIM,
            max_stage_dim: DEFAULT_MAX_STAGE_DIM,
            default_threshold: DEFAULT_THRESHOLD,
            scale_min: 0.1,
            scale_max: 3.0,
            rotate_step_deg: 5.0,
            output_scale: 2.0,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl CompositorConfig {
    pub fn from_json_str(s: &str) -> ImageResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse compositor config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> ImageResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ImageResult<()> {
        if self.max_file_bytes == 0 {
            return Err(ImageError::config("max_file_bytes must be > 0"));
        }
        if self.max_design_dim == 0 {
            return Err(ImageError::config("max_design_dim must be > 0"));
        }
        if self.max_stage_dim == 0 {
            return Err(ImageError::config("max_stage_dim must be > 0"));
        }
        if !self.scale_min.is_finite() || self.scale_min <= 0.0 {
            return Err(ImageError::config("scale_min must be finite and > 0"));
        }
        if !self.scale_max.is_finite() || self.scale_max < self.scale_min {
            return Err(ImageError::config("scale_max must be finite and >= scale_min"));
        }
        if !self.rotate_step_deg.is_finite() {
            return Err(ImageError::config("rotate_step_deg must be finite"));
        }
        if !self.output_scale.is_finite() || self.output_scale <= 0.0 {
            return Err(ImageError::config("output_scale must be finite and > 0"));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(ImageError::config("export_file_name must be non-empty"));
        }
        Ok(())
    }

    /// Clamp a requested scale into the control range.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.scale_min;
        }
        scale.clamp(self.scale_min, self.scale_max)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
