//! Tattoo Canvas composites a tattoo design over a body photo.
//!
//! The API is session-oriented:
//!
//! - Load a body photo and a design into a [`Session`]
//! - Key out the design's near-white background, then place it (translate, scale, rotate)
//! - Undo at gesture granularity, or replay a JSON [`Action`] script
//! - Flatten both layers into one RGBA image with [`Session::export_composite`]
#![forbid(unsafe_code)]

mod assets;
mod effects;
mod foundation;
mod raster;
mod render;
mod session;
mod transform;

/// Session configuration.
pub mod config;

pub use crate::foundation::core::{Affine, PixelRect, PixelSize, Point, Rect, Vec2};
pub use crate::foundation::error::{ImageError, ImageResult, Prerequisite};
pub use crate::foundation::math::wrap_degrees;

pub use crate::assets::decode::{
    ImageFile, PreparedDesign, decode_image, downscale_to_fit, fit_within, prepare_body,
    prepare_design, validate_image_file,
};
pub use crate::config::CompositorConfig;
pub use crate::effects::composite::{over, premultiply, unpremultiply};
pub use crate::effects::knockout::{Knockout, content_bounds, key_near_white, remove_background};
pub use crate::raster::buffer::RasterImage;
pub use crate::raster::rendered::RenderedImage;
pub use crate::render::flatten::{MAX_OUTPUT_SIDE, Overlay, flatten};
pub use crate::session::action::{Action, parse_script};
pub use crate::session::compositor::{LoadOutcome, LoadTicket, Session, Slot};
pub use crate::session::gesture::RotateDirection;
pub use crate::session::history::{UNDO_LIMIT, UndoEntry, UndoHistory};
pub use crate::transform::placement::{
    PlacementState, PlacementUpdate, compute_transform_matrix, layer_to_output,
};
