use crate::assets::decode::{
    ImageFile, PreparedDesign, fit_within, prepare_body, prepare_design, validate_image_file,
};
use crate::config::CompositorConfig;
use crate::effects::knockout;
use crate::foundation::core::{PixelSize, Point, Vec2};
use crate::foundation::error::{ImageError, ImageResult, Prerequisite};
use crate::raster::buffer::RasterImage;
use crate::raster::rendered::RenderedImage;
use crate::render::flatten::{Overlay, flatten};
use crate::session::gesture::{DragGesture, RotateDirection};
use crate::session::history::{UndoEntry, UndoHistory};
use crate::transform::placement::{PlacementState, PlacementUpdate};

/// Image slot a load targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Body,
    Design,
}

/// Handle for an in-flight load. Only the newest ticket per slot may commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "pass the ticket to the matching finish_* call"]
pub struct LoadTicket {
    slot: Slot,
    generation: u64,
}

impl LoadTicket {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

/// What happened to a completed load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The decoded image replaced the slot's content.
    Applied,
    /// A newer load or a reset superseded this one; nothing changed.
    Discarded,
}

#[derive(Clone, Debug)]
struct DesignLayer {
    original: RasterImage,
    rendered: RenderedImage,
}

/// One compositing session: a body photo, a design over it, its placement and undo history.
///
/// All mutation goes through `&mut self`. Decoding is the only step that may happen elsewhere:
/// see [`Session::begin_design_load`] and [`Session::finish_design_load`].
#[derive(Debug)]
pub struct Session {
    config: CompositorConfig,
    body: Option<RasterImage>,
    design: Option<DesignLayer>,
    placement: PlacementState,
    history: UndoHistory,
    // Pre-gesture snapshot, pushed when the gesture ends.
    gesture_snapshot: Option<UndoEntry>,
    drag: Option<DragGesture>,
    body_generation: u64,
    design_generation: u64,
    stage: Option<PixelSize>,
    body_editing: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_valid_config(CompositorConfig::default())
    }
}

impl Session {
    pub fn new(config: CompositorConfig) -> ImageResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: CompositorConfig) -> Self {
        Self {
            config,
            body: None,
            design: None,
            placement: PlacementState::IDENTITY,
            history: UndoHistory::new(),
            gesture_snapshot: None,
            drag: None,
            body_generation: 0,
            design_generation: 0,
            stage: None,
            body_editing: false,
        }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn placement(&self) -> PlacementState {
        self.placement
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn has_design(&self) -> bool {
        self.design.is_some()
    }

    pub fn body(&self) -> Option<&RasterImage> {
        self.body.as_ref()
    }

    /// Downscaled buffer of the current design, before any keying.
    pub fn design_original(&self) -> Option<&RasterImage> {
        self.design.as_ref().map(|d| &d.original)
    }

    /// Encoding of the design as currently shown.
    pub fn design_rendered(&self) -> Option<&RenderedImage> {
        self.design.as_ref().map(|d| &d.rendered)
    }

    /// Decoded pixels of the design as currently shown.
    pub fn processed_design(&self) -> ImageResult<RasterImage> {
        self.design
            .as_ref()
            .ok_or(ImageError::missing(Prerequisite::Design))?
            .rendered
            .decode()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_body_editing(&self) -> bool {
        self.body_editing
    }

    /// Size of the preview stage: the explicit one, else the body's pixel size fitted within
    /// `max_stage_dim`.
    pub fn stage_size(&self) -> Option<PixelSize> {
        self.stage
            .or_else(|| self.body.as_ref().map(|b| self.default_stage(b)))
    }

    fn default_stage(&self, body: &RasterImage) -> PixelSize {
        fit_within(body.size(), self.config.max_stage_dim)
    }

    pub fn set_stage_size(&mut self, size: PixelSize) {
        self.stage = Some(size);
    }

    fn snapshot(&self) -> Option<UndoEntry> {
        self.design.as_ref().map(|d| UndoEntry {
            placement: self.placement,
            rendered: d.rendered.clone(),
        })
    }

    fn record(&mut self, entry: Option<UndoEntry>) {
        let Some(entry) = entry else {
            return;
        };
        if self.history.push(entry).is_some() {
            tracing::debug!("undo history full, evicted oldest entry");
        }
    }

    fn push_undo(&mut self) {
        let entry = self.snapshot();
        self.record(entry);
    }

    // An unfinished placement gesture keeps its own entry when another action intervenes.
    fn flush_gesture(&mut self) {
        let pending = self.gesture_snapshot.take();
        self.record(pending);
    }

    fn require_body(&self) -> ImageResult<&RasterImage> {
        self.body
            .as_ref()
            .ok_or(ImageError::missing(Prerequisite::Body))
    }

    /// Start a body load; any older in-flight body load becomes stale.
    pub fn begin_body_load(&mut self) -> LoadTicket {
        self.body_generation += 1;
        LoadTicket {
            slot: Slot::Body,
            generation: self.body_generation,
        }
    }

    /// Start a design load; any older in-flight design load becomes stale.
    pub fn begin_design_load(&mut self) -> LoadTicket {
        self.design_generation += 1;
        LoadTicket {
            slot: Slot::Design,
            generation: self.design_generation,
        }
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        match ticket.slot {
            Slot::Body => ticket.generation == self.body_generation,
            Slot::Design => ticket.generation == self.design_generation,
        }
    }

    /// Commit a decoded body. Stale tickets are discarded, whatever their result.
    #[tracing::instrument(skip(self, decoded))]
    pub fn finish_body_load(
        &mut self,
        ticket: LoadTicket,
        decoded: ImageResult<RasterImage>,
    ) -> ImageResult<LoadOutcome> {
        if ticket.slot != Slot::Body {
            return Err(ImageError::Other(anyhow::anyhow!(
                "design ticket passed to finish_body_load"
            )));
        }
        if !self.is_current(ticket) {
            tracing::debug!("discarding stale body load");
            return Ok(LoadOutcome::Discarded);
        }
        let body = decoded.inspect_err(|e| tracing::warn!(error = %e, "body load failed"))?;
        tracing::info!(width = body.width(), height = body.height(), "body photo loaded");
        self.body = Some(body);
        Ok(LoadOutcome::Applied)
    }

    /// Commit a decoded design. Stale tickets (superseded or reset) are discarded.
    #[tracing::instrument(skip(self, prepared))]
    pub fn finish_design_load(
        &mut self,
        ticket: LoadTicket,
        prepared: ImageResult<PreparedDesign>,
    ) -> ImageResult<LoadOutcome> {
        if ticket.slot != Slot::Design {
            return Err(ImageError::Other(anyhow::anyhow!(
                "body ticket passed to finish_design_load"
            )));
        }
        if !self.is_current(ticket) {
            tracing::debug!("discarding stale design load");
            return Ok(LoadOutcome::Discarded);
        }
        let prepared = prepared.inspect_err(|e| tracing::warn!(error = %e, "design load failed"))?;

        self.flush_gesture();
        self.push_undo();
        self.design = Some(DesignLayer {
            original: prepared.original,
            rendered: prepared.rendered,
        });
        self.placement = PlacementState::IDENTITY;
        self.drag = None;

        if self.body.is_none() {
            tracing::warn!("design loaded before a body photo");
        } else {
            tracing::info!("design loaded");
        }
        Ok(LoadOutcome::Applied)
    }

    /// Validate, decode and set the body photo.
    #[tracing::instrument(skip(self, file), fields(name = %file.name, bytes = file.bytes.len()))]
    pub fn load_body(&mut self, file: &ImageFile) -> ImageResult<()> {
        // Rejected picks must not supersede an in-flight load.
        validate_image_file(file, self.config.max_file_bytes)?;
        let ticket = self.begin_body_load();
        let decoded = prepare_body(file, &self.config);
        self.finish_body_load(ticket, decoded).map(|_| ())
    }

    /// Validate, decode, downscale and set the design. Placement returns to identity.
    #[tracing::instrument(skip(self, file), fields(name = %file.name, bytes = file.bytes.len()))]
    pub fn load_design(&mut self, file: &ImageFile) -> ImageResult<()> {
        validate_image_file(file, self.config.max_file_bytes)?;
        let ticket = self.begin_design_load();
        let prepared = prepare_design(file, &self.config);
        self.finish_design_load(ticket, prepared).map(|_| ())
    }

    /// Key near-white pixels out of the original design and crop to what is left.
    ///
    /// `push_undo` is true for discrete actions and for the first tick of a slider drag.
    #[tracing::instrument(skip(self))]
    pub fn remove_background(&mut self, threshold: u8, push_undo: bool) -> ImageResult<()> {
        self.require_body()?;
        let original = match &self.design {
            Some(d) => d.original.clone(),
            None => return Err(ImageError::missing(Prerequisite::Design)),
        };

        let keyed = knockout::remove_background(&original, threshold)?;
        let rendered = RenderedImage::encode(&keyed.image)?;

        if push_undo {
            self.flush_gesture();
            self.push_undo();
        }
        if let Some(d) = self.design.as_mut() {
            d.rendered = rendered;
        }
        match keyed.bounds {
            Some(b) => tracing::debug!(
                x = b.x,
                y = b.y,
                width = b.width,
                height = b.height,
                "background removed"
            ),
            None => tracing::debug!("background removed, nothing left visible"),
        }
        Ok(())
    }

    /// Change the placement. Only gesture ends record undo: a non-end update opens a gesture
    /// and remembers the state it started from; the end pushes that state.
    pub fn set_placement(&mut self, update: PlacementUpdate, is_gesture_end: bool) -> PlacementState {
        let before = self.snapshot();
        let next = update.apply(self.placement, |s| self.config.clamp_scale(s));
        self.placement = next;

        if is_gesture_end {
            let entry = self.gesture_snapshot.take().or(before);
            self.record(entry);
        } else if self.gesture_snapshot.is_none() {
            self.gesture_snapshot = before;
        }
        next
    }

    pub fn begin_drag(&mut self, pointer: Point) {
        let base = Vec2::new(self.placement.x, self.placement.y);
        self.drag = Some(DragGesture::begin(pointer, base));
        if self.gesture_snapshot.is_none() {
            self.gesture_snapshot = self.snapshot();
        }
    }

    /// Move the active drag. `None` when no drag is active.
    pub fn drag_to(&mut self, pointer: Point) -> Option<PlacementState> {
        let offset = self.drag?.offset_at(pointer);
        Some(self.set_placement(PlacementUpdate::translate_to(offset.x, offset.y), false))
    }

    /// Finish the active drag, recording one undo entry for the whole gesture.
    pub fn end_drag(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        let entry = self.gesture_snapshot.take();
        self.record(entry);
        true
    }

    /// Abort the active drag. The offset stays where it was moved; no undo is recorded.
    pub fn cancel_drag(&mut self) {
        if self.drag.take().is_some() {
            self.gesture_snapshot = None;
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn rotate_step(&mut self, direction: RotateDirection) -> ImageResult<PlacementState> {
        if self.design.is_none() {
            return Err(ImageError::missing(Prerequisite::Design));
        }
        let delta = direction.signed(self.config.rotate_step_deg);
        self.flush_gesture();
        Ok(self.set_placement(PlacementUpdate::rotate_by(delta), true))
    }

    #[tracing::instrument(skip(self))]
    pub fn undo(&mut self) -> ImageResult<PlacementState> {
        let entry = self.history.pop().ok_or(ImageError::NothingToUndo)?;
        self.placement = entry.placement;
        if let Some(d) = self.design.as_mut() {
            d.rendered = entry.rendered;
        }
        self.drag = None;
        self.gesture_snapshot = None;
        tracing::debug!(remaining = self.history.len(), "undid last change");
        Ok(self.placement)
    }

    /// Back to "body loaded, no design". In-flight design loads are discarded.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) {
        self.placement = PlacementState::IDENTITY;
        self.design = None;
        self.history.clear();
        self.gesture_snapshot = None;
        self.drag = None;
        self.design_generation += 1;
        if self.body.is_some() {
            tracing::info!("design cleared");
        } else {
            tracing::info!("session reset with no body photo");
        }
    }

    pub fn toggle_body_edit(&mut self) -> ImageResult<bool> {
        self.require_body()?;
        self.body_editing = !self.body_editing;
        tracing::debug!(enabled = self.body_editing, "body edit toggled");
        Ok(self.body_editing)
    }

    /// Flatten body and design into one image at `output_scale` times the stage size.
    #[tracing::instrument(skip(self))]
    pub fn export_composite(&self, output_scale: f64) -> ImageResult<RasterImage> {
        let body = self.body.as_ref().ok_or(ImageError::MissingBody)?;
        let stage = self.stage.unwrap_or_else(|| self.default_stage(body));

        let design = self
            .design
            .as_ref()
            .map(|d| d.rendered.decode())
            .transpose()?;
        let overlay = design.as_ref().map(|image| Overlay {
            image,
            placement: &self.placement,
        });

        let out = flatten(body, stage, output_scale, overlay)?;
        tracing::info!(width = out.width(), height = out.height(), "composite exported");
        Ok(out)
    }

    /// [`Session::export_composite`] at the configured output scale.
    pub fn export_default(&self) -> ImageResult<RasterImage> {
        self.export_composite(self.config.output_scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/compositor.rs"]
mod tests;
