//! The editing session: document, view, history and interaction state.
//!
//! All editing goes through [`Session`]. Every handler runs to completion
//! and leaves the document consistent; commands that can fail validate
//! their input before taking a checkpoint and mutating anything.

use crate::camera::Camera;
use crate::constraint::Constraints;
use crate::document::{DocumentError, Document, Hit, EXPORT_PADDING, HANDLE_HIT_RADIUS};
use crate::history::{DEFAULT_HISTORY_CAPACITY, History};
use crate::input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent, Shortcut};
use crate::parametric::{self, ParametricError};
use crate::shapes::{Endpoint, Primitive, PrimitiveId, PrimitiveKind};
use crate::snap::{self, SNAP_DIST, SnapResult};
use crate::storage::{AutoSave, DEFAULT_AUTOSAVE_KEY, Storage, StorageError};
use crate::tools::{ToolKind, ToolManager, ToolState};
use crate::units::Unit;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum length of a newly drawn primitive, in world pixels.
pub const MIN_SEGMENT_LENGTH: f64 = 5.0;

/// Zoom factor per wheel notch.
const SCROLL_ZOOM_IN: f64 = 1.1;
const SCROLL_ZOOM_OUT: f64 = 0.9;

/// Tunable interaction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Snap catch radius in screen pixels.
    pub snap_distance: f64,
    /// Number of undo steps kept.
    pub history_capacity: usize,
    /// Draw gestures shorter than this (world pixels) are discarded.
    pub min_segment_length: f64,
    /// Endpoint grab radius in screen pixels.
    pub handle_hit_radius: f64,
    /// Storage key for the auto-saved document.
    pub autosave_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snap_distance: SNAP_DIST,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_segment_length: MIN_SEGMENT_LENGTH,
            handle_hit_radius: HANDLE_HIT_RADIUS,
            autosave_key: DEFAULT_AUTOSAVE_KEY.to_string(),
        }
    }
}

/// Errors from session commands.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Parametric(#[from] ParametricError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("No primitive is selected")]
    NoSelection,
    #[error("The drawing is not calibrated")]
    Uncalibrated,
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// The current selection, held by id and resolved on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: PrimitiveId,
    /// The grabbed handle, when an endpoint was picked.
    pub endpoint: Option<Endpoint>,
}

/// An interactive drafting session.
#[derive(Debug)]
pub struct Session {
    document: Document,
    /// View transform. Not persisted with the document.
    pub camera: Camera,
    history: History<Vec<Primitive>>,
    selection: Option<Selection>,
    tools: ToolManager,
    input: InputState,
    config: SessionConfig,
    autosave: Option<AutoSave>,
    /// Last snap result during a gesture, for visual feedback.
    snap: Option<SnapResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_config(SessionConfig::default())
    }
}

impl Session {
    /// Create a session with default settings and no store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with custom settings.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            document: Document::new(),
            camera: Camera::new(),
            history: History::new(config.history_capacity),
            selection: None,
            tools: ToolManager::new(),
            input: InputState::new(),
            config,
            autosave: None,
            snap: None,
        }
    }

    /// Attach a store; the document is written to it after every committed change.
    pub fn with_store(mut self, storage: Arc<dyn Storage>) -> Self {
        self.autosave = Some(AutoSave::with_key(storage, self.config.autosave_key.clone()));
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn history(&self) -> &History<Vec<Primitive>> {
        &self.history
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tools.state
    }

    /// Switch tools. A gesture in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        log::debug!("Tool: {:?}", tool);
        self.tools.set_tool(tool);
        self.snap = None;
    }

    /// The primitive being drawn, not yet part of the document.
    pub fn preview(&self) -> Option<&Primitive> {
        self.tools.preview()
    }

    /// The snap target of the gesture in progress.
    pub fn active_snap(&self) -> Option<SnapResult> {
        self.snap.filter(|s| s.snapped)
    }

    /// Whether the attached store missed the latest change.
    ///
    /// Clears on the next successful save. Always `false` without a store.
    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.as_ref().is_some_and(AutoSave::is_dirty)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.input.modifiers
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    // --- Selection ---

    /// The current selection, if it still refers to a live primitive.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
            .filter(|s| self.document.get(s.id).is_some())
    }

    pub fn selected_id(&self) -> Option<PrimitiveId> {
        self.selection().map(|s| s.id)
    }

    pub fn selected(&self) -> Option<&Primitive> {
        self.selection.and_then(|s| self.document.get(s.id))
    }

    /// Select a primitive by id. Unknown ids clear the selection.
    pub fn select(&mut self, id: PrimitiveId) -> bool {
        if self.document.get(id).is_some() {
            self.selection = Some(Selection { id, endpoint: None });
            true
        } else {
            self.selection = None;
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn require_selected(&self) -> Result<PrimitiveId, SessionError> {
        self.selected_id().ok_or(SessionError::NoSelection)
    }

    // --- Event handling ---

    /// Handle a pointer event in screen coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.input.handle_pointer_event(&event);
        match event {
            // A second button never interrupts a gesture in progress.
            PointerEvent::Down { .. } if self.tools.is_active() => {}
            PointerEvent::Down {
                position,
                button: MouseButton::Middle,
            } => {
                self.tools.state = ToolState::Panning { last: position };
            }
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => {
                let world = self.camera.screen_to_world(position);
                self.pointer_down(world);
            }
            PointerEvent::Down { .. } => {}
            PointerEvent::Move { position } => {
                if let ToolState::Panning { last } = self.tools.state {
                    self.camera.pan_by_screen(position - last);
                    self.tools.state = ToolState::Panning { last: position };
                    return;
                }
                let world = self.camera.screen_to_world(position);
                self.pointer_move(world);
            }
            PointerEvent::Up { button, .. } => {
                if self.tools.state.button() == Some(button) {
                    self.pointer_up();
                }
            }
            PointerEvent::Scroll { position, delta } => {
                let factor = if delta.y > 0.0 {
                    SCROLL_ZOOM_OUT
                } else {
                    SCROLL_ZOOM_IN
                };
                self.camera.zoom_at(position, factor);
            }
        }
    }

    /// Handle a key event: modifier tracking plus shortcuts.
    pub fn handle_key(&mut self, event: KeyEvent) {
        self.input.handle_key_event(&event);
        let KeyEvent::Pressed(key) = &event else {
            return;
        };
        match Shortcut::from_key(key, self.input.modifiers) {
            Some(Shortcut::Tool(tool)) => self.set_tool(tool),
            Some(Shortcut::Delete) => {
                self.delete_selected();
            }
            Some(Shortcut::Undo) => {
                self.undo();
            }
            Some(Shortcut::Redo) => {
                self.redo();
            }
            None => {}
        }
    }

    /// Primary button pressed at a world point.
    pub fn pointer_down(&mut self, world: Point) {
        if self.tools.current_tool.is_drawing_tool() {
            self.begin_draw(world);
            return;
        }
        let hit = self
            .document
            .hit_test_with(world, self.camera.zoom, self.config.handle_hit_radius);
        match hit {
            Some(Hit::Endpoint { id, endpoint }) => {
                self.begin_endpoint_drag(id, endpoint);
            }
            Some(Hit::Body { id }) => {
                self.begin_move(id, world);
            }
            None => self.clear_selection(),
        }
    }

    /// Pointer moved to a world point.
    pub fn pointer_move(&mut self, world: Point) {
        match self.tools.state {
            ToolState::Drawing { .. } => self.update_draw(world),
            ToolState::DraggingEndpoint { .. } => self.update_endpoint_drag(world),
            ToolState::MovingSegment { .. } => self.update_move(world),
            ToolState::Idle | ToolState::Panning { .. } => {}
        }
    }

    /// Gesture button released: finish the gesture.
    pub fn pointer_up(&mut self) {
        self.snap = None;
        match self.tools.end() {
            ToolState::Drawing { preview } => {
                self.commit_preview(preview);
            }
            ToolState::DraggingEndpoint { .. } | ToolState::MovingSegment { .. } => {
                log::debug!("Edit gesture finished");
                self.persist();
            }
            ToolState::Idle | ToolState::Panning { .. } => {}
        }
    }

    // --- Drawing ---

    /// Start drawing with the current tool at a world point.
    pub fn begin_draw(&mut self, world: Point) {
        let Some(kind) = self.tools.current_tool.primitive_kind() else {
            return;
        };
        let snap = self.find_snap(world, None);
        let start = snap.point;
        self.snap = Some(snap);
        let preview = Primitive::new(kind, start, start);
        log::debug!("Begin drawing {} at {:?}", kind.name(), start);
        self.tools.state = ToolState::Drawing { preview };
    }

    /// Move the free end of the primitive being drawn.
    pub fn update_draw(&mut self, world: Point) {
        let ToolState::Drawing { preview } = &self.tools.state else {
            return;
        };
        let (id, anchor, fixed) = (preview.id(), preview.p1, preview.fixed_length());
        let snap = self.find_snap(world, Some(id));
        let point = Constraints::new(self.input.modifiers.shift, fixed).apply(anchor, snap.point);
        self.snap = Some(snap);
        if let ToolState::Drawing { preview } = &mut self.tools.state {
            preview.p2 = point;
        }
    }

    /// Finish drawing. Returns the new primitive's id, or `None` when the
    /// gesture was too short and was discarded.
    pub fn commit_draw(&mut self) -> Option<PrimitiveId> {
        self.snap = None;
        match self.tools.end() {
            ToolState::Drawing { preview } => self.commit_preview(preview),
            other => {
                self.tools.state = other;
                None
            }
        }
    }

    fn commit_preview(&mut self, preview: Primitive) -> Option<PrimitiveId> {
        if preview.length() <= self.config.min_segment_length {
            log::debug!("Discarding degenerate {} ({:.2}px)", preview.kind().name(), preview.length());
            self.persist();
            return None;
        }
        self.checkpoint();
        let id = self.document.add(preview);
        self.selection = Some(Selection { id, endpoint: None });
        log::debug!("Committed primitive {}", id);
        self.persist();
        Some(id)
    }

    // --- Endpoint drag ---

    /// Grab one endpoint of a primitive. Takes a checkpoint.
    pub fn begin_endpoint_drag(&mut self, id: PrimitiveId, endpoint: Endpoint) -> bool {
        if self.document.get(id).is_none() {
            return false;
        }
        self.checkpoint();
        self.selection = Some(Selection {
            id,
            endpoint: Some(endpoint),
        });
        self.tools.state = ToolState::DraggingEndpoint { id, endpoint };
        log::debug!("Dragging {:?} of {}", endpoint, id);
        true
    }

    /// Move the grabbed endpoint toward a world point, applying snap and constraints.
    pub fn update_endpoint_drag(&mut self, world: Point) {
        let ToolState::DraggingEndpoint { id, endpoint } = self.tools.state else {
            return;
        };
        let Some(primitive) = self.document.get(id) else {
            self.tools.cancel();
            return;
        };
        let anchor = primitive.endpoint(endpoint.other());
        let constraints = Constraints::new(self.input.modifiers.shift, primitive.fixed_length());

        let snap = self.find_snap(world, Some(id));
        let point = constraints.apply(anchor, snap.point);
        self.snap = Some(snap);
        if let Some(primitive) = self.document.get_mut(id) {
            primitive.set_endpoint(endpoint, point);
        }
    }

    // --- Segment move ---

    /// Grab a whole primitive at a world point. Takes a checkpoint.
    pub fn begin_move(&mut self, id: PrimitiveId, world: Point) -> bool {
        let Some(primitive) = self.document.get(id) else {
            return false;
        };
        let origin = (primitive.p1, primitive.p2);
        self.checkpoint();
        self.selection = Some(Selection { id, endpoint: None });
        self.tools.state = ToolState::MovingSegment {
            id,
            grab: world,
            origin,
        };
        true
    }

    /// Translate the grabbed primitive so the grab point follows `world`.
    pub fn update_move(&mut self, world: Point) {
        let ToolState::MovingSegment { id, grab, origin } = self.tools.state else {
            return;
        };
        let delta = world - grab;
        match self.document.get_mut(id) {
            Some(primitive) => {
                primitive.p1 = origin.0 + delta;
                primitive.p2 = origin.1 + delta;
            }
            None => self.tools.cancel(),
        }
    }

    // --- Editing commands ---

    /// Delete the selected primitive. Returns it, or `None` if nothing was selected.
    pub fn delete_selected(&mut self) -> Option<Primitive> {
        let id = self.selected_id()?;
        self.checkpoint();
        let removed = self.document.remove(id);
        self.selection = None;
        self.tools.cancel();
        log::debug!("Deleted primitive {}", id);
        self.persist();
        removed
    }

    /// Clear every primitive and the calibration.
    pub fn reset_workspace(&mut self) {
        self.checkpoint();
        self.document.clear();
        self.document.calibration.clear();
        self.selection = None;
        self.tools.cancel();
        log::info!("Workspace reset");
        self.persist();
    }

    /// Flip the selected door's swing. Returns `false` for non-doors.
    pub fn toggle_mirror(&mut self) -> Result<bool, SessionError> {
        let id = self.require_selected()?;
        if !self.document.get(id).is_some_and(|p| p.kind().same_variant(PrimitiveKind::DOOR)) {
            return Ok(false);
        }
        self.checkpoint();
        let toggled = self
            .document
            .get_mut(id)
            .is_some_and(|p| p.toggle_mirror());
        self.persist();
        Ok(toggled)
    }

    /// Turn the selected primitive's length lock on or off.
    pub fn set_length_locked(&mut self, locked: bool) -> Result<(), SessionError> {
        let id = self.require_selected()?;
        self.checkpoint();
        if let Some(p) = self.document.get_mut(id) {
            p.set_length_locked(locked);
        }
        self.persist();
        Ok(())
    }

    /// Set the selected primitive's length, given in the active unit.
    ///
    /// Requires calibration. `p1` and the direction are kept.
    pub fn set_length(&mut self, display_length: f64) -> Result<(), SessionError> {
        let id = self.require_selected()?;
        if !self.document.calibration.is_calibrated() {
            return Err(SessionError::Uncalibrated);
        }
        if !display_length.is_finite() || display_length <= 0.0 {
            return Err(SessionError::InvalidValue(display_length.to_string()));
        }
        let pixels = self.document.calibration.to_pixel_length(display_length);
        self.checkpoint();
        if let Some(p) = self.document.get_mut(id) {
            p.set_length(pixels);
        }
        self.persist();
        Ok(())
    }

    /// Place an endpoint of the selected primitive at exact world coordinates.
    ///
    /// A locked primitive keeps its length: the point is projected along
    /// the direction from the other endpoint.
    pub fn set_endpoint_position(&mut self, endpoint: Endpoint, point: Point) -> Result<(), SessionError> {
        let id = self.require_selected()?;
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(SessionError::InvalidValue(format!("{:?}", point)));
        }
        self.checkpoint();
        if let Some(p) = self.document.get_mut(id) {
            let anchor = p.endpoint(endpoint.other());
            let point = Constraints::new(false, p.fixed_length()).apply(anchor, point);
            p.set_endpoint(endpoint, point);
        }
        self.persist();
        Ok(())
    }

    // --- Calibration ---

    /// Calibrate against a reference of known length. Returns `false` on invalid input.
    pub fn calibrate(&mut self, reference_length: f64, pixel_distance: f64, unit: Unit) -> bool {
        let ok = self
            .document
            .calibration
            .calibrate(reference_length, pixel_distance, unit);
        if ok {
            self.persist();
        }
        ok
    }

    /// Calibrate so the last drawn primitive measures `reference_length` in the active unit.
    pub fn calibrate_from_last(&mut self, reference_length: f64) -> bool {
        let Some(pixels) = self.document.last().map(Primitive::length) else {
            log::warn!("Cannot calibrate: nothing drawn yet");
            return false;
        };
        let unit = self.document.calibration.active_unit;
        self.calibrate(reference_length, pixels, unit)
    }

    /// Change the display unit.
    pub fn set_unit(&mut self, unit: Unit) {
        self.document.calibration.set_active_unit(unit);
        self.persist();
    }

    /// Whether something is drawn but no scale has been set yet.
    pub fn needs_calibration(&self) -> bool {
        !self.document.is_empty() && !self.document.calibration.is_calibrated()
    }

    /// Live label for a primitive, such as `"W: 120.00cm"`.
    pub fn length_label(&self, primitive: &Primitive) -> Option<String> {
        self.document
            .calibration
            .format_length(primitive.length())
            .map(|len| format!("{}{}", primitive.kind().label_prefix(), len))
    }

    // --- History ---

    fn checkpoint(&mut self) {
        self.history.checkpoint(self.document.primitives().to_vec());
    }

    /// Undo the last change. Clears the selection.
    pub fn undo(&mut self) -> bool {
        let current = self.document.primitives().to_vec();
        match self.history.undo(current) {
            Some(snapshot) => {
                self.restore(snapshot);
                log::debug!("Undo");
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change. Clears the selection.
    pub fn redo(&mut self) -> bool {
        let current = self.document.primitives().to_vec();
        match self.history.redo(current) {
            Some(snapshot) => {
                self.restore(snapshot);
                log::debug!("Redo");
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Vec<Primitive>) {
        self.document.replace_primitives(snapshot);
        self.selection = None;
        self.tools.cancel();
        self.snap = None;
        self.persist();
    }

    // --- Import ---

    /// Replace the drawing and calibration with an imported project.
    ///
    /// Malformed input leaves the session untouched.
    pub fn import_document(&mut self, json: &str) -> Result<(), SessionError> {
        let imported = Document::import_json(json)?;
        self.checkpoint();
        self.document = imported;
        self.selection = None;
        self.tools.cancel();
        log::info!("Imported {} primitives", self.document.len());
        self.persist();
        Ok(())
    }

    /// Append walls from parametric commands, chained from the last primitive.
    ///
    /// Returns the number of walls added.
    pub fn apply_parametric(&mut self, text: &str) -> Result<usize, SessionError> {
        let start = self.document.last().map(|p| p.p2).unwrap_or(Point::ZERO);
        let segments = parametric::build_segments(text, start, &self.document.calibration)?;
        let count = segments.len();
        self.checkpoint();
        for segment in segments {
            self.document.add(segment);
        }
        log::info!("Parametric import added {} walls", count);
        self.persist();
        Ok(count)
    }

    // --- View ---

    /// Fit the view to the drawing.
    pub fn zoom_to_fit(&mut self, viewport: Size) {
        match self.document.export_bounds(0.0) {
            Some(bounds) => self.camera.fit_to_bounds(bounds, viewport, EXPORT_PADDING),
            None => self.camera.reset(),
        }
    }

    /// Visible world area for a viewport.
    pub fn visible_world(&self, viewport: Size) -> Rect {
        Rect::from_points(
            self.camera.screen_to_world(Point::ZERO),
            self.camera
                .screen_to_world(Point::new(viewport.width, viewport.height)),
        )
    }

    // --- Persistence ---

    fn find_snap(&self, world: Point, exclude: Option<PrimitiveId>) -> SnapResult {
        snap::find_snap_with(
            self.document.primitives(),
            world,
            exclude,
            self.camera.zoom,
            self.config.snap_distance,
        )
    }

    /// Write the document to the attached store. Failures are logged.
    fn persist(&mut self) {
        if let Some(autosave) = &mut self.autosave {
            if let Err(e) = autosave.save(&self.document) {
                log::error!("Auto-save failed: {}", e);
            }
        }
    }

    /// Load the auto-saved document, if any. Returns `true` when one was restored.
    pub fn restore_from_store(&mut self) -> Result<bool, SessionError> {
        let Some(autosave) = &self.autosave else {
            return Ok(false);
        };
        match autosave.load()? {
            Some(document) => {
                log::info!("Restored session with {} primitives", document.len());
                self.document = document;
                self.history.clear();
                self.selection = None;
                self.tools.cancel();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
