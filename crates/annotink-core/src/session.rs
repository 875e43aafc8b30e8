//! Annotation session: the root that owns the scene and everything around it.
//!
//! Gestures flow in through [`AnnotationSession::handle_pointer`],
//! [`AnnotationSession::handle_key`] and
//! [`AnnotationSession::handle_scene_event`]. The active tool mutates the
//! scene and the session applies its [`ToolResponse`] (history capture and
//! falling back to the select tool). Hosts observe state through
//! [`AnnotationSession::view`].

use crate::Instant;
use crate::config::SessionConfig;
use crate::debounce::Debouncer;
use crate::export::{self, ExportError, ExportFormat, ExportOptions, ExportOutput};
use crate::history::{History, HistoryError, Transition};
use crate::input::{Key, KeyEvent, MouseButton, PointerEvent};
use crate::scene::{BackgroundImage, BackgroundRef, Scene, SceneEvent};
use crate::shapes::{SerializableColor, Shape, ShapeId};
use crate::source::{
    BlobStore, DecodeGeneration, DecodeTicket, DecodedImage, ImageDecoder, ImageSource,
    ResolvedSource, SourceError,
};
use crate::style::{LineKind, ShapeKind, StrokeStyle, StyleSettings};
use crate::tools::{ToolController, ToolKind, ToolResponse};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No image loaded")]
    NoScene,
    #[error("History error: {0}")]
    History(#[from] HistoryError),
    #[error("Image source error: {0}")]
    Source(#[from] SourceError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// A background that must be decoded again after an undo or redo.
///
/// Hand the decode result to [`AnnotationSession::apply_background`]. It is
/// ignored if another restore, image load or teardown happened meanwhile.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundRequest {
    pub reference: BackgroundRef,
    ticket: DecodeTicket,
}

impl BackgroundRequest {
    pub fn src(&self) -> &str {
        &self.reference.src
    }
}

/// Read-only state for the toolbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub tool: ToolKind,
    pub style: StyleSettings,
    pub can_undo: bool,
    pub can_redo: bool,
    pub has_selection: bool,
    pub is_editing_text: bool,
    /// The scene matches the current history state, background included.
    pub is_consistent: bool,
}

/// One annotation session over a single background image.
#[derive(Debug)]
pub struct AnnotationSession<S: Scene> {
    config: SessionConfig,
    scene: Option<S>,
    tool: ToolKind,
    style: StyleSettings,
    controller: ToolController,
    history: History,
    has_selection: bool,
    crop_updates: Debouncer<ShapeId>,
    generation: DecodeGeneration,
    blobs: BlobStore,
    source: Option<ResolvedSource>,
}

impl<S: Scene> AnnotationSession<S> {
    /// Session without a scene; call [`Self::load_image`] to start drawing.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            style: config.style.clone(),
            crop_updates: Debouncer::new(config.crop_debounce()),
            config,
            scene: None,
            tool: ToolKind::Select,
            controller: ToolController::new(),
            history: History::new(),
            has_selection: false,
            generation: DecodeGeneration::new(),
            blobs: BlobStore::new(),
            source: None,
        }
    }

    /// Session over a scene the host has already prepared.
    pub fn with_scene(config: SessionConfig, scene: S) -> Self {
        let mut session = Self::new(config);
        session.install_scene(scene);
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    /// Mutable scene access for hosts forwarding engine-side changes.
    pub fn scene_mut(&mut self) -> Option<&mut S> {
        self.scene.as_mut()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Blob registry backing `blob:` sources. Share it with the decoder.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Decode `source`, fit it into `viewport` and make `scene` the drawing
    /// surface. The previous scene, history and blob handle are dropped.
    pub async fn load_image<D: ImageDecoder + ?Sized>(
        &mut self,
        mut scene: S,
        source: ImageSource,
        viewport: Size,
        decoder: &D,
    ) -> SessionResult<()> {
        let resolved = self.blobs.resolve(source);

        let decoded = match decoder.decode(&resolved.url).await {
            Ok(decoded) => decoded,
            Err(err) => {
                log::error!("Failed to load image: {err}");
                if resolved.is_blob {
                    self.blobs.revoke(&resolved.url);
                }
                return Err(err.into());
            }
        };

        let background =
            BackgroundImage::fit(decoded.url, decoded.width, decoded.height, viewport);
        log::info!(
            "Loaded {}x{} image at scale {:.3}",
            background.width,
            background.height,
            background.scale_x
        );
        scene.clear();
        scene.set_size(background.display_size());
        scene.set_background(Some(background));

        self.generation.bump();
        self.release_scene();
        self.source = Some(resolved);
        self.install_scene(scene);
        Ok(())
    }

    fn install_scene(&mut self, scene: S) {
        self.scene = Some(scene);
        self.history.reset();
        self.crop_updates.clear();
        self.has_selection = false;
        self.reactivate();
        if self.history.current().is_none() {
            self.save_state();
        }
    }

    /// Detach the tool from the current scene and drop it with its history.
    fn release_scene(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            self.controller.teardown(&mut scene);
        }
        self.history.reset();
        self.crop_updates.clear();
        self.has_selection = false;
        if let Some(previous) = self.source.take().filter(|s| s.is_blob) {
            self.blobs.revoke(&previous.url);
        }
    }

    /// Drop the scene and every resource tied to it.
    pub fn teardown(&mut self) {
        self.generation.bump();
        self.release_scene();
        log::debug!("Session torn down");
    }

    // --- Tools and style ---

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools. Disabled tools are ignored.
    pub fn set_tool(&mut self, kind: ToolKind) {
        if !self.config.is_enabled(kind) {
            log::warn!("Tool {} is not enabled", kind.display_name());
            return;
        }
        if kind == self.tool {
            return;
        }
        self.tool = kind;
        self.reactivate();
    }

    pub fn style(&self) -> &StyleSettings {
        &self.style
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.update_style(|s| s.color = color);
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        if !width.is_finite() || width <= 0.0 {
            return;
        }
        self.update_style(|s| s.stroke_width = width);
    }

    pub fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.update_style(|s| s.stroke_style = style);
    }

    pub fn set_shape_fill(&mut self, fill: bool) {
        self.update_style(|s| s.shape_fill = fill);
    }

    pub fn set_shape_kind(&mut self, kind: ShapeKind) {
        self.update_style(|s| s.shape_kind = kind);
    }

    pub fn set_line_kind(&mut self, kind: LineKind) {
        self.update_style(|s| s.line_kind = kind);
    }

    fn update_style(&mut self, f: impl FnOnce(&mut StyleSettings)) {
        let mut next = self.style.clone();
        f(&mut next);
        if next != self.style {
            self.style = next;
            self.reactivate();
        }
    }

    /// Rebuild the active tool from the current kind and style.
    fn reactivate(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let response = self
            .controller
            .activate(self.tool, &self.style, &self.config, scene);
        self.apply_response(response);
    }

    fn apply_response(&mut self, response: ToolResponse) {
        if response.save_state {
            self.save_state();
        }
        if response.switch_to_select && self.tool != ToolKind::Select {
            self.tool = ToolKind::Select;
            self.reactivate();
        }
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        if let Some(scene) = &self.scene {
            self.has_selection = !scene.selection().is_empty();
        }
    }

    fn save_state(&mut self) {
        if let Some(scene) = &self.scene {
            self.history.save_state(scene);
        }
    }

    // --- Input ---

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position: Some(point),
                button: MouseButton::Left,
            } => self.pointer_down(point),
            PointerEvent::Move {
                position: Some(point),
            } => self.pointer_move(point),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => self.pointer_up(),
            _ => {}
        }
    }

    pub fn pointer_down(&mut self, point: Point) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let response = self.controller.pointer_down(scene, point);
        self.apply_response(response);
    }

    pub fn pointer_move(&mut self, point: Point) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let response = self.controller.pointer_move(scene, point);
        self.apply_response(response);
    }

    pub fn pointer_up(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let response = self.controller.pointer_up(scene);
        self.apply_response(response);
    }

    /// Returns true if the key was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let KeyEvent::Pressed(key) = event else {
            return false;
        };
        if self.is_editing_text() {
            return false;
        }
        match key {
            key if key.is_delete() => self.delete_selected(),
            Key::Escape => {
                if let Some(scene) = self.scene.as_mut() {
                    self.controller.cancel(scene);
                }
                true
            }
            _ => false,
        }
    }

    /// React to an event raised by the scene.
    pub fn handle_scene_event(&mut self, event: SceneEvent, now: Instant) {
        match event {
            SceneEvent::SelectionChanged(ids) => self.has_selection = !ids.is_empty(),
            SceneEvent::ObjectMoving(id) | SceneEvent::ObjectScaling(id) => {
                if self.is_region(id) {
                    self.crop_updates.schedule(id, now);
                }
            }
            SceneEvent::ObjectModified(id) => {
                if self.is_region(id) {
                    self.crop_updates.flush(&id);
                    self.update_crop(id);
                }
                self.save_state();
            }
            SceneEvent::PathCreated(id) => {
                log::debug!("Stroke {id} finished");
                self.save_state();
            }
            SceneEvent::TextEditingExited(id) => {
                let Some(scene) = self.scene.as_mut() else {
                    return;
                };
                let response = self.controller.text_editing_exited(scene, id);
                self.apply_response(response);
            }
        }
    }

    /// Run debounced crop updates that are due. Returns how many ran.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.crop_updates
            .due(now)
            .into_iter()
            .filter(|id| self.update_crop(*id))
            .count()
    }

    /// Run every pending crop update immediately.
    pub fn flush_crop_updates(&mut self) -> usize {
        self.crop_updates
            .flush_now()
            .into_iter()
            .filter(|id| self.update_crop(*id))
            .count()
    }

    pub fn has_pending_crop_updates(&self) -> bool {
        !self.crop_updates.is_empty()
    }

    fn is_region(&self, id: ShapeId) -> bool {
        self.scene
            .as_ref()
            .and_then(|scene| scene.object(id))
            .is_some_and(Shape::is_region)
    }

    fn update_crop(&mut self, id: ShapeId) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        let Some((bsx, bsy)) = scene.background().map(|bg| (bg.scale_x, bg.scale_y)) else {
            log::warn!("No background, skipping crop update for {id}");
            return false;
        };
        let Some(region) = scene.object_mut(id).and_then(Shape::as_region_mut) else {
            return false;
        };
        let updated = region.update_crop(bsx, bsy);
        if updated {
            scene.request_render();
        }
        updated
    }

    // --- Editing ---

    /// Remove the selected objects. Returns false when nothing was selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        let selected = scene.selection().to_vec();
        if selected.is_empty() {
            return false;
        }
        for id in &selected {
            scene.remove_object(*id);
            self.crop_updates.flush(id);
        }
        scene.discard_active_object();
        scene.request_render();
        log::debug!("Deleted {} object(s)", selected.len());
        self.has_selection = false;
        self.save_state();
        true
    }

    /// Step back one history state.
    ///
    /// Returns the background to decode when the restored state has one.
    pub fn undo(&mut self) -> SessionResult<Option<BackgroundRequest>> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(None);
        };
        self.controller.cancel(scene);
        let transition = self.history.undo(scene)?;
        Ok(self.after_restore(transition))
    }

    /// Re-apply the last undone state.
    pub fn redo(&mut self) -> SessionResult<Option<BackgroundRequest>> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(None);
        };
        self.controller.cancel(scene);
        let transition = self.history.redo(scene)?;
        Ok(self.after_restore(transition))
    }

    fn after_restore(&mut self, transition: Transition) -> Option<BackgroundRequest> {
        let Transition::Restored { background } = transition else {
            return None;
        };
        let ticket = self.generation.bump();
        self.crop_updates.clear();
        self.has_selection = false;
        if let Some(scene) = self.scene.as_mut() {
            self.controller.apply_interaction(scene);
        }
        background.map(|reference| BackgroundRequest { reference, ticket })
    }

    /// Install a decoded background for a restore.
    ///
    /// Returns `Ok(false)` when the request is stale and was dropped.
    pub fn apply_background(
        &mut self,
        request: BackgroundRequest,
        result: Result<DecodedImage, SourceError>,
    ) -> SessionResult<bool> {
        if !self.generation.is_current(request.ticket) {
            log::debug!("Discarding stale background decode of {}", request.src());
            return Ok(false);
        }
        let Some(scene) = self.scene.as_mut() else {
            return Ok(false);
        };
        let decoded = result.inspect_err(|err| {
            log::error!("Failed to restore background: {err}");
        })?;
        let BackgroundRef {
            src,
            scale_x,
            scale_y,
        } = request.reference;
        scene.set_background(Some(BackgroundImage {
            src,
            width: decoded.width,
            height: decoded.height,
            scale_x,
            scale_y,
        }));
        scene.request_render();
        Ok(true)
    }

    /// Undo and wait for the background to be restored.
    pub async fn undo_and_wait<D: ImageDecoder + ?Sized>(&mut self, decoder: &D) -> SessionResult<()> {
        if let Some(request) = self.undo()? {
            self.restore_background(request, decoder).await?;
        }
        Ok(())
    }

    /// Redo and wait for the background to be restored.
    pub async fn redo_and_wait<D: ImageDecoder + ?Sized>(&mut self, decoder: &D) -> SessionResult<()> {
        if let Some(request) = self.redo()? {
            self.restore_background(request, decoder).await?;
        }
        Ok(())
    }

    async fn restore_background<D: ImageDecoder + ?Sized>(
        &mut self,
        request: BackgroundRequest,
        decoder: &D,
    ) -> SessionResult<bool> {
        let result = decoder.decode(request.src()).await;
        self.apply_background(request, result)
    }

    // --- Export ---

    /// Default export options from the session config.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::with_quality(self.config.raster_quality)
    }

    pub fn export_scene(
        &mut self,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> SessionResult<ExportOutput> {
        let Some(scene) = self.scene.as_mut() else {
            return Err(ExportError::NoScene.into());
        };
        export::export_scene(scene, format, options).map_err(|err| {
            log::error!("Export failed: {err}");
            err.into()
        })
    }

    /// Raster data URI of the scene. Vector requests fall back to PNG.
    pub fn data_url(&mut self, format: ExportFormat, options: &ExportOptions) -> SessionResult<String> {
        let format = match format {
            ExportFormat::Svg => ExportFormat::Png,
            raster => raster,
        };
        Ok(self.export_scene(format, options)?.data)
    }

    // --- Observation ---

    pub fn is_editing_text(&self) -> bool {
        self.scene
            .as_ref()
            .is_some_and(|scene| scene.editing_text().is_some())
    }

    /// Whether the scene's background matches the current history state.
    ///
    /// False between an undo/redo and the arrival of its background decode.
    pub fn is_consistent(&self) -> bool {
        let Some(scene) = &self.scene else {
            return true;
        };
        let expected = self.history.current().and_then(|s| s.background());
        let actual = scene.background().map(BackgroundImage::to_ref);
        expected == actual.as_ref()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            tool: self.tool,
            style: self.style.clone(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            has_selection: self.has_selection,
            is_editing_text: self.is_editing_text(),
            is_consistent: self.is_consistent(),
        }
    }
}
