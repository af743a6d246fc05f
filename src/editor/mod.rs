//! The editor session: one scene, its history, the viewport and the active tool.
//!
//! Front ends feed device-space input events in and call [`Editor::render`]
//! whenever [`Editor::needs_redraw`] is set. Everything runs on the caller's
//! thread; each event is fully handled before the call returns.

mod properties;
#[cfg(test)]
mod tests;

pub use properties::{Mixed, SelectionStyle, StyleChange};

use crate::capture::{CapturedImage, ExportStatus};
use crate::config::{Action, Config, KeyBinding, KeybindingsConfig};
use crate::draw::render::{render_selection, render_view};
use crate::draw::{self, Color, Raster, RenderError};
use crate::geometry::{self, Point, Rect};
use crate::history::{Command, History};
use crate::input::{
    EditorSettings, Key, Modifiers, MouseButton, PreviewContext, Tool, ToolContext,
    ToolDefaults, ToolKind,
};
use crate::scene::{AnnotationId, AnnotationKind, Scene};
use crate::viewport::Viewport;
use cairo::{Context, ImageSurface};
use log::{debug, info, warn};
use std::collections::HashMap;

const THICKNESS_STEP: f64 = 1.0;
const THICKNESS_RANGE: (f64, f64) = (1.0, 40.0);
const FONT_SIZE_STEP: f64 = 2.0;
const FONT_SIZE_RANGE: (f64, f64) = (8.0, 96.0);

/// Z-order adjustments for the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    ToFront,
    ToBack,
    Forward,
    Backward,
}

/// One open editing session over a captured image.
pub struct Editor {
    scene: Scene,
    history: History,
    viewport: Viewport,
    tool: Tool,
    defaults: ToolDefaults,
    settings: EditorSettings,
    modifiers: Modifiers,
    action_map: HashMap<KeyBinding, Action>,
    origin: (i32, i32),
    export_status: ExportStatus,
    sampled: Option<Color>,
    /// Left button held over the canvas
    pointer_down: bool,
    /// Last screen position of a middle-button pan
    pan_anchor: Option<Point>,
    /// Native-resolution composite and the scene revision it was built from
    composite: Option<(u64, ImageSurface)>,
    /// Whether the display needs to be redrawn
    pub needs_redraw: bool,
}

impl Editor {
    /// Opens a session over `capture` with settings taken from `config`.
    ///
    /// Invalid keybindings are reported and replaced by the defaults.
    pub fn new(capture: CapturedImage, config: &Config) -> Self {
        let settings = EditorSettings::from_config(config);
        let action_map = match config.keybindings.build_action_map() {
            Ok(map) => map,
            Err(err) => {
                warn!("Invalid keybindings ({}), using defaults", err);
                KeybindingsConfig::default()
                    .build_action_map()
                    .unwrap_or_default()
            }
        };
        info!(
            "Editor session opened on {}x{} capture at {:?}",
            capture.width(),
            capture.height(),
            capture.origin
        );

        Self {
            scene: Scene::new(capture.raster),
            history: History::new(settings.history_limit),
            viewport: Viewport::new(settings.min_zoom, settings.max_zoom, settings.zoom_step),
            tool: Tool::new(ToolKind::Select),
            defaults: ToolDefaults::from_config(config),
            settings,
            modifiers: Modifiers::new(),
            action_map,
            origin: capture.origin,
            export_status: ExportStatus::Idle,
            sampled: None,
            pointer_down: false,
            pan_anchor: None,
            composite: None,
            needs_redraw: true,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn defaults(&self) -> &ToolDefaults {
        &self.defaults
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Screen position of the captured region.
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn export_status(&self) -> &ExportStatus {
        &self.export_status
    }

    /// Color picked by the most recent eyedropper click, if it hit the image.
    pub fn sampled_color(&self) -> Option<Color> {
        self.sampled
    }

    /// Runs `f` against the active tool with a context over this session.
    fn with_tool<R>(&mut self, f: impl FnOnce(&mut Tool, &mut ToolContext) -> R) -> R {
        let mut ctx = ToolContext {
            scene: &mut self.scene,
            history: &mut self.history,
            defaults: &mut self.defaults,
            settings: &self.settings,
            modifiers: self.modifiers,
            zoom: self.viewport.zoom(),
        };
        f(&mut self.tool, &mut ctx)
    }

    // ------------------------------------------------------------------------
    // Pointer input (device pixels)
    // ------------------------------------------------------------------------

    /// Processes a mouse button press.
    ///
    /// - Left: drives the active tool
    /// - Right: cancels the current gesture, same as Escape
    /// - Middle: starts panning
    pub fn on_pointer_press(&mut self, button: MouseButton, x: f64, y: f64) {
        let Some(screen) = checked_point(x, y) else {
            return;
        };
        match button {
            MouseButton::Left => {
                let p = self.viewport.to_image_space(screen);
                self.pointer_down = true;
                if self.with_tool(|tool, ctx| tool.on_pointer_down(ctx, p)) {
                    self.needs_redraw = true;
                }
                if self.tool.kind() == ToolKind::Eyedropper {
                    self.sampled = self.tool.sampled_color();
                }
            }
            MouseButton::Right => {
                self.pointer_down = false;
                self.cancel();
            }
            MouseButton::Middle => {
                self.pan_anchor = Some(screen);
            }
        }
    }

    /// Processes pointer motion. Without a held button nothing happens.
    pub fn on_pointer_motion(&mut self, x: f64, y: f64) {
        let Some(screen) = checked_point(x, y) else {
            return;
        };
        if let Some(anchor) = self.pan_anchor {
            self.viewport.pan(screen - anchor);
            self.pan_anchor = Some(screen);
            self.needs_redraw = true;
            return;
        }
        if !self.pointer_down {
            return;
        }
        let p = self.viewport.to_image_space(screen);
        if self.with_tool(|tool, ctx| tool.on_pointer_move(ctx, p)) {
            self.needs_redraw = true;
        }
    }

    pub fn on_pointer_release(&mut self, button: MouseButton, x: f64, y: f64) {
        let Some(screen) = checked_point(x, y) else {
            return;
        };
        match button {
            MouseButton::Left => {
                if !self.pointer_down {
                    return;
                }
                self.pointer_down = false;
                let p = self.viewport.to_image_space(screen);
                if self.with_tool(|tool, ctx| tool.on_pointer_up(ctx, p)) {
                    self.needs_redraw = true;
                }
            }
            MouseButton::Middle => self.pan_anchor = None,
            MouseButton::Right => {}
        }
    }

    /// Zooms about the cursor; positive `steps` zoom in.
    pub fn on_scroll(&mut self, x: f64, y: f64, steps: f64) {
        let Some(screen) = checked_point(x, y) else {
            return;
        };
        let factor = self.settings.zoom_step.powf(steps);
        if self.viewport.zoom_at(screen, factor) {
            self.needs_redraw = true;
        }
    }

    // ------------------------------------------------------------------------
    // Keyboard input
    // ------------------------------------------------------------------------

    /// Processes a key press.
    ///
    /// Modifier keys only update the modifier state. While text is being
    /// edited, plain characters go to the text and only command chords, Escape
    /// and Return are checked against the keybindings.
    pub fn on_key_press(&mut self, key: Key) {
        if self.modifiers.update(key, true) {
            return;
        }

        if self.tool.is_text_editing() {
            let should_check_actions =
                matches!(key, Key::Escape | Key::Return) || self.modifiers.has_command();
            if should_check_actions {
                if let Some(action) = self.find_action(key) {
                    self.handle_action(action);
                    return;
                }
            }
            if self.with_tool(|tool, ctx| tool.on_key_press(ctx, key)) {
                self.needs_redraw = true;
            }
            return;
        }

        if let Some(action) = self.find_action(key) {
            self.handle_action(action);
        }
    }

    pub fn on_key_release(&mut self, key: Key) {
        self.modifiers.update(key, false);
    }

    /// Look up an action for the given key and the held modifiers.
    fn find_action(&self, key: Key) -> Option<Action> {
        let name = key.binding_name()?;
        self.action_map
            .iter()
            .find(|(binding, _)| {
                binding.matches(
                    &name,
                    self.modifiers.ctrl,
                    self.modifiers.shift,
                    self.modifiers.alt,
                )
            })
            .map(|(_, action)| *action)
    }

    /// Runs a keybinding action.
    pub fn handle_action(&mut self, action: Action) {
        debug!("Action {:?}", action);
        match action {
            Action::Cancel => self.cancel(),
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::DeleteSelection => {
                self.delete_selection();
            }
            Action::SelectAll => self.select_all(),
            Action::SelectTool => self.set_tool(ToolKind::Select),
            Action::RectangleTool => self.set_tool(ToolKind::Rectangle),
            Action::EllipseTool => self.set_tool(ToolKind::Ellipse),
            Action::ArrowTool => self.set_tool(ToolKind::Arrow),
            Action::FreehandTool => self.set_tool(ToolKind::Freehand),
            Action::HighlighterTool => self.set_tool(ToolKind::Highlighter),
            Action::TextTool => self.set_tool(ToolKind::Text),
            Action::SpotlightTool => self.set_tool(ToolKind::Spotlight),
            Action::BlurTool => self.set_tool(ToolKind::Blur),
            Action::StepTool => self.set_tool(ToolKind::StepCounter),
            Action::EraserTool => self.set_tool(ToolKind::Eraser),
            Action::EyedropperTool => self.set_tool(ToolKind::Eyedropper),
            Action::RulerTool => self.set_tool(ToolKind::Ruler),
            Action::CropToSelection => {
                self.crop_to_marquee();
            }
            Action::ZoomIn => self.zoom_in(),
            Action::ZoomOut => self.zoom_out(),
            Action::ResetZoom => self.reset_zoom(),
            Action::FitToWindow => self.fit_to_window(),
            Action::BringToFront => {
                self.reorder_selection(ZOrder::ToFront);
            }
            Action::SendToBack => {
                self.reorder_selection(ZOrder::ToBack);
            }
            Action::BringForward => {
                self.reorder_selection(ZOrder::Forward);
            }
            Action::SendBackward => {
                self.reorder_selection(ZOrder::Backward);
            }
            Action::IncreaseThickness => self.adjust_thickness(THICKNESS_STEP),
            Action::DecreaseThickness => self.adjust_thickness(-THICKNESS_STEP),
            Action::IncreaseFontSize => self.adjust_font_size(FONT_SIZE_STEP),
            Action::DecreaseFontSize => self.adjust_font_size(-FONT_SIZE_STEP),
        }
    }

    // ------------------------------------------------------------------------
    // Editing operations
    // ------------------------------------------------------------------------

    /// Switches tools. The previous tool's gesture is discarded (a text edit
    /// is finished as on focus loss).
    pub fn set_tool(&mut self, kind: ToolKind) {
        if self.tool.kind() == kind {
            return;
        }
        if self.with_tool(|tool, ctx| tool.deactivate(ctx)) {
            self.needs_redraw = true;
        }
        self.pointer_down = false;
        self.tool = Tool::new(kind);
        debug!("Tool switched to {}", kind);
        self.needs_redraw = true;
    }

    /// Aborts the active gesture; with nothing to abort, clears the selection.
    pub fn cancel(&mut self) {
        if self.with_tool(|tool, ctx| tool.cancel(ctx)) {
            self.needs_redraw = true;
        } else if !self.scene.selection().is_empty() {
            self.scene.clear_selection();
            self.needs_redraw = true;
        }
    }

    /// Ends whatever the active tool is doing before history is replayed.
    fn settle_tool(&mut self) {
        self.pointer_down = false;
        if self.with_tool(|tool, ctx| tool.deactivate(ctx)) {
            self.needs_redraw = true;
        }
    }

    /// Ends a gesture that owns the top history entry so a command recorded
    /// next lands above it instead of being amended away.
    fn commit_tool(&mut self) {
        if self.with_tool(|tool, ctx| tool.commit(ctx)) {
            self.needs_redraw = true;
        }
    }

    pub fn undo(&mut self) -> bool {
        self.settle_tool();
        let size = self.image_size();
        let undone = self.history.undo(&mut self.scene);
        if undone {
            self.refit_if_resized(size);
            self.needs_redraw = true;
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.settle_tool();
        let size = self.image_size();
        let redone = self.history.redo(&mut self.scene);
        if redone {
            self.refit_if_resized(size);
            self.needs_redraw = true;
        }
        redone
    }

    fn image_size(&self) -> (u32, u32) {
        (self.scene.base().width(), self.scene.base().height())
    }

    /// Crops undone or redone change the image size; keep it in view.
    fn refit_if_resized(&mut self, before: (u32, u32)) {
        if self.image_size() != before {
            self.fit_to_window();
        }
    }

    /// Removes every selected annotation as one undoable step.
    pub fn delete_selection(&mut self) -> bool {
        self.commit_tool();
        let ids: Vec<AnnotationId> = self.scene.selection().iter().copied().collect();
        let Some(command) = Command::remove_many(&self.scene, &ids) else {
            return false;
        };
        let removed = self.history.execute(&mut self.scene, command);
        if removed {
            debug!("Deleted {} annotation(s)", ids.len());
            self.needs_redraw = true;
        }
        removed
    }

    pub fn select_all(&mut self) {
        self.scene.select_all();
        self.needs_redraw = true;
    }

    /// Adds an annotation of `kind` with the current tool defaults, on top.
    pub fn add_annotation(&mut self, kind: AnnotationKind) -> Option<AnnotationId> {
        self.commit_tool();
        let style = match kind {
            AnnotationKind::Highlighter { .. } => self.defaults.highlighter.clone(),
            AnnotationKind::StepCounter { .. } => self.defaults.step_style(),
            _ => self.defaults.style.clone(),
        };
        let annotation = self.scene.allocate(kind, style);
        let id = annotation.id;
        let index = self.scene.len();
        if !self
            .history
            .execute(&mut self.scene, Command::Add { annotation, index })
        {
            return None;
        }
        self.needs_redraw = true;
        Some(id)
    }

    /// Changes the z-order of the selection as one undoable step.
    pub fn reorder_selection(&mut self, direction: ZOrder) -> bool {
        self.commit_tool();
        let mut order: Vec<AnnotationId> = self.scene.iter().map(|a| a.id).collect();
        let mut selected: Vec<AnnotationId> = self.scene.selected().map(|a| a.id).collect();
        if selected.is_empty() {
            return false;
        }
        // Back and forward moves start from the topmost selected annotation
        // so the selection keeps its relative order.
        if matches!(direction, ZOrder::ToBack | ZOrder::Forward) {
            selected.reverse();
        }

        let top = order.len() - 1;
        let mut commands = Vec::new();
        for (done, id) in selected.into_iter().enumerate() {
            let Some(from) = order.iter().position(|o| *o == id) else {
                continue;
            };
            let to = match direction {
                ZOrder::ToFront => top,
                ZOrder::ToBack => 0,
                ZOrder::Forward => (from + 1).min(top - done),
                ZOrder::Backward => from.saturating_sub(1).max(done),
            };
            if to == from {
                continue;
            }
            order.remove(from);
            order.insert(to, id);
            commands.push(Command::Reorder { id, from, to });
        }

        let command = match commands.len() {
            0 => return false,
            1 => commands.remove(0),
            _ => Command::Batch(commands),
        };
        let reordered = self.history.execute(&mut self.scene, command);
        if reordered {
            self.needs_redraw = true;
        }
        reordered
    }

    /// Merged style of the selection, `None` when nothing is selected.
    pub fn selection_style(&self) -> Option<SelectionStyle> {
        SelectionStyle::merge(self.scene.selected().map(|a| &a.style))
    }

    /// Applies `change` to every selected annotation as one modify step.
    ///
    /// With an empty selection the change goes to the tool defaults instead and
    /// nothing is recorded.
    pub fn apply_style(&mut self, change: StyleChange) -> bool {
        if change.is_empty() {
            return false;
        }
        self.commit_tool();
        if self.scene.selection().is_empty() {
            self.defaults.style = change.applied_to(&self.defaults.style);
            return true;
        }

        let mut commands: Vec<Command> = self
            .scene
            .selected()
            .filter_map(|before| {
                let style = change.applied_to(&before.style);
                (style != before.style).then(|| {
                    let mut after = before.clone();
                    after.style = style;
                    Command::Modify {
                        before: before.clone(),
                        after,
                    }
                })
            })
            .collect();
        let command = match commands.len() {
            0 => return false,
            1 => commands.remove(0),
            _ => Command::Batch(commands),
        };
        let applied = self.history.execute(&mut self.scene, command);
        if applied {
            self.needs_redraw = true;
        }
        applied
    }

    /// Steps the stroke width of new annotations and of the selection.
    pub fn adjust_thickness(&mut self, delta: f64) {
        self.commit_tool();
        let (min, max) = THICKNESS_RANGE;
        let width = (self.defaults.style.width + delta).clamp(min, max);
        self.defaults.style.width = width;
        debug!("Thickness adjusted to {:.1}px", width);
        if !self.scene.selection().is_empty() {
            self.apply_style(StyleChange {
                width: Some(width),
                ..StyleChange::default()
            });
        }
        self.needs_redraw = true;
    }

    /// Steps the font size of new text and of the selection.
    pub fn adjust_font_size(&mut self, delta: f64) {
        self.commit_tool();
        let (min, max) = FONT_SIZE_RANGE;
        let size = (self.defaults.style.font_size + delta).clamp(min, max);
        self.defaults.style.font_size = size;
        debug!("Font size adjusted to {:.1}px", size);
        if !self.scene.selection().is_empty() {
            self.apply_style(StyleChange {
                font_size: Some(size),
                ..StyleChange::default()
            });
        }
        self.needs_redraw = true;
    }

    /// Crops the image to `region` (image space) as one undoable step.
    ///
    /// Annotations keep their place on the image: they move with the new
    /// origin. The view is refitted to the smaller image.
    pub fn crop_to(&mut self, region: Rect) -> bool {
        self.commit_tool();
        let Some(command) = Command::crop(&self.scene, &region) else {
            debug!("Crop region {:?} leaves the image unchanged", region);
            return false;
        };
        if !self.history.execute(&mut self.scene, command) {
            return false;
        }
        let (w, h) = self.image_size();
        info!("Cropped image to {}x{}", w, h);
        self.fit_to_window();
        true
    }

    /// Crops to the select tool's last marquee.
    pub fn crop_to_marquee(&mut self) -> bool {
        match self.tool.crop_region() {
            Some(region) => self.crop_to(region),
            None => {
                debug!("No marquee to crop to");
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------------

    /// Tells the editor how large the drawable area is (screen pixels).
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.set_viewport_size(width, height);
        self.needs_redraw = true;
    }

    pub fn zoom_in(&mut self) {
        if self.viewport.zoom_in() {
            self.needs_redraw = true;
        }
    }

    pub fn zoom_out(&mut self) {
        if self.viewport.zoom_out() {
            self.needs_redraw = true;
        }
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_view();
        self.needs_redraw = true;
    }

    pub fn fit_to_window(&mut self) {
        let base = self.scene.base();
        let (w, h) = (base.width() as f64, base.height() as f64);
        self.viewport.fit_to_image(w, h);
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Draws the live view into `ctx`, a `width` x `height` screen surface.
    ///
    /// Order: background, composite (base + annotations), selection overlay,
    /// then the active tool's preview on top.
    pub fn render(&mut self, ctx: &Context, width: f64, height: f64) -> Result<(), RenderError> {
        self.viewport.set_viewport_size(width, height);
        let revision = self.scene.revision();
        let stale = self
            .composite
            .as_ref()
            .is_none_or(|(built, _)| *built != revision);
        if stale {
            self.composite = Some((revision, draw::compose(&self.scene)?));
        }
        let Some((_, composite)) = &self.composite else {
            return Ok(());
        };

        let zoom = self.viewport.zoom();
        ctx.save()?;
        render_view(
            ctx,
            composite,
            zoom,
            self.viewport.pan_offset(),
            width,
            height,
        )?;
        render_selection(ctx, &self.scene, zoom, self.settings.handle_size);
        let preview = PreviewContext {
            scene: &self.scene,
            defaults: &self.defaults,
            zoom,
            image_bounds: self.scene.image_bounds(),
        };
        self.tool.render_preview(ctx, &preview);
        ctx.restore()?;

        self.needs_redraw = false;
        Ok(())
    }

    /// Base image plus every annotation at native resolution.
    pub fn flatten(&self) -> Result<Raster, RenderError> {
        draw::flatten(&self.scene)
    }

    /// Flattens the scene for an export writer and marks the export pending.
    pub fn begin_export(&mut self) -> Result<Raster, RenderError> {
        match self.flatten() {
            Ok(raster) => {
                info!(
                    "Export started ({}x{}, {} annotations)",
                    raster.width(),
                    raster.height(),
                    self.scene.len()
                );
                self.export_status = ExportStatus::Pending;
                Ok(raster)
            }
            Err(err) => {
                warn!("Export failed while flattening: {}", err);
                self.export_status = ExportStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Records the writer's outcome. The scene and history are left alone
    /// either way; success only clears the dirty flag.
    pub fn finish_export(&mut self, result: Result<(), String>) {
        self.export_status = match result {
            Ok(()) => {
                info!("Export finished");
                self.scene.mark_clean();
                ExportStatus::Done
            }
            Err(message) => {
                warn!("Export failed: {}", message);
                ExportStatus::Failed(message)
            }
        };
        self.needs_redraw = true;
    }
}

/// Device coordinates, or `None` (logged) for non-finite input.
fn checked_point(x: f64, y: f64) -> Option<Point> {
    match geometry::validate_point(Point::new(x, y)) {
        Ok(p) => Some(p),
        Err(err) => {
            debug!("Dropping pointer event: {}", err);
            None
        }
    }
}
