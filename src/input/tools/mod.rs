//! The interactive tools and their gesture state machines.
//!
//! [`Tool`] is a closed enum: each variant owns its in-progress gesture state and
//! the editor dispatches pointer, key and preview calls through the same fixed
//! interface. Tools never mutate the scene directly; every change goes through
//! the [`History`] carried in [`ToolContext`].

mod click;
mod ruler;
mod select;
mod shape;
mod stroke;
mod text;

pub use click::{EraserTool, EyedropperTool, StepTool};
pub use ruler::RulerTool;
pub use select::SelectTool;
pub use shape::ShapeTool;
pub use stroke::StrokeTool;
pub use text::TextTool;

use super::events::Key;
use super::modifiers::Modifiers;
use super::settings::{EditorSettings, ToolDefaults};
use super::tool::ToolKind;
use crate::draw::Color;
use crate::geometry::{Point, Rect};
use crate::history::History;
use crate::scene::Scene;

/// Everything a tool may read or change while handling one event.
pub struct ToolContext<'a> {
    pub scene: &'a mut Scene,
    pub history: &'a mut History,
    pub defaults: &'a mut ToolDefaults,
    pub settings: &'a EditorSettings,
    pub modifiers: Modifiers,
    /// Current zoom factor, used to convert screen-pixel thresholds
    pub zoom: f64,
}

impl ToolContext<'_> {
    /// Minimum drag distance in image pixels.
    pub fn drag_threshold(&self) -> f64 {
        self.settings.min_drag_distance / self.zoom
    }

    /// Hit-test tolerance in image pixels.
    pub fn hit_tolerance(&self) -> f64 {
        self.settings.hit_tolerance / self.zoom
    }

    /// Half the side of a resize handle in image pixels.
    pub fn handle_half_size(&self) -> f64 {
        self.settings.handle_size / self.zoom / 2.0
    }
}

/// Read-only view handed to [`Tool::render_preview`].
pub struct PreviewContext<'a> {
    pub scene: &'a Scene,
    pub defaults: &'a ToolDefaults,
    pub zoom: f64,
    pub image_bounds: Rect,
}

/// The active tool.
#[derive(Debug)]
pub enum Tool {
    Select(SelectTool),
    /// Rectangle, ellipse, arrow, spotlight and blur: drag out a box or segment
    Shape(ShapeTool),
    /// Freehand and highlighter: accumulate a path
    Stroke(StrokeTool),
    Text(TextTool),
    Step(StepTool),
    Eraser(EraserTool),
    Eyedropper(EyedropperTool),
    Ruler(RulerTool),
}

impl Tool {
    pub fn new(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Select => Tool::Select(SelectTool::default()),
            ToolKind::Rectangle
            | ToolKind::Ellipse
            | ToolKind::Arrow
            | ToolKind::Spotlight
            | ToolKind::Blur => Tool::Shape(ShapeTool::new(kind)),
            ToolKind::Freehand | ToolKind::Highlighter => Tool::Stroke(StrokeTool::new(kind)),
            ToolKind::Text => Tool::Text(TextTool::default()),
            ToolKind::StepCounter => Tool::Step(StepTool),
            ToolKind::Eraser => Tool::Eraser(EraserTool),
            ToolKind::Eyedropper => Tool::Eyedropper(EyedropperTool::default()),
            ToolKind::Ruler => Tool::Ruler(RulerTool::default()),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Select(_) => ToolKind::Select,
            Tool::Shape(t) => t.kind(),
            Tool::Stroke(t) => t.kind(),
            Tool::Text(_) => ToolKind::Text,
            Tool::Step(_) => ToolKind::StepCounter,
            Tool::Eraser(_) => ToolKind::Eraser,
            Tool::Eyedropper(_) => ToolKind::Eyedropper,
            Tool::Ruler(_) => ToolKind::Ruler,
        }
    }

    /// Returns true if the display needs to be redrawn.
    pub fn on_pointer_down(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        match self {
            Tool::Select(t) => t.on_pointer_down(ctx, p),
            Tool::Shape(t) => t.on_pointer_down(p),
            Tool::Stroke(t) => t.on_pointer_down(p),
            Tool::Text(t) => t.on_pointer_down(ctx, p),
            Tool::Step(t) => t.on_pointer_down(ctx, p),
            Tool::Eraser(t) => t.on_pointer_down(ctx, p),
            Tool::Eyedropper(t) => t.on_pointer_down(ctx, p),
            Tool::Ruler(t) => t.on_pointer_down(p),
        }
    }

    pub fn on_pointer_move(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        match self {
            Tool::Select(t) => t.on_pointer_move(ctx, p),
            Tool::Shape(t) => t.on_pointer_move(ctx, p),
            Tool::Stroke(t) => t.on_pointer_move(ctx, p),
            Tool::Ruler(t) => t.on_pointer_move(ctx, p),
            Tool::Text(_) | Tool::Step(_) | Tool::Eraser(_) | Tool::Eyedropper(_) => false,
        }
    }

    pub fn on_pointer_up(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        match self {
            Tool::Select(t) => t.on_pointer_up(ctx, p),
            Tool::Shape(t) => t.on_pointer_up(ctx, p),
            Tool::Stroke(t) => t.on_pointer_up(ctx, p),
            Tool::Ruler(t) => t.on_pointer_up(ctx, p),
            Tool::Text(_) | Tool::Step(_) | Tool::Eraser(_) | Tool::Eyedropper(_) => false,
        }
    }

    /// Offers a key to the tool. Returns true if the tool consumed it.
    pub fn on_key_press(&mut self, ctx: &mut ToolContext, key: Key) -> bool {
        match self {
            Tool::Text(t) => t.on_key_press(ctx, key),
            _ => false,
        }
    }

    /// Aborts the in-progress gesture without leaving a history entry.
    ///
    /// Returns true if there was anything to abort.
    pub fn cancel(&mut self, ctx: &mut ToolContext) -> bool {
        match self {
            Tool::Select(t) => t.cancel(ctx),
            Tool::Shape(t) => t.cancel(),
            Tool::Stroke(t) => t.cancel(),
            Tool::Text(t) => t.cancel(ctx),
            Tool::Ruler(t) => t.cancel(),
            Tool::Step(_) | Tool::Eraser(_) | Tool::Eyedropper(_) => false,
        }
    }

    /// Called before the tool is replaced or before undo/redo.
    ///
    /// Drag gestures are discarded. Text editing counts as losing focus and is
    /// finished, which removes the annotation again if it is empty.
    pub fn deactivate(&mut self, ctx: &mut ToolContext) -> bool {
        match self {
            Tool::Text(t) => t.finish(ctx),
            _ => self.cancel(ctx),
        }
    }

    /// Ends a gesture that owns the top history entry, keeping what it has done
    /// so far. Editor commands call this before recording their own entry.
    ///
    /// Drags that have not touched the history yet carry on.
    pub fn commit(&mut self, ctx: &mut ToolContext) -> bool {
        match self {
            Tool::Select(t) => t.commit(),
            Tool::Text(t) => t.finish(ctx),
            _ => false,
        }
    }

    /// True while a gesture or text edit is in progress.
    pub fn is_busy(&self) -> bool {
        match self {
            Tool::Select(t) => t.is_busy(),
            Tool::Shape(t) => t.is_busy(),
            Tool::Stroke(t) => t.is_busy(),
            Tool::Text(t) => t.is_editing(),
            Tool::Ruler(t) => t.is_busy(),
            Tool::Step(_) | Tool::Eraser(_) | Tool::Eyedropper(_) => false,
        }
    }

    /// True while the text tool is capturing plain keystrokes.
    pub fn is_text_editing(&self) -> bool {
        matches!(self, Tool::Text(t) if t.is_editing())
    }

    /// Region marked by the select tool's last marquee.
    pub fn crop_region(&self) -> Option<Rect> {
        match self {
            Tool::Select(t) => t.region(),
            _ => None,
        }
    }

    /// Color picked by the eyedropper on its last click.
    pub fn sampled_color(&self) -> Option<Color> {
        match self {
            Tool::Eyedropper(t) => t.sampled(),
            _ => None,
        }
    }

    /// Draws the uncommitted gesture on top of the scene (image space).
    pub fn render_preview(&self, ctx: &cairo::Context, view: &PreviewContext) {
        match self {
            Tool::Select(t) => t.render_preview(ctx, view),
            Tool::Shape(t) => t.render_preview(ctx, view),
            Tool::Stroke(t) => t.render_preview(ctx, view),
            Tool::Text(t) => t.render_preview(ctx, view),
            Tool::Ruler(t) => t.render_preview(ctx, view),
            Tool::Step(_) | Tool::Eraser(_) | Tool::Eyedropper(_) => {}
        }
    }
}
