//! Transient distance measurement. Nothing here reaches the scene or history.

use super::{PreviewContext, ToolContext};
use crate::draw::render_kind;
use crate::geometry::Point;
use crate::scene::AnnotationKind;

#[derive(Debug, Default)]
pub struct RulerTool {
    /// Current measurement, kept on screen after release
    segment: Option<(Point, Point)>,
    dragging: bool,
}

impl RulerTool {
    pub fn is_busy(&self) -> bool {
        self.dragging
    }

    /// Endpoints of the visible measurement.
    pub fn segment(&self) -> Option<(Point, Point)> {
        self.segment
    }

    pub fn on_pointer_down(&mut self, p: Point) -> bool {
        self.segment = Some((p, p));
        self.dragging = true;
        true
    }

    pub fn on_pointer_move(&mut self, _ctx: &mut ToolContext, p: Point) -> bool {
        if !self.dragging {
            return false;
        }
        if let Some((_, end)) = &mut self.segment {
            *end = p;
        }
        true
    }

    pub fn on_pointer_up(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let redraw = self.on_pointer_move(ctx, p);
        self.dragging = false;
        redraw
    }

    pub fn cancel(&mut self) -> bool {
        self.dragging = false;
        self.segment.take().is_some()
    }

    pub fn render_preview(&self, ctx: &cairo::Context, view: &PreviewContext) {
        if let Some((start, end)) = self.segment {
            let kind = AnnotationKind::Ruler { start, end };
            render_kind(ctx, &kind, &view.defaults.style, &view.image_bounds);
        }
    }
}
