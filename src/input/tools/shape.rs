//! Drag-out tools: rectangle, ellipse, arrow, spotlight and blur.

use super::{PreviewContext, ToolContext};
use crate::draw::render_kind;
use crate::geometry::{self, Point, Rect};
use crate::history::Command;
use crate::input::settings::ToolDefaults;
use crate::input::tool::ToolKind;
use crate::scene::{AnnotationKind, SpotlightShape, Style};
use log::debug;

#[derive(Debug, Clone, Copy)]
struct Drag {
    start: Point,
    end: Point,
    /// Shift was held on the last update
    constrained: bool,
}

/// `Idle -> Dragging -> Idle`; commits one add command on release.
#[derive(Debug)]
pub struct ShapeTool {
    kind: ToolKind,
    drag: Option<Drag>,
}

impl ShapeTool {
    pub fn new(kind: ToolKind) -> Self {
        Self { kind, drag: None }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn is_busy(&self) -> bool {
        self.drag.is_some()
    }

    pub fn on_pointer_down(&mut self, p: Point) -> bool {
        self.drag = Some(Drag {
            start: p,
            end: p,
            constrained: false,
        });
        true
    }

    pub fn on_pointer_move(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let Some(drag) = &mut self.drag else {
            return false;
        };
        drag.end = p;
        drag.constrained = ctx.modifiers.shift;
        true
    }

    pub fn on_pointer_up(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let Some(mut drag) = self.drag.take() else {
            return false;
        };
        drag.end = p;
        drag.constrained = ctx.modifiers.shift;

        if geometry::distance(drag.start, drag.end) < ctx.drag_threshold() {
            debug!("{} drag below threshold, discarded", self.kind);
            return true;
        }

        let (kind, style) = build(self.kind, &drag, ctx.defaults);
        let annotation = ctx.scene.allocate(kind, style);
        let id = annotation.id;
        let index = ctx.scene.len();
        if ctx
            .history
            .execute(ctx.scene, Command::Add { annotation, index })
        {
            ctx.scene.select_only(id);
        }
        true
    }

    pub fn cancel(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn render_preview(&self, ctx: &cairo::Context, view: &PreviewContext) {
        let Some(drag) = &self.drag else {
            return;
        };
        let (kind, style) = build(self.kind, drag, view.defaults);
        match &kind {
            // Blur pixels only exist after composition; outline the region instead
            AnnotationKind::Blur { rect, .. } => {
                crate::draw::render::render_marquee(ctx, rect, view.zoom);
            }
            _ => render_kind(ctx, &kind, &style, &view.image_bounds),
        }
    }
}

/// Annotation payload for a drag from `start` to `end`.
fn build(tool: ToolKind, drag: &Drag, defaults: &ToolDefaults) -> (AnnotationKind, Style) {
    let Drag {
        start,
        end,
        constrained,
    } = *drag;
    let boxed = || {
        let end = if constrained {
            geometry::square_from_corners(start, end)
        } else {
            end
        };
        Rect::from_corners(start, end)
    };

    let kind = match tool {
        ToolKind::Ellipse => AnnotationKind::Ellipse { rect: boxed() },
        ToolKind::Arrow => AnnotationKind::Arrow {
            start,
            end: if constrained {
                geometry::snap_to_45(start, end)
            } else {
                end
            },
            head_length: defaults.arrow_length,
            head_angle: defaults.arrow_angle,
        },
        ToolKind::Spotlight => AnnotationKind::Spotlight {
            rect: Rect::from_corners(start, end),
            shape: if constrained {
                SpotlightShape::Ellipse
            } else {
                SpotlightShape::Rectangle
            },
            darkness: defaults.spotlight_darkness,
        },
        ToolKind::Blur => AnnotationKind::Blur {
            rect: Rect::from_corners(start, end),
            mode: defaults.blur_mode,
            radius: defaults.blur_radius,
        },
        _ => AnnotationKind::Rectangle { rect: boxed() },
    };
    (kind, defaults.style.clone())
}
