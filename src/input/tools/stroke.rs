//! Path tools: freehand pen and highlighter.

use super::{PreviewContext, ToolContext};
use crate::draw::render_kind;
use crate::geometry::{self, Point, Rect};
use crate::history::Command;
use crate::input::settings::ToolDefaults;
use crate::input::tool::ToolKind;
use crate::scene::{AnnotationKind, Style};
use log::debug;

/// Travel (screen pixels) after which the highlighter decides on an axis lock.
const AXIS_LOCK_DISTANCE: f64 = 20.0;
/// Strokes within this many degrees of an axis snap to it.
const AXIS_LOCK_ANGLE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Default)]
struct Path {
    points: Vec<Point>,
    /// `None` until the stroke has travelled far enough to decide
    lock: Option<Option<Axis>>,
}

/// Accumulates a path while dragging and commits it as one add command.
#[derive(Debug)]
pub struct StrokeTool {
    kind: ToolKind,
    path: Option<Path>,
}

impl StrokeTool {
    pub fn new(kind: ToolKind) -> Self {
        Self { kind, path: None }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn is_busy(&self) -> bool {
        self.path.is_some()
    }

    pub fn on_pointer_down(&mut self, p: Point) -> bool {
        self.path = Some(Path {
            points: vec![p],
            lock: None,
        });
        true
    }

    pub fn on_pointer_move(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let highlighter = self.kind == ToolKind::Highlighter;
        let Some(path) = &mut self.path else {
            return false;
        };
        let first = path.points[0];

        if highlighter && path.lock.is_none() {
            if geometry::distance(first, p) > AXIS_LOCK_DISTANCE / ctx.zoom {
                let lock = axis_of(first, p);
                if lock.is_some() {
                    debug!("Highlighter locked to {:?}", lock);
                }
                path.lock = Some(lock);
            }
        } else if !highlighter {
            path.lock = Some(None);
        }

        match path.lock {
            Some(Some(axis)) => {
                path.points = vec![first, project(first, p, axis)];
            }
            _ => {
                if path.points.last() != Some(&p) {
                    path.points.push(p);
                }
            }
        }
        true
    }

    pub fn on_pointer_up(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        if !self.on_pointer_move(ctx, p) {
            return false;
        }
        let Some(path) = self.path.take() else {
            return false;
        };

        let extent = Rect::bounding(&path.points)
            .map(|r| r.width.max(r.height))
            .unwrap_or(0.0);
        if path.points.len() < 2 || extent < ctx.drag_threshold() {
            debug!("{} stroke too short, discarded", self.kind);
            return true;
        }

        let (kind, style) = self.payload(path.points, ctx.defaults);
        let annotation = ctx.scene.allocate(kind, style);
        let index = ctx.scene.len();
        ctx.history
            .execute(ctx.scene, Command::Add { annotation, index });
        true
    }

    pub fn cancel(&mut self) -> bool {
        self.path.take().is_some()
    }

    pub fn render_preview(&self, ctx: &cairo::Context, view: &PreviewContext) {
        let Some(path) = &self.path else {
            return;
        };
        let (kind, style) = self.payload(path.points.clone(), view.defaults);
        render_kind(ctx, &kind, &style, &view.image_bounds);
    }

    fn payload(&self, points: Vec<Point>, defaults: &ToolDefaults) -> (AnnotationKind, Style) {
        if self.kind == ToolKind::Highlighter {
            (
                AnnotationKind::Highlighter { points },
                defaults.highlighter.clone(),
            )
        } else {
            (AnnotationKind::Freehand { points }, defaults.style.clone())
        }
    }
}

/// Axis the segment `a -> b` is close to, if any.
fn axis_of(a: Point, b: Point) -> Option<Axis> {
    let d = b - a;
    let angle = d.y.abs().atan2(d.x.abs()).to_degrees();
    if angle < AXIS_LOCK_ANGLE {
        Some(Axis::Horizontal)
    } else if angle > 90.0 - AXIS_LOCK_ANGLE {
        Some(Axis::Vertical)
    } else {
        None
    }
}

fn project(origin: Point, p: Point, axis: Axis) -> Point {
    match axis {
        Axis::Horizontal => Point::new(p.x, origin.y),
        Axis::Vertical => Point::new(origin.x, p.y),
    }
}
