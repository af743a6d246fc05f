//! Single-click tools with no drag state.

use super::ToolContext;
use crate::draw::Color;
use crate::geometry::Point;
use crate::history::Command;
use crate::scene::AnnotationKind;
use log::debug;

/// Drops the next numbered badge at each click.
#[derive(Debug, Default)]
pub struct StepTool;

impl StepTool {
    pub fn on_pointer_down(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let kind = AnnotationKind::StepCounter {
            center: p,
            number: ctx.scene.next_step_number(),
            radius: ctx.defaults.step_radius,
        };
        let annotation = ctx.scene.allocate(kind, ctx.defaults.step_style());
        let index = ctx.scene.len();
        ctx.history
            .execute(ctx.scene, Command::Add { annotation, index })
    }
}

/// Removes the topmost annotation under each click.
#[derive(Debug, Default)]
pub struct EraserTool;

impl EraserTool {
    pub fn on_pointer_down(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let Some(id) = ctx.scene.hit_test(p, ctx.hit_tolerance()).first().copied() else {
            return false;
        };
        let Some(command) = Command::remove(ctx.scene, id) else {
            return false;
        };
        debug!("Eraser removing {}", id);
        ctx.history.execute(ctx.scene, command)
    }
}

/// Samples the captured image; never touches the scene.
#[derive(Debug, Default)]
pub struct EyedropperTool {
    sampled: Option<Color>,
}

impl EyedropperTool {
    pub fn sampled(&self) -> Option<Color> {
        self.sampled
    }

    /// Picks the base-image pixel under `p` and makes it the stroke color
    /// for new annotations. Clicks outside the image sample nothing.
    pub fn on_pointer_down(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let rgba = ctx
            .scene
            .base()
            .pixel(p.x.floor() as i64, p.y.floor() as i64);
        self.sampled = rgba.map(|[r, g, b, _]| Color::from_rgb8(r, g, b));
        if let Some(color) = self.sampled {
            debug!("Eyedropper sampled {:?}", color.to_rgba8());
            ctx.defaults.style.stroke = color;
        }
        true
    }
}
