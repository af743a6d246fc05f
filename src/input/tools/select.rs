//! Selection, moving, resizing and marquee selection.

use super::{PreviewContext, ToolContext};
use crate::draw::render::render_marquee;
use crate::geometry::{self, Handle, Point, Rect};
use crate::history::Command;
use crate::scene::{Annotation, AnnotationId};
use log::debug;
use std::collections::BTreeSet;

#[derive(Debug)]
enum Gesture {
    /// Dragging the selection; `started` once the drag passed the threshold
    Moving {
        origin: Point,
        ids: Vec<AnnotationId>,
        started: bool,
    },
    /// Dragging one handle of a single selected annotation
    Resizing {
        origin: Point,
        handle: Handle,
        before: Annotation,
        started: bool,
    },
    /// Rubber-band selection from `origin`
    Marquee {
        origin: Point,
        current: Point,
        /// Selection to extend (Shift) or restore on cancel
        base: BTreeSet<AnnotationId>,
        additive: bool,
    },
}

#[derive(Debug, Default)]
pub struct SelectTool {
    gesture: Option<Gesture>,
    /// Rectangle of the last completed marquee, offered as the crop region
    region: Option<Rect>,
}

impl SelectTool {
    pub fn is_busy(&self) -> bool {
        self.gesture.is_some()
    }

    /// Last marquee rectangle, until the next press.
    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    pub fn on_pointer_down(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        self.region = None;
        if let Some((handle, before)) = self.handle_under(ctx, p) {
            self.gesture = Some(Gesture::Resizing {
                origin: p,
                handle,
                before,
                started: false,
            });
            return true;
        }

        let shift = ctx.modifiers.shift;
        let hit = ctx.scene.hit_test(p, ctx.hit_tolerance()).first().copied();
        match hit {
            Some(id) => {
                if shift {
                    ctx.scene.toggle_selected(id);
                } else if !ctx.scene.is_selected(id) {
                    ctx.scene.select_only(id);
                }
                // Shift-clicking a selected annotation only deselects it
                if ctx.scene.is_selected(id) {
                    let ids: Vec<AnnotationId> = ctx.scene.selected().map(|a| a.id).collect();
                    self.gesture = Some(Gesture::Moving {
                        origin: p,
                        ids,
                        started: false,
                    });
                }
            }
            None => {
                let base = ctx.scene.selection().clone();
                if !shift {
                    ctx.scene.clear_selection();
                }
                self.gesture = Some(Gesture::Marquee {
                    origin: p,
                    current: p,
                    base,
                    additive: shift,
                });
            }
        }
        true
    }

    /// Handle of the single selected annotation under `p`.
    fn handle_under(&self, ctx: &ToolContext, p: Point) -> Option<(Handle, Annotation)> {
        let mut selected = ctx.scene.selected();
        let only = selected.next()?;
        if selected.next().is_some() {
            return None;
        }
        let handle = geometry::handle_at(&only.kind.handles(), p, ctx.handle_half_size())?;
        Some((handle, only.clone()))
    }

    pub fn on_pointer_move(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let threshold = ctx.drag_threshold();
        let Some(gesture) = &mut self.gesture else {
            return false;
        };
        match gesture {
            Gesture::Moving {
                origin,
                ids,
                started,
            } => {
                let delta = p - *origin;
                if !*started && delta.length() < threshold {
                    return false;
                }
                let command = Command::Move {
                    ids: ids.clone(),
                    dx: delta.x,
                    dy: delta.y,
                };
                record(ctx, started, command);
            }
            Gesture::Resizing {
                origin,
                handle,
                before,
                started,
            } => {
                if !*started && geometry::distance(*origin, p) < threshold {
                    return false;
                }
                let command = Command::Modify {
                    before: before.clone(),
                    after: before.resized(*handle, p),
                };
                record(ctx, started, command);
            }
            Gesture::Marquee {
                origin,
                current,
                base,
                additive,
            } => {
                *current = p;
                let rect = Rect::from_corners(*origin, p);
                let mut selection = if *additive { base.clone() } else { BTreeSet::new() };
                if geometry::distance(*origin, p) >= threshold {
                    selection.extend(
                        ctx.scene
                            .iter()
                            .filter(|a| a.bounds().intersects(&rect))
                            .map(|a| a.id),
                    );
                }
                ctx.scene.set_selection(selection);
            }
        }
        true
    }

    pub fn on_pointer_up(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        if self.gesture.is_none() {
            return false;
        }
        self.on_pointer_move(ctx, p);
        match &self.gesture {
            Some(Gesture::Moving {
                started: true, ids, ..
            }) => debug!("Moved {} annotation(s)", ids.len()),
            Some(Gesture::Marquee {
                origin, current, ..
            }) if geometry::distance(*origin, *current) >= ctx.drag_threshold() => {
                self.region = Some(Rect::from_corners(*origin, *current));
            }
            _ => {}
        }
        self.gesture = None;
        true
    }

    pub fn cancel(&mut self, ctx: &mut ToolContext) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        match gesture {
            Gesture::Moving { started: true, .. } | Gesture::Resizing { started: true, .. } => {
                ctx.history.retract(ctx.scene);
            }
            Gesture::Marquee { base, .. } => ctx.scene.set_selection(base),
            _ => {}
        }
        true
    }

    /// Stops the gesture where it is; a recorded move or resize stays recorded.
    pub fn commit(&mut self) -> bool {
        self.gesture.take().is_some()
    }

    pub fn render_preview(&self, ctx: &cairo::Context, view: &PreviewContext) {
        if let Some(Gesture::Marquee {
            origin, current, ..
        }) = &self.gesture
        {
            render_marquee(ctx, &Rect::from_corners(*origin, *current), view.zoom);
        }
    }
}

/// First update of a gesture executes; later updates amend the same entry.
fn record(ctx: &mut ToolContext, started: &mut bool, command: Command) {
    if *started {
        ctx.history.amend(ctx.scene, command);
    } else {
        *started = ctx.history.execute(ctx.scene, command);
    }
}
