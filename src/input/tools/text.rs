//! Text placement and editing.
//!
//! A click creates a provisional (empty) text annotation right away so the caret
//! box is visible, and every keystroke amends that single history entry. Ending
//! the edit with no visible characters retracts the entry again, so an abandoned
//! click leaves neither an annotation nor an undo step behind.

use super::{PreviewContext, ToolContext};
use crate::draw::render::render_marquee;
use crate::geometry::Point;
use crate::history::Command;
use crate::input::events::Key;
use crate::scene::{Annotation, AnnotationId, AnnotationKind};
use log::debug;

#[derive(Debug)]
struct Edit {
    id: AnnotationId,
    /// State before editing began; `None` for a text created by this edit
    original: Option<Annotation>,
    /// z-index of the annotation when editing began
    index: usize,
    buffer: String,
    /// True once a history entry for this edit exists
    recorded: bool,
}

/// `Idle -> Editing -> Idle`; Return or focus loss finishes, Escape aborts.
#[derive(Debug, Default)]
pub struct TextTool {
    edit: Option<Edit>,
}

impl TextTool {
    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Text currently being typed, if editing.
    pub fn buffer(&self) -> Option<&str> {
        self.edit.as_ref().map(|e| e.buffer.as_str())
    }

    pub fn on_pointer_down(&mut self, ctx: &mut ToolContext, p: Point) -> bool {
        let hit = ctx
            .scene
            .hit_test(p, ctx.hit_tolerance())
            .into_iter()
            .find(|id| {
                ctx.scene
                    .get(*id)
                    .is_some_and(|a| matches!(a.kind, AnnotationKind::Text { .. }))
            });

        if let Some(edit) = &self.edit {
            if hit == Some(edit.id) {
                return false;
            }
        }
        self.finish(ctx);

        match hit.and_then(|id| ctx.scene.get(id).cloned()) {
            Some(existing) => self.begin_existing(ctx, existing),
            None => self.begin_new(ctx, p),
        }
        true
    }

    fn begin_new(&mut self, ctx: &mut ToolContext, anchor: Point) {
        let kind = AnnotationKind::Text {
            anchor,
            text: String::new(),
            font: ctx.defaults.font.clone(),
        };
        let annotation = ctx.scene.allocate(kind, ctx.defaults.style.clone());
        let id = annotation.id;
        let index = ctx.scene.len();
        if !ctx
            .history
            .execute(ctx.scene, Command::Add { annotation, index })
        {
            return;
        }
        ctx.scene.select_only(id);
        debug!("Text editing started for new annotation {}", id);
        self.edit = Some(Edit {
            id,
            original: None,
            index,
            buffer: String::new(),
            recorded: true,
        });
    }

    fn begin_existing(&mut self, ctx: &mut ToolContext, existing: Annotation) {
        let AnnotationKind::Text { text, .. } = &existing.kind else {
            return;
        };
        let Some(index) = ctx.scene.index_of(existing.id) else {
            return;
        };
        ctx.scene.select_only(existing.id);
        debug!("Text editing resumed for annotation {}", existing.id);
        self.edit = Some(Edit {
            id: existing.id,
            buffer: text.clone(),
            original: Some(existing),
            index,
            recorded: false,
        });
    }

    /// Handles typing while editing. Returns true if the key was consumed.
    pub fn on_key_press(&mut self, ctx: &mut ToolContext, key: Key) -> bool {
        let Some(edit) = &mut self.edit else {
            return false;
        };
        match key {
            Key::Char(c) => edit.buffer.push(c),
            Key::Space => edit.buffer.push(' '),
            Key::Backspace => {
                edit.buffer.pop();
            }
            Key::Return if ctx.modifiers.shift => edit.buffer.push('\n'),
            Key::Return => {
                self.finish(ctx);
                return true;
            }
            Key::Escape => {
                self.cancel(ctx);
                return true;
            }
            _ => return false,
        }
        self.sync(ctx);
        true
    }

    /// Pushes the buffer into the scene by amending this edit's history entry.
    fn sync(&mut self, ctx: &mut ToolContext) {
        let Some(edit) = &mut self.edit else {
            return;
        };
        let Some(current) = ctx.scene.get(edit.id) else {
            return;
        };
        let mut updated = current.clone();
        if let AnnotationKind::Text { text, .. } = &mut updated.kind {
            text.clone_from(&edit.buffer);
        }

        let command = match &edit.original {
            None => Command::Add {
                annotation: updated,
                index: edit.index,
            },
            Some(original) => Command::Modify {
                before: original.clone(),
                after: updated,
            },
        };
        if edit.recorded {
            ctx.history.amend(ctx.scene, command);
        } else {
            edit.recorded = ctx.history.execute(ctx.scene, command);
        }
    }

    /// Ends editing, keeping the text or discarding it if it is blank.
    ///
    /// Returns true if an edit was in progress.
    pub fn finish(&mut self, ctx: &mut ToolContext) -> bool {
        let Some(edit) = self.edit.take() else {
            return false;
        };
        if !edit.buffer.trim().is_empty() {
            debug!("Text editing finished for {}", edit.id);
            return true;
        }

        match (&edit.original, edit.recorded) {
            (None, true) => {
                ctx.history.retract(ctx.scene);
                debug!("Empty text {} discarded", edit.id);
            }
            (None, false) => {}
            (Some(original), recorded) => {
                // Clearing an existing text deletes it as one undoable step
                let remove = Command::Remove {
                    annotation: original.clone(),
                    index: edit.index,
                };
                if recorded {
                    ctx.history.amend(ctx.scene, remove);
                } else {
                    ctx.history.execute(ctx.scene, remove);
                }
                debug!("Cleared text {} removed", edit.id);
            }
        }
        true
    }

    /// Aborts editing and restores the state before the edit began.
    pub fn cancel(&mut self, ctx: &mut ToolContext) -> bool {
        let Some(edit) = self.edit.take() else {
            return false;
        };
        if edit.recorded {
            ctx.history.retract(ctx.scene);
        }
        debug!("Text editing of {} cancelled", edit.id);
        true
    }

    pub fn render_preview(&self, ctx: &cairo::Context, view: &PreviewContext) {
        let Some(annotation) = self.edit.as_ref().and_then(|e| view.scene.get(e.id)) else {
            return;
        };
        let bounds = annotation.bounds().inflate(3.0 / view.zoom);
        render_marquee(ctx, &bounds, view.zoom);
    }
}
