//! Reversible scene mutations.

use crate::draw::Raster;
use crate::geometry::Rect;
use crate::scene::{Annotation, AnnotationId, Scene, SceneError};

/// One undoable change to the scene.
///
/// Commands own full snapshots of whatever they need to invert themselves, so a
/// remove can be undone (and redone) long after the annotation left the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert `annotation` at z-index `index`
    Add { annotation: Annotation, index: usize },
    /// Remove `annotation`, which sat at z-index `index`
    Remove { annotation: Annotation, index: usize },
    /// Replace one annotation's state
    Modify { before: Annotation, after: Annotation },
    /// Move one annotation in the z-order
    Reorder {
        id: AnnotationId,
        from: usize,
        to: usize,
    },
    /// Translate several annotations by the same offset
    Move {
        ids: Vec<AnnotationId>,
        dx: f64,
        dy: f64,
    },
    /// Replace the base image with the block at `(x, y)` and shift every
    /// annotation in `ids` into the new origin
    Crop {
        x: u32,
        y: u32,
        before: Raster,
        after: Raster,
        ids: Vec<AnnotationId>,
    },
    /// Ordered group applied as one step
    Batch(Vec<Command>),
}

impl Command {
    /// Builds a remove command from the scene's current state of `id`.
    pub fn remove(scene: &Scene, id: AnnotationId) -> Option<Command> {
        let annotation = scene.get(id)?.clone();
        let index = scene.index_of(id)?;
        Some(Command::Remove { annotation, index })
    }

    /// Removes several annotations. Indices are captured top-down so the batch
    /// reverts (bottom-up) into the original slots.
    pub fn remove_many(scene: &Scene, ids: &[AnnotationId]) -> Option<Command> {
        let mut ordered: Vec<(usize, AnnotationId)> = ids
            .iter()
            .filter_map(|id| scene.index_of(*id).map(|i| (i, *id)))
            .collect();
        ordered.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        let commands: Vec<Command> = ordered
            .into_iter()
            .filter_map(|(_, id)| Command::remove(scene, id))
            .collect();
        match commands.len() {
            0 => None,
            1 => commands.into_iter().next(),
            _ => Some(Command::Batch(commands)),
        }
    }

    /// Crops the base image to the pixels covered by `region`.
    ///
    /// Returns `None` when the region misses the image or already covers all of it.
    pub fn crop(scene: &Scene, region: &Rect) -> Option<Command> {
        let base = scene.base();
        let (x0, y0, x1, y1) = region.pixel_span(base.width() as i32, base.height() as i32)?;
        let (x, y) = (x0 as u32, y0 as u32);
        let (width, height) = ((x1 - x0) as u32, (y1 - y0) as u32);
        if width == base.width() && height == base.height() {
            return None;
        }
        Some(Command::Crop {
            x,
            y,
            before: base.clone(),
            after: base.crop(x, y, width, height)?,
            ids: scene.iter().map(|a| a.id).collect(),
        })
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::Modify { .. } => "modify",
            Command::Reorder { .. } => "reorder",
            Command::Move { .. } => "move",
            Command::Crop { .. } => "crop",
            Command::Batch(_) => "batch",
        }
    }

    pub fn apply(&self, scene: &mut Scene) -> Result<(), SceneError> {
        match self {
            Command::Add { annotation, index } => scene.insert(annotation.clone(), *index),
            Command::Remove { annotation, .. } => scene.remove(annotation.id).map(|_| ()),
            Command::Modify { before, after } => {
                scene.replace(before.id, after.clone()).map(|_| ())
            }
            Command::Reorder { id, to, .. } => scene.reorder(*id, *to).map(|_| ()),
            Command::Move { ids, dx, dy } => {
                for id in ids {
                    scene.translate(*id, *dx, *dy)?;
                }
                Ok(())
            }
            Command::Crop {
                x, y, after, ids, ..
            } => {
                for id in ids {
                    scene.translate(*id, -(*x as f64), -(*y as f64))?;
                }
                scene.replace_base(after.clone());
                Ok(())
            }
            Command::Batch(commands) => {
                for command in commands {
                    command.apply(scene)?;
                }
                Ok(())
            }
        }
    }

    pub fn revert(&self, scene: &mut Scene) -> Result<(), SceneError> {
        match self {
            Command::Add { annotation, .. } => scene.remove(annotation.id).map(|_| ()),
            Command::Remove { annotation, index } => scene.insert(annotation.clone(), *index),
            Command::Modify { before, .. } => {
                scene.replace(before.id, before.clone()).map(|_| ())
            }
            Command::Reorder { id, from, .. } => scene.reorder(*id, *from).map(|_| ()),
            Command::Move { ids, dx, dy } => {
                for id in ids {
                    scene.translate(*id, -dx, -dy)?;
                }
                Ok(())
            }
            Command::Crop {
                x, y, before, ids, ..
            } => {
                for id in ids {
                    scene.translate(*id, *x as f64, *y as f64)?;
                }
                scene.replace_base(before.clone());
                Ok(())
            }
            Command::Batch(commands) => {
                for command in commands.iter().rev() {
                    command.revert(scene)?;
                }
                Ok(())
            }
        }
    }
}
