//! Linear undo/redo over [`Command`]s.
//!
//! `applied` holds commands currently reflected in the scene (most recent last);
//! `undone` holds commands available for redo. Executing a new command discards
//! the undone sequence.

pub mod command;

pub use command::Command;

use crate::scene::{Scene, SceneError};
use log::{debug, error, warn};

/// Undo/redo stacks for one editor session.
#[derive(Debug, Default)]
pub struct History {
    applied: Vec<Command>,
    undone: Vec<Command>,
    /// Maximum number of undoable commands (0 = unlimited)
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            applied: Vec::new(),
            undone: Vec::new(),
            limit,
        }
    }

    /// Applies `command` and records it. Returns false if the scene rejected it.
    pub fn execute(&mut self, scene: &mut Scene, command: Command) -> bool {
        if !report(command.apply(scene), "execute", &command) {
            return false;
        }
        debug!("History: executed {}", command.label());
        self.undone.clear();
        self.applied.push(command);
        self.trim();
        true
    }

    /// Inverts the most recent command. No-op (returns false) when nothing is applied.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(command) = self.applied.pop() else {
            return false;
        };
        report(command.revert(scene), "undo", &command);
        debug!("History: undid {}", command.label());
        self.undone.push(command);
        true
    }

    /// Reapplies the most recently undone command. No-op when nothing was undone.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(command) = self.undone.pop() else {
            return false;
        };
        report(command.apply(scene), "redo", &command);
        debug!("History: redid {}", command.label());
        self.applied.push(command);
        true
    }

    /// Replaces the most recent command with `command`, keeping one entry.
    ///
    /// Live gestures (dragging, typing) call this on every update so the whole
    /// gesture undoes in one step. A replacement the scene rejects is dropped
    /// and the previous entry is put back, so the gesture keeps its last good
    /// state.
    pub fn amend(&mut self, scene: &mut Scene, command: Command) -> bool {
        let previous = self.applied.pop();
        if let Some(previous) = &previous {
            report(previous.revert(scene), "amend", previous);
        }
        if let Err(err) = command.apply(scene) {
            warn!("History: rejected {} amendment: {}", command.label(), err);
            if let Some(previous) = previous {
                if report(previous.apply(scene), "amend", &previous) {
                    self.applied.push(previous);
                }
            }
            return false;
        }
        self.undone.clear();
        self.applied.push(command);
        true
    }

    /// Reverts and discards the most recent command without making it redoable.
    pub fn retract(&mut self, scene: &mut Scene) -> Option<Command> {
        let command = self.applied.pop()?;
        report(command.revert(scene), "retract", &command);
        debug!("History: retracted {}", command.label());
        Some(command)
    }

    pub fn can_undo(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.applied.len()
    }

    pub fn redo_count(&self) -> usize {
        self.undone.len()
    }

    /// Most recently applied command.
    pub fn last(&self) -> Option<&Command> {
        self.applied.last()
    }

    pub fn clear(&mut self) {
        self.applied.clear();
        self.undone.clear();
    }

    fn trim(&mut self) {
        if self.limit > 0 && self.applied.len() > self.limit {
            let excess = self.applied.len() - self.limit;
            self.applied.drain(..excess);
        }
    }
}

/// Scene errors during replay mean the history and scene disagree. That is a bug:
/// fail loudly in debug builds, keep the user's data untouched in release builds.
fn report(result: Result<(), SceneError>, op: &str, command: &Command) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            error!("History {op} of {} failed: {err}", command.label());
            debug_assert!(false, "history {op} failed: {err}");
            false
        }
    }
}
