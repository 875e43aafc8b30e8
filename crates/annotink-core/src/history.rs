//! Linear undo/redo over scene snapshots.

use crate::scene::{BackgroundRef, Scene, SceneError, Snapshot};
use std::collections::VecDeque;
use thiserror::Error;

/// History errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Snapshot could not be restored: {0}")]
    Restore(#[from] SceneError),
}

/// Outcome of an undo or redo.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing to undo or redo.
    Unchanged,
    /// Objects were restored. When the snapshot references a background it
    /// must be decoded and re-applied by the caller.
    Restored { background: Option<BackgroundRef> },
}

/// Undo and redo stacks.
///
/// The top of `undo` is the current state. Once a scene has been captured
/// the undo stack never shrinks below one entry.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: VecDeque<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the scene as the new current state; discards the redo stack.
    pub fn save_state(&mut self, scene: &dyn Scene) {
        self.undo.push(scene.to_snapshot(true));
        self.redo.clear();
        log::debug!("History saved ({} undo states)", self.undo.len());
    }

    /// Step back one state.
    pub fn undo(&mut self, scene: &mut dyn Scene) -> Result<Transition, HistoryError> {
        if self.undo.len() <= 1 {
            return Ok(Transition::Unchanged);
        }
        let previous = self.undo[self.undo.len() - 2].clone();
        let background = restore(scene, &previous)?;
        if let Some(current) = self.undo.pop() {
            self.redo.push_front(current);
        }
        Ok(Transition::Restored { background })
    }

    /// Re-apply the most recently undone state.
    pub fn redo(&mut self, scene: &mut dyn Scene) -> Result<Transition, HistoryError> {
        let Some(next) = self.redo.front().cloned() else {
            return Ok(Transition::Unchanged);
        };
        let background = restore(scene, &next)?;
        self.redo.pop_front();
        self.undo.push(next);
        Ok(Transition::Restored { background })
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Current state, if any has been captured.
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo.last()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Forget everything (new image or teardown).
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// Load a snapshot's objects into the scene and drop the background.
///
/// On error the scene is left as it was.
pub fn restore(
    scene: &mut dyn Scene,
    snapshot: &Snapshot,
) -> Result<Option<BackgroundRef>, HistoryError> {
    scene.load_objects(snapshot.objects().to_vec())?;
    scene.discard_active_object();
    scene.set_background(None);
    scene.request_render();
    Ok(snapshot.background().cloned())
}
