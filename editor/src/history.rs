//! Undo/redo history for module edits.
//!
//! [`EditHistory`] keeps a linear undo/redo stack of [`EditAction`] trait
//! objects. Executing a new action after undoing discards the redo stack.

use std::collections::VecDeque;
use std::fmt;

use modkit_runtime::ModuleControl;

use crate::action::{EditAction, EditActionError, EditActionResult};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Undo/redo stack for one [`ModuleControl`].
///
/// The undo stack is bounded: when it exceeds `max_undo`, the oldest action
/// is dropped from the front.
///
/// ```ignore
/// let mut history = EditHistory::new(50);
/// history.execute(Box::new(AttachModuleAction::new(module)), &mut control)?;
/// history.undo(&mut control)?;
/// history.redo(&mut control)?;
/// ```
pub struct EditHistory {
    undo_stack: VecDeque<Box<dyn EditAction>>,
    redo_stack: Vec<Box<dyn EditAction>>,
    max_undo: usize,
    merge_broken: bool,
    /// Distance from the saved state.
    ///
    /// - `Some(0)`: the control matches the last save.
    /// - `Some(n)`, `n > 0`: `n` undos reach the saved state.
    /// - `Some(n)`, `n < 0`: `|n|` redos reach the saved state.
    /// - `None`: the save point is unreachable.
    save_distance: Option<i64>,
}

impl EditHistory {
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            merge_broken: false,
            save_distance: Some(0),
        }
    }

    /// Apply `action` to `control` and record it.
    ///
    /// The action first tries to [merge](EditAction::merge) into the top of
    /// the undo stack. A failed action is not recorded.
    pub fn execute(
        &mut self,
        mut action: Box<dyn EditAction>,
        control: &mut ModuleControl,
    ) -> EditActionResult {
        action.apply(control)?;

        self.redo_stack.clear();
        if let Some(d) = self.save_distance
            && d < 0
        {
            self.save_distance = None;
        }

        if !self.merge_broken
            && let Some(last) = self.undo_stack.back_mut()
        {
            match last.merge(action) {
                None => {
                    if self.save_distance == Some(0) {
                        self.save_distance = None;
                    }
                    return Ok(());
                }
                Some(returned) => action = returned,
            }
        }
        self.merge_broken = false;

        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.undo_stack.push_back(action);
        self.trim();
        Ok(())
    }

    /// Undo the most recent action.
    pub fn undo(&mut self, control: &mut ModuleControl) -> EditActionResult {
        let mut action = self
            .undo_stack
            .pop_back()
            .ok_or_else(|| EditActionError::Custom("nothing to undo".into()))?;
        action.undo(control)?;
        log::debug!("undo: {}", action.description());
        self.redo_stack.push(action);
        self.merge_broken = true;
        if let Some(d) = &mut self.save_distance {
            *d -= 1;
        }
        Ok(())
    }

    /// Redo the most recently undone action.
    pub fn redo(&mut self, control: &mut ModuleControl) -> EditActionResult {
        let mut action = self
            .redo_stack
            .pop()
            .ok_or_else(|| EditActionError::Custom("nothing to redo".into()))?;
        action.apply(control)?;
        log::debug!("redo: {}", action.description());
        self.undo_stack.push_back(action);
        self.merge_broken = true;
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.trim();
        Ok(())
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
            if let Some(d) = self.save_distance
                && d > self.undo_stack.len() as i64
            {
                self.save_distance = None;
            }
        }
    }

    /// The next executed action starts a new undo step even if it could merge.
    pub fn break_merge(&mut self) {
        self.merge_broken = true;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|a| a.description())
    }

    /// Redo descriptions, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|a| a.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Record the current state as saved.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
    }

    /// `true` if the control differs from the last saved state, or the save
    /// point can no longer be reached.
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_distance != Some(0)
    }

    /// Drop both stacks. A saved state stays saved; any other save point is lost.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.merge_broken = false;
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl fmt::Debug for EditHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("save_distance", &self.save_distance)
            .finish()
    }
}
