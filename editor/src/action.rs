//! Reversible edits on a module control.
//!
//! Every structural change the authoring tool makes (attaching, detaching,
//! committing field edits) is an [`EditAction`]. Actions carry the module
//! instances they move in and out of the control, so undo and redo never
//! have to rebuild anything.

use std::any::{Any, TypeId};
use std::fmt;

use modkit_runtime::{Module, ModuleControl};

/// Downcasting support for action trait objects.
pub trait AsAny: 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Error type for action execution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditActionError {
    /// The module the action refers to is no longer where it was.
    TargetNotFound(String),
    /// The action is in the wrong state (e.g. applied twice).
    InvalidState(String),
    Custom(String),
}

impl fmt::Display for EditActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound(msg) => write!(f, "target not found: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EditActionError {}

pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// A reversible edit on a [`ModuleControl`].
///
/// # Merging
///
/// Incremental edits (each frame of a slider drag) can override
/// [`merge`](Self::merge) so consecutive actions collapse into one undo
/// step. `other` has already been applied when `merge` is called.
pub trait EditAction: fmt::Debug + AsAny + Send {
    /// Apply the action (forward / redo direction).
    fn apply(&mut self, control: &mut ModuleControl) -> EditActionResult;

    /// Reverse the action. Must restore the state from before `apply`.
    fn undo(&mut self, control: &mut ModuleControl) -> EditActionResult;

    /// Short label for history menus, e.g. `"Attach Rotate"`.
    fn description(&self) -> &str;

    /// Try to absorb `other` into `self`. Returns `None` when consumed.
    fn merge(&mut self, other: Box<dyn EditAction>) -> Option<Box<dyn EditAction>> {
        Some(other)
    }
}

fn module_type_id(module: &dyn Module) -> TypeId {
    module.as_any().type_id()
}

fn check_slot(control: &ModuleControl, index: usize, type_id: TypeId, name: &str) -> EditActionResult {
    match control.slot(index) {
        Some(slot) if slot.module_type_id() == type_id => Ok(()),
        Some(slot) => Err(EditActionError::TargetNotFound(format!(
            "expected {name} at index {index}, found {}",
            slot.module_name()
        ))),
        None => Err(EditActionError::TargetNotFound(format!(
            "no module at index {index} (expected {name})"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Attach
// ---------------------------------------------------------------------------

/// Appends a module to the end of the collection.
pub struct AttachModuleAction {
    name: &'static str,
    type_id: TypeId,
    /// The module while it is outside the control.
    module: Option<Box<dyn Module>>,
    index: Option<usize>,
    description: String,
}

impl AttachModuleAction {
    pub fn new(module: Box<dyn Module>) -> Self {
        let name = module.module_name();
        Self {
            name,
            type_id: module_type_id(&*module),
            module: Some(module),
            index: None,
            description: format!("Attach {name}"),
        }
    }

    /// Where the module landed. `None` until applied.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl fmt::Debug for AttachModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachModuleAction")
            .field("module", &self.name)
            .field("index", &self.index)
            .finish()
    }
}

impl EditAction for AttachModuleAction {
    fn apply(&mut self, control: &mut ModuleControl) -> EditActionResult {
        let module = self
            .module
            .take()
            .ok_or_else(|| EditActionError::InvalidState(format!("{} already attached", self.name)))?;
        let index = control.push_module(module);
        log::debug!("attached {} at {index}", self.name);
        self.index = Some(index);
        Ok(())
    }

    fn undo(&mut self, control: &mut ModuleControl) -> EditActionResult {
        let index = self
            .index
            .ok_or_else(|| EditActionError::InvalidState(format!("{} not attached", self.name)))?;
        check_slot(control, index, self.type_id, self.name)?;
        self.module = control.remove_module(index);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ---------------------------------------------------------------------------
// Detach
// ---------------------------------------------------------------------------

/// Removes the module at an index. Undo puts it back at the same index.
pub struct DetachModuleAction {
    name: &'static str,
    type_id: TypeId,
    index: usize,
    module: Option<Box<dyn Module>>,
    description: String,
}

impl DetachModuleAction {
    pub fn new(index: usize, type_id: TypeId, name: &'static str) -> Self {
        Self {
            name,
            type_id,
            index,
            module: None,
            description: format!("Detach {name}"),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for DetachModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachModuleAction")
            .field("module", &self.name)
            .field("index", &self.index)
            .field("detached", &self.module.is_some())
            .finish()
    }
}

impl EditAction for DetachModuleAction {
    fn apply(&mut self, control: &mut ModuleControl) -> EditActionResult {
        if self.module.is_some() {
            return Err(EditActionError::InvalidState(format!(
                "{} already detached",
                self.name
            )));
        }
        check_slot(control, self.index, self.type_id, self.name)?;
        self.module = control.remove_module(self.index);
        log::debug!("detached {} from {}", self.name, self.index);
        Ok(())
    }

    fn undo(&mut self, control: &mut ModuleControl) -> EditActionResult {
        if self.index > control.len() {
            return Err(EditActionError::TargetNotFound(format!(
                "cannot restore {} at {}: only {} modules",
                self.name,
                self.index,
                control.len()
            )));
        }
        let module = self
            .module
            .take()
            .ok_or_else(|| EditActionError::InvalidState(format!("{} not detached", self.name)))?;
        control.insert_module(self.index, module);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

/// Swaps the module at an index for an edited copy.
///
/// Apply and undo are the same operation: the action holds whichever instance
/// is currently outside the control and swaps it back in.
pub struct SetModuleFieldsAction {
    name: &'static str,
    type_id: TypeId,
    index: usize,
    /// Edits with the same key on the same slot merge into one undo step.
    merge_key: Option<String>,
    stash: Option<Box<dyn Module>>,
    description: String,
}

impl SetModuleFieldsAction {
    pub fn new(index: usize, module: Box<dyn Module>, merge_key: Option<String>) -> Self {
        let name = module.module_name();
        Self {
            name,
            type_id: module_type_id(&*module),
            index,
            merge_key,
            stash: Some(module),
            description: format!("Edit {name}"),
        }
    }

    fn swap(&mut self, control: &mut ModuleControl) -> EditActionResult {
        check_slot(control, self.index, self.type_id, self.name)?;
        let module = self
            .stash
            .take()
            .ok_or_else(|| EditActionError::InvalidState(format!("{} edit has no module", self.name)))?;
        match control.replace_module(self.index, module) {
            Ok(previous) => {
                self.stash = Some(previous);
                Ok(())
            }
            Err(module) => {
                self.stash = Some(module);
                Err(EditActionError::TargetNotFound(format!(
                    "no module at index {}",
                    self.index
                )))
            }
        }
    }
}

impl fmt::Debug for SetModuleFieldsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetModuleFieldsAction")
            .field("module", &self.name)
            .field("index", &self.index)
            .field("merge_key", &self.merge_key)
            .finish()
    }
}

impl EditAction for SetModuleFieldsAction {
    fn apply(&mut self, control: &mut ModuleControl) -> EditActionResult {
        self.swap(control)
    }

    fn undo(&mut self, control: &mut ModuleControl) -> EditActionResult {
        self.swap(control)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn merge(&mut self, other: Box<dyn EditAction>) -> Option<Box<dyn EditAction>> {
        let mergeable = (*other)
            .as_any()
            .downcast_ref::<SetModuleFieldsAction>()
            .is_some_and(|other| {
                self.merge_key.is_some()
                    && other.merge_key == self.merge_key
                    && other.index == self.index
                    && other.type_id == self.type_id
            });
        if mergeable {
            // `self` keeps the pre-edit module; `other`'s stash is the
            // intermediate state and is dropped.
            return None;
        }
        Some(other)
    }
}
