//! A control opened for editing.

use std::fmt;
use std::path::{Path, PathBuf};

use modkit_runtime::serialize::{
    DeserializeError, Format, SerializeError, SerializedControl, decode, encode,
};
use modkit_runtime::{ModuleControl, ModuleRegistry};

use crate::action::{EditAction, EditActionResult};
use crate::history::EditHistory;

/// Errors from loading or saving a document.
#[derive(Debug)]
pub enum DocumentError {
    Io { path: PathBuf, message: String },
    Serialize(SerializeError),
    Deserialize(DeserializeError),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Serialize(err) => write!(f, "{err}"),
            Self::Deserialize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<SerializeError> for DocumentError {
    fn from(err: SerializeError) -> Self {
        Self::Serialize(err)
    }
}

impl From<DeserializeError> for DocumentError {
    fn from(err: DeserializeError) -> Self {
        Self::Deserialize(err)
    }
}

/// A [`ModuleControl`] together with its edit history and save state.
///
/// All edits should go through [`execute`](Self::execute) so they can be
/// undone and so the document knows it is modified. `revision` increments on
/// every change and lets views cache derived state.
#[derive(Debug)]
pub struct ModuleDocument {
    control: ModuleControl,
    history: EditHistory,
    revision: u64,
    path: Option<PathBuf>,
}

impl ModuleDocument {
    pub fn new(control: ModuleControl, max_undo: usize) -> Self {
        Self {
            control,
            history: EditHistory::new(max_undo),
            revision: 0,
            path: None,
        }
    }

    /// Read and rebuild a control from a RON file.
    pub fn load(
        path: &Path,
        registry: &ModuleRegistry,
        max_undo: usize,
    ) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let data: SerializedControl = decode(&text)?;
        let control = registry.load_control(&data)?;
        log::info!("opened {} ({} modules)", path.display(), control.len());
        let mut doc = Self::new(control, max_undo);
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn control(&self) -> &ModuleControl {
        &self.control
    }

    /// Direct access that bypasses the history. Marks the document changed.
    pub fn control_mut(&mut self) -> &mut ModuleControl {
        self.touch();
        &mut self.control
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bump the revision so cached views rebuild.
    pub fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn execute(&mut self, action: Box<dyn EditAction>) -> EditActionResult {
        let description = action.description().to_string();
        self.history.execute(action, &mut self.control)?;
        log::debug!("{}: {description}", self.control.id());
        self.touch();
        Ok(())
    }

    pub fn undo(&mut self) -> EditActionResult {
        self.history.undo(&mut self.control)?;
        self.touch();
        Ok(())
    }

    pub fn redo(&mut self) -> EditActionResult {
        self.history.redo(&mut self.control)?;
        self.touch();
        Ok(())
    }

    /// Stop the next edit from merging into the previous undo step.
    pub fn break_merge(&mut self) {
        self.history.break_merge();
    }

    /// Whether the control differs from its last saved state.
    pub fn is_modified(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn save_to_string(&self, format: Format) -> Result<String, SerializeError> {
        encode(&self.control.save()?, format)
    }

    /// Write the control as pretty RON and mark the document saved.
    pub fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
        let text = self.save_to_string(Format::Ron)?;
        std::fs::write(path, text).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::info!("saved {} to {}", self.control.id(), path.display());
        self.path = Some(path.to_path_buf());
        self.mark_saved();
        Ok(())
    }
}
