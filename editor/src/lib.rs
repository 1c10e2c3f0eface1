//! # modkit editor
//!
//! Authoring tools for module controls. Nothing here is needed at runtime;
//! the crate builds on the public contract of `modkit-runtime` only.
//!
//! - [`ModuleCatalog`] : registered module types plus display names and
//!   custom editor drawers
//! - [`AttachmentResolver`] : candidate types for a control and where each
//!   one sits in its collection; attach/detach by toggling
//! - [`SerializedModule`] / [`PropertyCursor`] : staged, path-addressed field
//!   edits committed as one undoable step
//! - [`draw_module_editor`] : the reflective egui field editor
//! - [`ModuleInspector`] : a complete panel combining the above
//! - [`ModuleDocument`] / [`EditHistory`] : undo/redo and save state
//!
//! # Usage
//!
//! ```ignore
//! let mut catalog = ModuleCatalog::from_registry(registry);
//! catalog.apply_settings(&settings);
//! let mut inspector = ModuleInspector::new(Arc::new(catalog), settings);
//! let mut doc = ModuleDocument::new(control, 100);
//!
//! // every frame
//! inspector.show(ui, &mut doc);
//! ```

mod action;
mod catalog;
mod document;
mod field_editor;
mod history;
mod inspector;
mod property;
mod resolver;
pub mod settings;

pub use action::{
    AsAny, AttachModuleAction, DetachModuleAction, EditAction, EditActionError,
    EditActionResult, SetModuleFieldsAction,
};
pub use catalog::{CustomDrawFn, CustomEditor, ModuleCatalog};
pub use document::{DocumentError, ModuleDocument};
pub use field_editor::{draw_fields, draw_module_editor};
pub use history::{DEFAULT_MAX_UNDO, EditHistory};
pub use inspector::ModuleInspector;
pub use property::{
    PathSegment, PropertyCursor, PropertyError, PropertyNode, SerializedModule, TYPE_FIELD,
    format_path, parse_path,
};
pub use resolver::{AttachError, AttachmentResolver, TypeInfo};
pub use settings::EditorSettings;
