//! Which candidate module types a control currently holds.
//!
//! The [`AttachmentResolver`] lists every registered type compatible with a
//! control's family and records, for each, where in the control's collection
//! it lives. Toggling an entry attaches a default-constructed instance at the
//! tail or detaches the resolved one, through the document's edit history.

use std::any::TypeId;
use std::fmt;

use modkit_runtime::{ConstructError, ModuleControl, ModuleFamily};

use crate::action::{AttachModuleAction, DetachModuleAction, EditActionError};
use crate::catalog::ModuleCatalog;
use crate::document::ModuleDocument;

/// Errors from attaching or detaching through the resolver.
#[derive(Debug)]
pub enum AttachError {
    /// The type is not among the control's candidates.
    UnknownType { type_name: String },
    /// The type was registered read-only.
    NotConstructible { type_name: &'static str },
    /// The type's constructor failed.
    Construction {
        type_name: &'static str,
        message: String,
    },
    /// The built module's family does not derive from the control's.
    FamilyMismatch {
        type_name: &'static str,
        family: &'static str,
        expected: &'static str,
    },
    AlreadyAttached { type_name: &'static str, index: usize },
    NotAttached { type_name: &'static str },
    Edit(EditActionError),
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { type_name } => {
                write!(f, "'{type_name}' is not a module type this control accepts")
            }
            Self::NotConstructible { type_name } => {
                write!(f, "'{type_name}' cannot be created from the editor")
            }
            Self::Construction { type_name, message } => {
                write!(f, "failed to create '{type_name}': {message}")
            }
            Self::FamilyMismatch {
                type_name,
                family,
                expected,
            } => write!(
                f,
                "'{type_name}' belongs to '{family}', which does not derive from '{expected}'"
            ),
            Self::AlreadyAttached { type_name, index } => {
                write!(f, "'{type_name}' is already attached at {index}")
            }
            Self::NotAttached { type_name } => write!(f, "'{type_name}' is not attached"),
            Self::Edit(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AttachError {}

impl From<EditActionError> for AttachError {
    fn from(err: EditActionError) -> Self {
        Self::Edit(err)
    }
}

/// One candidate type and where it sits in the control.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub name: &'static str,
    pub display_name: String,
    pub type_id: TypeId,
    /// Index in the control's collection; `None` when absent.
    pub index: Option<usize>,
    /// Whether the type draws its own editor.
    pub custom_editor: bool,
    /// Whether the editor can create a fresh instance.
    pub constructible: bool,
}

impl TypeInfo {
    pub fn is_attached(&self) -> bool {
        self.index.is_some()
    }
}

/// Candidate types for one control, with their resolved indices.
#[derive(Debug, Clone)]
pub struct AttachmentResolver {
    family: &'static ModuleFamily,
    entries: Vec<TypeInfo>,
    /// Document revision the indices were last computed against.
    revision: Option<u64>,
}

impl AttachmentResolver {
    /// Discover the candidates for `control` and resolve them.
    pub fn new(catalog: &ModuleCatalog, control: &ModuleControl) -> Self {
        let family = control.module_family();
        let entries = catalog
            .candidates(family)
            .map(|entry| TypeInfo {
                name: entry.name(),
                display_name: catalog.display_name(entry.name()),
                type_id: entry.type_id(),
                index: None,
                custom_editor: catalog.has_custom_editor(entry.name()),
                constructible: entry.is_constructible(),
            })
            .collect();
        let mut resolver = Self {
            family,
            entries,
            revision: None,
        };
        resolver.rebuild(control);
        resolver
    }

    pub fn family(&self) -> &'static ModuleFamily {
        self.family
    }

    /// Recompute every entry's index. With duplicates, the last one wins.
    pub fn rebuild(&mut self, control: &ModuleControl) {
        for entry in &mut self.entries {
            entry.index = control
                .slots()
                .iter()
                .rposition(|slot| slot.module_type_id() == entry.type_id);
        }
    }

    /// Rebuild if the document changed since the last sync.
    pub fn sync(&mut self, doc: &ModuleDocument) {
        if self.revision != Some(doc.revision()) {
            self.rebuild(doc.control());
            self.revision = Some(doc.revision());
        }
    }

    pub fn entries(&self) -> &[TypeInfo] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&TypeInfo> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Attach if absent, detach if present. Returns whether it is now attached.
    pub fn toggle(
        &mut self,
        catalog: &ModuleCatalog,
        doc: &mut ModuleDocument,
        name: &str,
    ) -> Result<bool, AttachError> {
        self.sync(doc);
        let attached = self.lookup(name)?.is_attached();
        if attached {
            self.detach(doc, name)?;
        } else {
            self.attach(catalog, doc, name)?;
        }
        Ok(!attached)
    }

    /// Append a default instance of `name`. Returns its index.
    ///
    /// On failure nothing is changed and a warning is logged.
    pub fn attach(
        &mut self,
        catalog: &ModuleCatalog,
        doc: &mut ModuleDocument,
        name: &str,
    ) -> Result<usize, AttachError> {
        let result = self.try_attach(catalog, doc, name);
        if let Err(err) = &result {
            log::warn!("attach {name} to {}: {err}", doc.control().id());
        }
        result
    }

    fn try_attach(
        &mut self,
        catalog: &ModuleCatalog,
        doc: &mut ModuleDocument,
        name: &str,
    ) -> Result<usize, AttachError> {
        self.sync(doc);
        let info = self.lookup(name)?;
        let type_name = info.name;
        if let Some(index) = info.index {
            return Err(AttachError::AlreadyAttached { type_name, index });
        }

        let module = catalog.construct(type_name).map_err(|err| match err {
            ConstructError::NotConstructible { .. } => AttachError::NotConstructible { type_name },
            ConstructError::Failed { message, .. } => AttachError::Construction { type_name, message },
            ConstructError::UnknownModule { .. } => AttachError::UnknownType {
                type_name: type_name.to_string(),
            },
        })?;

        if let Some(entry) = catalog.registry().get(type_name)
            && !entry.family().derives_from(self.family)
        {
            return Err(AttachError::FamilyMismatch {
                type_name,
                family: entry.family().name(),
                expected: self.family.name(),
            });
        }

        doc.execute(Box::new(AttachModuleAction::new(module)))?;
        self.sync(doc);
        let index = doc.control().len() - 1;
        log::debug!("{}: attached {type_name} at {index}", doc.control().id());
        Ok(index)
    }

    /// Remove the resolved instance of `name`. Later modules shift down.
    ///
    /// On failure nothing is changed and a warning is logged.
    pub fn detach(&mut self, doc: &mut ModuleDocument, name: &str) -> Result<(), AttachError> {
        self.sync(doc);
        let result = self.lookup(name).and_then(|info| {
            let index = info
                .index
                .ok_or(AttachError::NotAttached { type_name: info.name })?;
            Ok(DetachModuleAction::new(index, info.type_id, info.name))
        });
        let result = result.and_then(|action| {
            doc.execute(Box::new(action))?;
            Ok(())
        });
        match &result {
            Ok(()) => {
                self.sync(doc);
                log::debug!("{}: detached {name}", doc.control().id());
            }
            Err(err) => log::warn!("detach {name} from {}: {err}", doc.control().id()),
        }
        result
    }

    fn lookup(&self, name: &str) -> Result<&TypeInfo, AttachError> {
        self.entry(name).ok_or_else(|| AttachError::UnknownType {
            type_name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use modkit_runtime::{Module, Reflect};

    static WAVES: ModuleFamily = ModuleFamily::new("Waves", &ModuleFamily::ROOT);
    static OTHER: ModuleFamily = ModuleFamily::new("Other", &ModuleFamily::ROOT);

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = WAVES)]
    struct Sine {
        period: f32,
    }
    impl Module for Sine {}

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = WAVES)]
    struct Square {
        duty: f32,
    }
    impl Module for Square {}

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = WAVES)]
    struct Saw {
        slope: f32,
    }
    impl Module for Saw {}

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = OTHER)]
    struct Stray {
        x: f32,
    }
    impl Module for Stray {}

    fn catalog() -> ModuleCatalog {
        let mut catalog = ModuleCatalog::new();
        catalog.register::<Sine>();
        catalog.register::<Square>();
        catalog.register::<Saw>();
        catalog.register::<Stray>();
        catalog
    }

    fn order(doc: &ModuleDocument) -> Vec<&'static str> {
        doc.control().iter().map(|m| m.module_name()).collect()
    }

    #[test]
    fn candidates_only_from_family() {
        let catalog = catalog();
        let control = ModuleControl::new(&WAVES);
        let resolver = AttachmentResolver::new(&catalog, &control);
        let names: Vec<_> = resolver.entries().iter().map(|e| e.name).collect();
        assert_eq!(names, ["Sine", "Square", "Saw"]);
        assert!(resolver.entries().iter().all(|e| e.index.is_none()));
    }

    #[test]
    fn toggle_round_trip() {
        let catalog = catalog();
        let mut doc = ModuleDocument::new(ModuleControl::new(&WAVES), 10);
        let mut resolver = AttachmentResolver::new(&catalog, doc.control());

        assert!(resolver.toggle(&catalog, &mut doc, "Square").unwrap());
        assert_eq!(resolver.entry("Square").unwrap().index, Some(0));
        assert!(doc.is_modified());

        assert!(!resolver.toggle(&catalog, &mut doc, "Square").unwrap());
        assert_eq!(resolver.entry("Square").unwrap().index, None);
        assert!(doc.control().is_empty());
    }

    #[test]
    fn detaching_middle_shifts_later_indices() {
        let catalog = catalog();
        let mut doc = ModuleDocument::new(ModuleControl::new(&WAVES), 10);
        let mut resolver = AttachmentResolver::new(&catalog, doc.control());
        for name in ["Sine", "Square", "Saw"] {
            resolver.attach(&catalog, &mut doc, name).unwrap();
        }

        resolver.detach(&mut doc, "Square").unwrap();
        assert_eq!(order(&doc), ["Sine", "Saw"]);
        assert_eq!(resolver.entry("Sine").unwrap().index, Some(0));
        assert_eq!(resolver.entry("Square").unwrap().index, None);
        assert_eq!(resolver.entry("Saw").unwrap().index, Some(1));
    }

    #[test]
    fn reattach_lands_at_the_tail() {
        let catalog = catalog();
        let mut doc = ModuleDocument::new(ModuleControl::new(&WAVES), 10);
        let mut resolver = AttachmentResolver::new(&catalog, doc.control());
        resolver.attach(&catalog, &mut doc, "Sine").unwrap();
        resolver.attach(&catalog, &mut doc, "Square").unwrap();

        resolver.detach(&mut doc, "Sine").unwrap();
        assert_eq!(resolver.attach(&catalog, &mut doc, "Sine").unwrap(), 1);
        assert_eq!(order(&doc), ["Square", "Sine"]);
    }

    #[test]
    fn reattach_starts_from_defaults() {
        use crate::property::SerializedModule;
        use modkit_runtime::serialize::Value;

        let catalog = catalog();
        let mut doc = ModuleDocument::new(ModuleControl::new(&WAVES), 10);
        let mut resolver = AttachmentResolver::new(&catalog, doc.control());
        resolver.attach(&catalog, &mut doc, "Sine").unwrap();
        resolver.attach(&catalog, &mut doc, "Saw").unwrap();

        let mut snapshot = SerializedModule::from_control(doc.control(), 0).unwrap();
        snapshot.set_property("period", Value::F32(5.0)).unwrap();
        snapshot
            .apply_modified_properties(&mut doc, catalog.registry())
            .unwrap();
        assert_eq!(doc.control().find::<Sine>().unwrap().period, 5.0);

        resolver.detach(&mut doc, "Sine").unwrap();
        assert_eq!(doc.control().len(), 1);
        resolver.attach(&catalog, &mut doc, "Sine").unwrap();
        assert_eq!(doc.control().len(), 2);
        assert_eq!(doc.control().find::<Sine>().unwrap().period, 0.0);
    }

    #[test]
    fn toggle_sees_changes_made_behind_its_back() {
        let catalog = catalog();
        let mut doc = ModuleDocument::new(ModuleControl::new(&WAVES), 10);
        let mut resolver = AttachmentResolver::new(&catalog, doc.control());

        assert!(resolver.toggle(&catalog, &mut doc, "Sine").unwrap());
        doc.undo().unwrap();
        assert!(resolver.toggle(&catalog, &mut doc, "Sine").unwrap());
        assert_eq!(doc.control().len(), 1);

        doc.control_mut().remove_module(0);
        assert!(resolver.toggle(&catalog, &mut doc, "Sine").unwrap());
        assert_eq!(order(&doc), ["Sine"]);
    }

    #[test]
    fn undo_detach_restores_position() {
        let catalog = catalog();
        let mut doc = ModuleDocument::new(ModuleControl::new(&WAVES), 10);
        let mut resolver = AttachmentResolver::new(&catalog, doc.control());
        for name in ["Sine", "Square", "Saw"] {
            resolver.attach(&catalog, &mut doc, name).unwrap();
        }
        resolver.detach(&mut doc, "Sine").unwrap();
        doc.undo().unwrap();
        resolver.sync(&doc);
        assert_eq!(order(&doc), ["Sine", "Square", "Saw"]);
        assert_eq!(resolver.entry("Sine").unwrap().index, Some(0));
    }

    #[test]
    fn duplicates_resolve_to_the_last() {
        let catalog = catalog();
        let mut control = ModuleControl::new(&WAVES);
        control.push_module(Box::new(Sine { period: 1.0 }));
        control.push_module(Box::new(Saw::default()));
        control.push_module(Box::new(Sine { period: 2.0 }));
        let resolver = AttachmentResolver::new(&catalog, &control);
        assert_eq!(resolver.entry("Sine").unwrap().index, Some(2));
        assert_eq!(control.find::<Sine>().unwrap().period, 1.0);
    }

    #[test]
    fn failures_leave_the_control_unchanged() {
        let mut catalog = ModuleCatalog::new();
        catalog.register_readonly::<Sine>();
        catalog.register_with::<Square, _>(|| {
            Err(ConstructError::Failed {
                module: "Square",
                message: "no duty cycle".into(),
            })
        });
        let mut doc = ModuleDocument::new(ModuleControl::new(&WAVES), 10);
        let mut resolver = AttachmentResolver::new(&catalog, doc.control());

        assert!(matches!(
            resolver.attach(&catalog, &mut doc, "Sine"),
            Err(AttachError::NotConstructible { type_name: "Sine" })
        ));
        assert!(matches!(
            resolver.toggle(&catalog, &mut doc, "Square"),
            Err(AttachError::Construction { .. })
        ));
        assert!(matches!(
            resolver.attach(&catalog, &mut doc, "Stray"),
            Err(AttachError::UnknownType { .. })
        ));
        assert!(matches!(
            resolver.detach(&mut doc, "Sine"),
            Err(AttachError::NotAttached { .. })
        ));
        assert!(doc.control().is_empty());
        assert!(!doc.is_modified());
        assert!(!resolver.entry("Sine").unwrap().constructible);
    }
}
