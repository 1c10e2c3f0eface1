//! Module types known to the authoring tool.
//!
//! A [`ModuleCatalog`] wraps the runtime [`ModuleRegistry`] and adds what
//! only the editor needs: display names and custom editor drawers. Whether a
//! type has a custom drawer is decided once, at registration.

use std::collections::HashMap;
use std::fmt;

use modkit_runtime::{
    ConstructError, Module, ModuleControl, ModuleFamily, ModuleRegistry, ModuleType,
    RegisteredModule,
};

use crate::property::SerializedModule;
use crate::settings::EditorSettings;

/// Draws a module's whole editor body.
///
/// Receives the owning control (read-only) and the module's staged record.
/// Edits staged in the record are committed by the inspector.
pub type CustomDrawFn = fn(&mut egui::Ui, &ModuleControl, &mut SerializedModule);

/// Implemented by module types that replace the generic field editor.
pub trait CustomEditor: ModuleType {
    fn draw_editor(ui: &mut egui::Ui, control: &ModuleControl, module: &mut SerializedModule);
}

#[derive(Default)]
struct EditorEntry {
    display_name: Option<String>,
    custom_draw: Option<CustomDrawFn>,
}

/// Registry plus editor capabilities.
#[derive(Default)]
pub struct ModuleCatalog {
    registry: ModuleRegistry,
    editors: HashMap<&'static str, EditorEntry>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already populated registry. No type has a custom editor yet.
    pub fn from_registry(registry: ModuleRegistry) -> Self {
        Self {
            registry,
            editors: HashMap::new(),
        }
    }

    pub fn register<T: ModuleType + Default>(&mut self) {
        self.registry.register::<T>();
    }

    pub fn register_with<T, F>(&mut self, constructor: F)
    where
        T: ModuleType,
        F: Fn() -> Result<T, ConstructError> + Send + Sync + 'static,
    {
        self.registry.register_with::<T, F>(constructor);
    }

    pub fn register_readonly<T: ModuleType>(&mut self) {
        self.registry.register_readonly::<T>();
    }

    /// Register a type together with its custom drawer.
    pub fn register_with_editor<T: CustomEditor + Default>(&mut self) {
        self.registry.register::<T>();
        self.set_custom_editor::<T>();
    }

    /// Attach a custom drawer to a type registered elsewhere.
    pub fn set_custom_editor<T: CustomEditor>(&mut self) {
        if !self.registry.contains(T::NAME) {
            log::warn!("custom editor for unregistered module type '{}'", T::NAME);
        }
        self.editors.entry(T::NAME).or_default().custom_draw = Some(T::draw_editor);
    }

    /// Override the label shown for a type.
    pub fn set_display_name(&mut self, name: &str, label: impl Into<String>) {
        match self.registry.get(name) {
            Some(entry) => {
                self.editors.entry(entry.name()).or_default().display_name = Some(label.into());
            }
            None => log::warn!("display name for unregistered module type '{name}'"),
        }
    }

    /// Apply the display-name overrides from `settings`.
    pub fn apply_settings(&mut self, settings: &EditorSettings) {
        for (name, label) in &settings.display_names {
            self.set_display_name(name, label.clone());
        }
    }

    // -- queries --

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Label for a type: the override if one was set, else the type name.
    pub fn display_name(&self, name: &str) -> String {
        self.editors
            .get(name)
            .and_then(|entry| entry.display_name.clone())
            .unwrap_or_else(|| name.to_string())
    }

    pub fn custom_editor(&self, name: &str) -> Option<CustomDrawFn> {
        self.editors.get(name).and_then(|entry| entry.custom_draw)
    }

    pub fn has_custom_editor(&self, name: &str) -> bool {
        self.custom_editor(name).is_some()
    }

    /// Concrete types whose family derives from `base`, in registration order.
    pub fn candidates<'a>(
        &'a self,
        base: &'a ModuleFamily,
    ) -> impl Iterator<Item = &'a RegisteredModule> + 'a {
        self.registry.candidates(base)
    }

    pub fn construct(&self, name: &str) -> Result<Box<dyn Module>, ConstructError> {
        self.registry.construct(name)
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<_> = self
            .editors
            .iter()
            .filter(|(_, entry)| entry.custom_draw.is_some())
            .map(|(name, _)| *name)
            .collect();
        custom.sort_unstable();
        f.debug_struct("ModuleCatalog")
            .field("registry", &self.registry)
            .field("custom_editors", &custom)
            .finish()
    }
}
