//! Static catalog of concrete module types.
//!
//! Module types are registered explicitly at start-up. The registry is how
//! persisted records find their way back to Rust types, and how tooling
//! enumerates which modules a control may hold.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::control::ModuleControl;
use crate::family::ModuleFamily;
use crate::module::{Module, ModuleType};
use crate::serialize::{DeserializeError, SerializedControl, SerializedModuleRecord, Value};

/// Errors from building a fresh module instance.
#[derive(Debug)]
pub enum ConstructError {
    /// The type was registered read-only and has no constructor.
    NotConstructible { module: &'static str },
    /// The constructor ran and reported a failure.
    Failed { module: &'static str, message: String },
    /// No module type with this name is registered.
    UnknownModule { name: String },
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConstructible { module } => {
                write!(f, "module '{module}' cannot be constructed")
            }
            Self::Failed { module, message } => {
                write!(f, "failed to construct module '{module}': {message}")
            }
            Self::UnknownModule { name } => write!(f, "unknown module type '{name}'"),
        }
    }
}

impl std::error::Error for ConstructError {}

type Constructor = Box<dyn Fn() -> Result<Box<dyn Module>, ConstructError> + Send + Sync>;

/// Type-erased operations for one registered module type.
pub struct RegisteredModule {
    name: &'static str,
    type_id: TypeId,
    family: &'static ModuleFamily,
    /// Builds a default instance. `None` for read-only registrations.
    construct: Option<Constructor>,
    deserialize: fn(Value) -> Result<Box<dyn Module>, DeserializeError>,
}

impl RegisteredModule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn family(&self) -> &'static ModuleFamily {
        self.family
    }

    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }

    /// Build a fresh instance with its default field values.
    pub fn construct(&self) -> Result<Box<dyn Module>, ConstructError> {
        match &self.construct {
            Some(construct) => construct(),
            None => Err(ConstructError::NotConstructible { module: self.name }),
        }
    }

    /// Rebuild an instance from persisted field data.
    pub fn deserialize(&self, data: Value) -> Result<Box<dyn Module>, DeserializeError> {
        (self.deserialize)(data)
    }
}

impl fmt::Debug for RegisteredModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModule")
            .field("name", &self.name)
            .field("family", &self.family.name())
            .field("constructible", &self.is_constructible())
            .finish()
    }
}

fn deserialize_boxed<T: ModuleType>(data: Value) -> Result<Box<dyn Module>, DeserializeError> {
    Ok(Box::new(T::from_value(data)?))
}

/// Registry of module types, in registration order.
///
/// ```ignore
/// let mut registry = ModuleRegistry::new();
/// registry.register::<MoveX>();
/// registry.register::<Rotate>();
/// let control = registry.load_control(&saved)?;
/// ```
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<RegisteredModule>,
    by_name: HashMap<&'static str, usize>,
    by_type: HashMap<TypeId, usize>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module type constructed through `Default`.
    pub fn register<T: ModuleType + Default>(&mut self) {
        self.register_with::<T, _>(|| Ok(T::default()));
    }

    /// Register a module type with a fallible constructor.
    pub fn register_with<T, F>(&mut self, constructor: F)
    where
        T: ModuleType,
        F: Fn() -> Result<T, ConstructError> + Send + Sync + 'static,
    {
        let construct: Constructor =
            Box::new(move || constructor().map(|module| Box::new(module) as Box<dyn Module>));
        self.insert(RegisteredModule {
            name: T::NAME,
            type_id: TypeId::of::<T>(),
            family: T::family(),
            construct: Some(construct),
            deserialize: deserialize_boxed::<T>,
        });
    }

    /// Register a module type that can be loaded but never freshly constructed.
    pub fn register_readonly<T: ModuleType>(&mut self) {
        self.insert(RegisteredModule {
            name: T::NAME,
            type_id: TypeId::of::<T>(),
            family: T::family(),
            construct: None,
            deserialize: deserialize_boxed::<T>,
        });
    }

    fn insert(&mut self, entry: RegisteredModule) {
        if let Some(&index) = self.by_name.get(entry.name) {
            log::warn!(
                "module type '{}' registered twice; replacing the earlier registration",
                entry.name
            );
            self.by_type.remove(&self.entries[index].type_id);
            self.by_type.insert(entry.type_id, index);
            self.entries[index] = entry;
            return;
        }
        let index = self.entries.len();
        log::debug!("registered module type '{}' ({})", entry.name, entry.family);
        self.by_name.insert(entry.name, index);
        self.by_type.insert(entry.type_id, index);
        self.entries.push(entry);
    }

    // -- queries --

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredModule> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    pub fn get_by_type(&self, type_id: TypeId) -> Option<&RegisteredModule> {
        self.by_type.get(&type_id).map(|&index| &self.entries[index])
    }

    /// All registered types, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModule> {
        self.entries.iter()
    }

    /// Registered types whose family derives from `base`, in registration order.
    pub fn candidates<'a>(
        &'a self,
        base: &'a ModuleFamily,
    ) -> impl Iterator<Item = &'a RegisteredModule> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.family.derives_from(base))
    }

    /// Find a family by name among the registered types and their ancestors.
    pub fn family(&self, name: &str) -> Option<&'static ModuleFamily> {
        if name == ModuleFamily::ROOT.name() {
            return Some(&ModuleFamily::ROOT);
        }
        self.entries
            .iter()
            .flat_map(|entry| std::iter::successors(Some(entry.family), |family| family.parent()))
            .find(|family| family.name() == name)
    }

    // -- construction --

    /// Build a default instance of the named type.
    pub fn construct(&self, name: &str) -> Result<Box<dyn Module>, ConstructError> {
        self.get(name)
            .ok_or_else(|| ConstructError::UnknownModule {
                name: name.to_string(),
            })?
            .construct()
    }

    /// Rebuild a module from its persisted record.
    pub fn deserialize(
        &self,
        record: &SerializedModuleRecord,
    ) -> Result<Box<dyn Module>, DeserializeError> {
        let entry = self
            .get(&record.type_name)
            .ok_or_else(|| DeserializeError::UnknownModule {
                type_name: record.type_name.clone(),
            })?;
        entry.deserialize(record.data.clone())
    }

    /// Rebuild a whole control from its persisted form.
    ///
    /// Every record must name a registered type whose family derives from the
    /// control's family. Fails on the first bad record; nothing is returned
    /// partially loaded.
    pub fn load_control(&self, data: &SerializedControl) -> Result<ModuleControl, DeserializeError> {
        let family = self
            .family(&data.family)
            .ok_or_else(|| DeserializeError::UnknownFamily {
                name: data.family.clone(),
            })?;

        let mut control = ModuleControl::new(family);
        for record in &data.modules {
            let entry = self
                .get(&record.type_name)
                .ok_or_else(|| DeserializeError::UnknownModule {
                    type_name: record.type_name.clone(),
                })?;
            if !entry.family.derives_from(family) {
                return Err(DeserializeError::FamilyMismatch {
                    module: entry.name.to_string(),
                    family: entry.family.name().to_string(),
                    expected: family.name().to_string(),
                });
            }
            control.push_module(entry.deserialize(record.data.clone())?);
        }
        log::info!(
            "loaded {} with {} modules ({})",
            control.id(),
            control.len(),
            family
        );
        Ok(control)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}
