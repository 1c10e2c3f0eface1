//! Persisted layout of a composition root.
//!
//! A [`SerializedControl`] is the on-disk form of a
//! [`ModuleControl`](crate::ModuleControl): the declared family plus one
//! polymorphic record per module, in tick order.

use serde::{Deserialize, Serialize};

use super::value::Value;

/// All modules of one control, in collection order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedControl {
    /// Name of the control's declared [`ModuleFamily`](crate::ModuleFamily).
    pub family: String,
    pub modules: Vec<SerializedModuleRecord>,
}

/// A single module's persisted data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedModuleRecord {
    /// The registered type name (matches [`ModuleType::NAME`](crate::ModuleType::NAME)).
    pub type_name: String,
    /// The module's persisted fields.
    pub data: Value,
}

impl SerializedControl {
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|record| record.type_name.as_str())
    }
}
