//! # modkit runtime
//!
//! Composes runtime behavior onto a host object from interchangeable,
//! independently serialized behavior units called *modules*.
//!
//! ## Core Types
//!
//! - [`Module`] : an attachable behavior with `on_attach` / `on_tick` hooks
//! - [`ModuleSlot`] : a module plus its non-owning back-reference to the owner
//! - [`ModuleControl`] : the composition root: owns the ordered slots, drives
//!   set-up and ticking, answers typed lookups
//! - [`ModuleFamily`] : the declared base type constraining which modules a
//!   control accepts
//! - [`ModuleRegistry`] : statically built catalog of concrete module types
//!
//! ## Reflection & Persistence
//!
//! - [`Reflect`] / [`FieldInfo`] : field-level reflection, usually derived
//! - [`serialize`] : the [`Value`](serialize::Value) tree, persisted records,
//!   and RON encoding
//!
//! The runtime has no dependency on any authoring tool. Editors build on the
//! public contract exposed here.

// Lets `#[derive(Reflect)]` expand to `::modkit_runtime::...` inside this crate.
extern crate self as modkit_runtime;

mod control;
mod family;
mod module;
mod reflect;
mod registry;
pub mod serialize;

pub use control::{ControlHook, ModuleControl};
pub use family::ModuleFamily;
pub use modkit_macro::Reflect;
pub use module::{ControlId, Module, ModuleContext, ModuleSlot, ModuleType};
pub use reflect::{FieldInfo, FieldKind, Reflect, display_name};
pub use registry::{ConstructError, ModuleRegistry, RegisteredModule};

pub use modkit_core::{FrameTime, Host, Transform, math};
