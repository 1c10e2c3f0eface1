//! Serialization of modules and controls.
//!
//! - [`Value`] is the format-agnostic field tree, produced by [`to_value`]
//!   and consumed by [`from_value`]
//! - [`SerializedControl`] / [`SerializedModuleRecord`] are the persisted
//!   layout: an ordered array of polymorphic records
//! - [`Format`] / [`encode`] / [`decode`] handle the RON text form
//!
//! Loading a control goes through [`ModuleRegistry::load_control`](crate::ModuleRegistry::load_control),
//! which resolves each record's type name to a registered module type.

mod error;
mod format;
mod record;
mod value;

pub use error::{DeserializeError, SerializeError};
pub use format::{Format, decode, encode};
pub use record::{SerializedControl, SerializedModuleRecord};
pub use value::{Value, from_value, to_value};
