//! Runtime reflection for modules.
//!
//! [`Reflect`] describes a module's declared fields and converts the
//! module into a [`Value`] tree. It is normally derived with
//! `#[derive(Reflect)]`; the derive skips fields starting with `_` and fields
//! marked `#[reflect(skip)]`, which is how runtime-only state stays out of
//! the editor.

use std::any::Any;

use crate::serialize::{SerializeError, Value};

/// Broad category of a reflected field, used to pick an editor widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    String,
    Vec3,
    Quat,
    /// Any other serializable type. Edited through its value tree.
    Opaque,
}

/// Static description of one reflected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field identifier as written in the struct (`"0"`, `"1"` for tuple structs).
    pub name: &'static str,
    /// Full Rust type name of the field.
    pub type_name: &'static str,
    pub kind: FieldKind,
}

impl FieldInfo {
    /// Human-readable label: `move_speed` becomes `"Move Speed"`.
    pub fn display_name(&self) -> String {
        display_name(self.name)
    }
}

/// Turn a snake_case identifier into a title-cased label.
pub fn display_name(ident: &str) -> String {
    ident
        .trim_start_matches('_')
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Field-level reflection for module types.
///
/// Object safe: the runtime stores modules as `Box<dyn Module>` and reaches
/// their fields through this trait.
///
/// # Deriving
///
/// ```ignore
/// #[derive(Default, Serialize, Deserialize, Reflect)]
/// struct Spin {
///     speed: f32,
/// }
/// ```
pub trait Reflect: Send + Sync + 'static {
    /// The registered type name (e.g. `"MoveX"`).
    fn module_name(&self) -> &'static str;

    /// Declared, editable fields in declaration order.
    fn field_infos(&self) -> &'static [FieldInfo];

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Serialize the persisted fields into a [`Value`] map.
    fn to_value(&self) -> Result<Value, SerializeError>;
}
