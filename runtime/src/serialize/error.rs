//! Error types for module serialization and deserialization.

use std::fmt;

/// Errors that can occur while turning a module into a [`Value`](super::Value)
/// or encoding a record.
#[derive(Debug)]
pub enum SerializeError {
    /// A field could not be converted to a [`Value`](super::Value).
    FieldError { field: String, message: String },
    /// The module type was registered without persistence support.
    NotSerializable { module: &'static str },
    /// RON encoding error.
    FormatError(String),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldError { field, message } if field.is_empty() => {
                write!(f, "failed to serialize value: {message}")
            }
            Self::FieldError { field, message } => {
                write!(f, "failed to serialize field '{field}': {message}")
            }
            Self::NotSerializable { module } => {
                write!(f, "module '{module}' does not support serialization")
            }
            Self::FormatError(msg) => write!(f, "format error: {msg}"),
        }
    }
}

impl std::error::Error for SerializeError {}

/// Errors that can occur while rebuilding modules from persisted records.
#[derive(Debug)]
pub enum DeserializeError {
    /// A required field was missing from the record.
    MissingField { field: String, module: String },
    /// A field value had an unexpected type.
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// The record names a module type that is not registered.
    UnknownModule { type_name: String },
    /// The record names a family no registered module type belongs to.
    UnknownFamily { name: String },
    /// The module type exists but does not belong to the control's family.
    FamilyMismatch {
        module: String,
        family: String,
        expected: String,
    },
    /// RON decoding error.
    FormatError(String),
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field, module } => {
                write!(f, "missing field '{field}' in module '{module}'")
            }
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => {
                write!(
                    f,
                    "type mismatch for '{field}': expected {expected}, found {found}"
                )
            }
            Self::UnknownModule { type_name } => {
                write!(f, "unknown module type '{type_name}'")
            }
            Self::UnknownFamily { name } => write!(f, "unknown module family '{name}'"),
            Self::FamilyMismatch {
                module,
                family,
                expected,
            } => {
                write!(
                    f,
                    "module '{module}' belongs to family '{family}', which does not derive from '{expected}'"
                )
            }
            Self::FormatError(msg) => write!(f, "format error: {msg}"),
        }
    }
}

impl std::error::Error for DeserializeError {}
