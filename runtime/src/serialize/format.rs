//! Text encoding for persisted controls.

use super::error::{DeserializeError, SerializeError};

/// Supported encodings. Both are RON; they differ only in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Indented, one field per line. Used for files checked into a project.
    #[default]
    Ron,
    /// Single line.
    RonCompact,
}

/// Encode a serde-serializable value as text in the given format.
pub fn encode<T: serde::Serialize>(value: &T, format: Format) -> Result<String, SerializeError> {
    let result = match format {
        Format::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()),
        Format::RonCompact => ron::to_string(value),
    };
    result.map_err(|e| SerializeError::FormatError(e.to_string()))
}

/// Decode text into a serde-deserializable type. Both formats share a parser.
pub fn decode<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, DeserializeError> {
    ron::from_str(text).map_err(|e| DeserializeError::FormatError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{SerializedControl, SerializedModuleRecord, Value};

    fn control() -> SerializedControl {
        SerializedControl {
            family: "Sample".into(),
            modules: vec![
                SerializedModuleRecord {
                    type_name: "MoveY".into(),
                    data: Value::Map(vec![("amplitude".into(), Value::F32(0.5))]),
                },
                SerializedModuleRecord {
                    type_name: "MoveX".into(),
                    data: Value::Map(vec![("amplitude".into(), Value::F32(2.0))]),
                },
            ],
        }
    }

    #[test]
    fn both_layouts_decode_to_the_same_order() {
        for format in [Format::Ron, Format::RonCompact] {
            let text = encode(&control(), format).unwrap();
            let decoded: SerializedControl = decode(&text).unwrap();
            assert_eq!(decoded.family, "Sample");
            assert_eq!(decoded.type_names().collect::<Vec<_>>(), ["MoveY", "MoveX"]);
            assert_eq!(
                decoded.modules[1].data.get("amplitude").and_then(Value::as_f64),
                Some(2.0)
            );
        }
    }

    #[test]
    fn compact_is_single_line() {
        let text = encode(&control(), Format::RonCompact).unwrap();
        assert!(!text.contains('\n'));
    }

    #[test]
    fn garbage_is_a_format_error() {
        let err = decode::<SerializedControl>("(family: ").unwrap_err();
        assert!(matches!(err, DeserializeError::FormatError(_)));
    }
}
