//! Staged, path-addressed editing of one module's serialized fields.
//!
//! A [`SerializedModule`] is a snapshot of a module taken from its control.
//! Edits go into the snapshot first and reach the live module only when
//! [`apply_modified_properties`](SerializedModule::apply_modified_properties)
//! commits them as a single undoable action.
//!
//! The record is flattened into a pre-order list of property nodes. The first
//! node is always the read-only `$type` discriminator; top-level fields sit at
//! depth 0 and the elements of lists and maps one level below their parent.

use std::any::TypeId;
use std::fmt;

use modkit_runtime::serialize::{DeserializeError, SerializeError, Value};
use modkit_runtime::{FieldKind, ModuleControl, ModuleRegistry, display_name};

use crate::action::{EditActionError, SetModuleFieldsAction};
use crate::document::ModuleDocument;

/// Key of the type discriminator written at the front of every record.
pub const TYPE_FIELD: &str = "$type";

/// Errors from reading or staging property edits.
#[derive(Debug)]
pub enum PropertyError {
    /// No property lives at this path.
    UnknownPath(String),
    /// The new value does not fit the property.
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// The property cannot be written (the type discriminator, or a group).
    ReadOnly(String),
    /// No module at this index, or a different type than the snapshot.
    UnknownModule { index: usize },
    Serialize(SerializeError),
    Deserialize(DeserializeError),
    Edit(EditActionError),
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPath(path) => write!(f, "no property at '{path}'"),
            Self::TypeMismatch {
                path,
                expected,
                found,
            } => write!(f, "property '{path}' expects {expected}, got {found}"),
            Self::ReadOnly(path) => write!(f, "property '{path}' is read-only"),
            Self::UnknownModule { index } => write!(f, "no module at index {index}"),
            Self::Serialize(err) => write!(f, "{err}"),
            Self::Deserialize(err) => write!(f, "{err}"),
            Self::Edit(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PropertyError {}

impl From<SerializeError> for PropertyError {
    fn from(err: SerializeError) -> Self {
        Self::Serialize(err)
    }
}

impl From<DeserializeError> for PropertyError {
    fn from(err: DeserializeError) -> Self {
        Self::Deserialize(err)
    }
}

impl From<EditActionError> for PropertyError {
    fn from(err: EditActionError) -> Self {
        Self::Edit(err)
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// One step into a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Render a path as `speed`, `axis[1]` or `limits.upper`.
pub fn format_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) if out.is_empty() => out.push_str(key),
            PathSegment::Key(key) => {
                out.push('.');
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// Parse the notation produced by [`format_path`].
pub fn parse_path(text: &str) -> Option<Vec<PathSegment>> {
    let mut segments = Vec::new();
    for part in text.split('.') {
        let (key, mut rest) = part.split_at(part.find('[').unwrap_or(part.len()));
        if key.is_empty() {
            return None;
        }
        segments.push(PathSegment::Key(key.to_string()));
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            segments.push(PathSegment::Index(inner[..close].parse().ok()?));
            rest = &inner[close + 1..];
        }
    }
    Some(segments)
}

fn value_at<'a>(root: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    path.iter().try_fold(root, |value, segment| match segment {
        PathSegment::Key(key) => value.get(key),
        PathSegment::Index(index) => value.at(*index),
    })
}

fn value_at_mut<'a>(root: &'a mut Value, path: &[PathSegment]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |value, segment| match segment {
        PathSegment::Key(key) => value.get_mut(key),
        PathSegment::Index(index) => value.at_mut(*index),
    })
}

/// Fit `new` into the slot currently holding `current`.
///
/// Numbers convert between numeric variants so a widget may hand back an
/// `f64` for an `f32` field. Everything else must match exactly.
fn coerce(current: &Value, new: Value) -> Option<Value> {
    if current.same_kind(&new) {
        return Some(new);
    }
    let number = new.as_f64()?;
    match current {
        Value::F32(_) => Some(Value::F32(number as f32)),
        Value::F64(_) => Some(Value::F64(number)),
        Value::I64(_) => match new {
            Value::U64(v) => i64::try_from(v).ok().map(Value::I64),
            _ => None,
        },
        Value::U64(_) => match new {
            Value::I64(v) => u64::try_from(v).ok().map(Value::U64),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// SerializedModule
// ---------------------------------------------------------------------------

/// One visible entry of a flattened record.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub path: Vec<PathSegment>,
    pub depth: usize,
    pub display_name: String,
    /// Reflected kind, when known.
    pub kind: Option<FieldKind>,
}

/// Editable snapshot of the module at one index of a control.
#[derive(Debug, Clone)]
pub struct SerializedModule {
    index: usize,
    type_name: &'static str,
    type_id: TypeId,
    record: Value,
    original: Value,
    nodes: Vec<PropertyNode>,
    last_edited: Option<String>,
}

impl SerializedModule {
    /// Snapshot the module at `index`.
    pub fn from_control(control: &ModuleControl, index: usize) -> Result<Self, PropertyError> {
        let slot = control
            .slot(index)
            .ok_or(PropertyError::UnknownModule { index })?;
        let module = slot.module();
        let mut entries = vec![(
            TYPE_FIELD.to_string(),
            Value::String(module.module_name().to_string()),
        )];
        match module.to_value()? {
            Value::Map(fields) => entries.extend(fields),
            Value::Null => {}
            other => {
                return Err(PropertyError::Serialize(SerializeError::FieldError {
                    field: String::new(),
                    message: format!(
                        "module '{}' serialized to {}, expected a field map",
                        module.module_name(),
                        other.kind_name()
                    ),
                }));
            }
        }
        let record = Value::Map(entries);

        let mut nodes = Vec::new();
        if let Value::Map(entries) = &record {
            for (key, value) in entries {
                let info = module.field_infos().iter().find(|info| info.name == key);
                let label = if key == TYPE_FIELD {
                    "Type".to_string()
                } else {
                    info.map_or_else(|| display_name(key), |info| info.display_name())
                };
                let path = vec![PathSegment::Key(key.clone())];
                flatten(value, path, 0, label, info.map(|info| info.kind), &mut nodes);
            }
        }

        Ok(Self {
            index,
            type_name: module.module_name(),
            type_id: slot.module_type_id(),
            original: record.clone(),
            record,
            nodes,
            last_edited: None,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The staged record, `$type` first.
    pub fn record(&self) -> &Value {
        &self.record
    }

    pub fn nodes(&self) -> &[PropertyNode] {
        &self.nodes
    }

    /// A cursor positioned before the first property.
    pub fn cursor(&mut self) -> PropertyCursor<'_> {
        PropertyCursor {
            module: self,
            pos: None,
        }
    }

    /// Staged value at `path` (`"speed"`, `"axis[1]"`).
    pub fn find_property(&self, path: &str) -> Option<&Value> {
        value_at(&self.record, &parse_path(path)?)
    }

    /// Stage a new value at `path`.
    pub fn set_property(&mut self, path: &str, value: Value) -> Result<(), PropertyError> {
        let node = parse_path(path)
            .and_then(|segments| self.nodes.iter().position(|node| node.path == segments))
            .ok_or_else(|| PropertyError::UnknownPath(path.to_string()))?;
        self.set_node(node, value)
    }

    fn set_node(&mut self, node: usize, value: Value) -> Result<(), PropertyError> {
        let path = &self.nodes[node].path;
        let text = format_path(path);
        if matches!(path.as_slice(), [PathSegment::Key(key)] if key == TYPE_FIELD) {
            return Err(PropertyError::ReadOnly(text));
        }
        let slot = value_at_mut(&mut self.record, path)
            .ok_or_else(|| PropertyError::UnknownPath(text.clone()))?;
        if slot.is_group() {
            return Err(PropertyError::ReadOnly(text));
        }
        let found = value.kind_name();
        let value = coerce(slot, value).ok_or_else(|| PropertyError::TypeMismatch {
            path: text.clone(),
            expected: slot.kind_name(),
            found,
        })?;
        if *slot != value {
            *slot = value;
            self.last_edited = Some(text);
        }
        Ok(())
    }

    /// Whether any staged value differs from the snapshot.
    pub fn is_modified(&self) -> bool {
        self.record != self.original
    }

    /// Drop all staged edits.
    pub fn revert(&mut self) {
        self.record = self.original.clone();
        self.last_edited = None;
    }

    /// Re-read the live module if nothing is staged.
    ///
    /// Returns `true` when the snapshot changed. Fails when the index no
    /// longer holds a module of the snapshot's type.
    pub fn update_if_required(&mut self, control: &ModuleControl) -> Result<bool, PropertyError> {
        let fresh = Self::from_control(control, self.index)?;
        if fresh.type_id != self.type_id {
            return Err(PropertyError::UnknownModule { index: self.index });
        }
        if self.is_modified() || fresh.original == self.original {
            return Ok(false);
        }
        *self = fresh;
        Ok(true)
    }

    /// Commit staged edits to the live module as one undoable step.
    ///
    /// Rebuilds the module from the staged record through the registry and
    /// swaps it in. Returns `false` when nothing was staged. A record that
    /// fails to deserialize leaves the document and the staged edits as they
    /// were.
    pub fn apply_modified_properties(
        &mut self,
        doc: &mut ModuleDocument,
        registry: &ModuleRegistry,
    ) -> Result<bool, PropertyError> {
        if !self.is_modified() {
            return Ok(false);
        }
        let entry = registry
            .get_by_type(self.type_id)
            .ok_or(PropertyError::UnknownModule { index: self.index })?;
        let module = entry.deserialize(self.field_values())?;
        let action = SetModuleFieldsAction::new(self.index, module, self.last_edited.clone());
        doc.execute(Box::new(action))?;
        log::debug!("committed edits to {} at {}", self.type_name, self.index);
        *self = Self::from_control(doc.control(), self.index)?;
        Ok(true)
    }

    /// The staged record without the type discriminator.
    fn field_values(&self) -> Value {
        match &self.record {
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .filter(|(key, _)| key != TYPE_FIELD)
                    .cloned()
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

fn flatten(
    value: &Value,
    path: Vec<PathSegment>,
    depth: usize,
    label: String,
    kind: Option<FieldKind>,
    nodes: &mut Vec<PropertyNode>,
) {
    nodes.push(PropertyNode {
        path: path.clone(),
        depth,
        display_name: label,
        kind,
    });
    match value {
        Value::List(items) => {
            const AXES: [&str; 4] = ["X", "Y", "Z", "W"];
            let vector = matches!(kind, Some(FieldKind::Vec3 | FieldKind::Quat));
            for (i, item) in items.iter().enumerate() {
                let (label, child_kind) = match AXES.get(i) {
                    Some(axis) if vector => (axis.to_string(), Some(FieldKind::F32)),
                    _ => (format!("Element {i}"), None),
                };
                let mut child = path.clone();
                child.push(PathSegment::Index(i));
                flatten(item, child, depth + 1, label, child_kind, nodes);
            }
        }
        Value::Map(entries) => {
            for (key, item) in entries {
                let mut child = path.clone();
                child.push(PathSegment::Key(key.clone()));
                flatten(item, child, depth + 1, display_name(key), None, nodes);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Forward-only walk over a [`SerializedModule`]'s properties.
///
/// ```ignore
/// let mut cursor = snapshot.cursor();
/// let mut enter = true;
/// while cursor.next_visible(enter) {
///     enter = cursor.has_children() && is_open(cursor.path());
///     draw(cursor.display_name(), cursor.value());
/// }
/// ```
pub struct PropertyCursor<'a> {
    module: &'a mut SerializedModule,
    pos: Option<usize>,
}

impl PropertyCursor<'_> {
    /// Advance to the next visible property.
    ///
    /// With `enter_children` the cursor steps into the current property's
    /// children; otherwise it skips them. Returns `false` once the module's
    /// properties are exhausted.
    pub fn next_visible(&mut self, enter_children: bool) -> bool {
        let nodes = &self.module.nodes;
        if self.pos.is_some_and(|pos| pos >= nodes.len()) {
            return false;
        }
        let next = match self.pos {
            None => 0,
            Some(pos) if enter_children => pos + 1,
            Some(pos) => {
                let depth = nodes[pos].depth;
                nodes[pos + 1..]
                    .iter()
                    .position(|node| node.depth <= depth)
                    .map_or(nodes.len(), |offset| pos + 1 + offset)
            }
        };
        if next < nodes.len() {
            self.pos = Some(next);
            true
        } else {
            self.pos = Some(nodes.len());
            false
        }
    }

    fn node(&self) -> Option<&PropertyNode> {
        self.pos.and_then(|pos| self.module.nodes.get(pos))
    }

    pub fn depth(&self) -> usize {
        self.node().map_or(0, |node| node.depth)
    }

    pub fn display_name(&self) -> &str {
        self.node().map_or("", |node| node.display_name.as_str())
    }

    /// Path of the current property in `axis[1]` notation.
    pub fn path(&self) -> String {
        self.node()
            .map(|node| format_path(&node.path))
            .unwrap_or_default()
    }

    pub fn kind(&self) -> Option<FieldKind> {
        self.node().and_then(|node| node.kind)
    }

    pub fn value(&self) -> Option<&Value> {
        self.node()
            .and_then(|node| value_at(&self.module.record, &node.path))
    }

    pub fn has_children(&self) -> bool {
        self.value().is_some_and(Value::is_group)
    }

    pub fn is_type_field(&self) -> bool {
        self.node().is_some_and(|node| {
            matches!(node.path.as_slice(), [PathSegment::Key(key)] if key == TYPE_FIELD)
        })
    }

    /// Stage a new value for the current property.
    pub fn set_value(&mut self, value: Value) -> Result<(), PropertyError> {
        match self.pos {
            Some(pos) if pos < self.module.nodes.len() => self.module.set_node(pos, value),
            _ => Err(PropertyError::UnknownPath(String::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use modkit_runtime::math::Vec3;
    use modkit_runtime::{Module, ModuleFamily, Reflect};

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = ModuleFamily::ROOT)]
    struct Orbit {
        radius: f32,
        axis: Vec3,
        label: String,
        #[serde(skip)]
        _angle: f32,
    }
    impl Module for Orbit {}

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = ModuleFamily::ROOT)]
    struct Route {
        points: Vec<i32>,
        looping: bool,
    }
    impl Module for Route {}

    fn control() -> ModuleControl {
        let mut control = ModuleControl::new(&ModuleFamily::ROOT);
        control.push_module(Box::new(Orbit {
            radius: 2.0,
            axis: Vec3::Y,
            label: "moon".into(),
            _angle: 0.3,
        }));
        control.push_module(Box::new(Route {
            points: vec![4, 5],
            looping: true,
        }));
        control
    }

    fn walk(snapshot: &mut SerializedModule, enter: bool) -> Vec<(usize, String)> {
        let mut cursor = snapshot.cursor();
        let mut out = Vec::new();
        let mut step = true;
        while cursor.next_visible(step) {
            out.push((cursor.depth(), cursor.display_name().to_string()));
            step = enter;
        }
        out
    }

    #[test]
    fn paths_round_trip_through_text() {
        let path = parse_path("axis[1]").unwrap();
        assert_eq!(
            path,
            [PathSegment::Key("axis".into()), PathSegment::Index(1)]
        );
        assert_eq!(format_path(&path), "axis[1]");
        assert_eq!(
            format_path(&parse_path("limits.upper[0][2]").unwrap()),
            "limits.upper[0][2]"
        );
        assert!(parse_path("[0]").is_none());
        assert!(parse_path("axis[x]").is_none());
        assert!(parse_path("axis[1").is_none());
    }

    #[test]
    fn record_starts_with_type_and_hides_runtime_state() {
        let snapshot = SerializedModule::from_control(&control(), 0).unwrap();
        assert_eq!(snapshot.type_name(), "Orbit");
        let Value::Map(entries) = snapshot.record() else {
            panic!("record is not a map");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, [TYPE_FIELD, "radius", "axis", "label"]);
    }

    #[test]
    fn cursor_enters_children_in_pre_order() {
        let mut snapshot = SerializedModule::from_control(&control(), 0).unwrap();
        let all = walk(&mut snapshot, true);
        let names: Vec<_> = all.iter().map(|(d, n)| format!("{d}:{n}")).collect();
        assert_eq!(
            names,
            ["0:Type", "0:Radius", "0:Axis", "1:X", "1:Y", "1:Z", "0:Label"]
        );
    }

    #[test]
    fn cursor_skips_children_when_asked() {
        let mut snapshot = SerializedModule::from_control(&control(), 0).unwrap();
        let top = walk(&mut snapshot, false);
        let names: Vec<_> = top.iter().map(|(_, n)| n.as_str()).collect();
        assert_eq!(names, ["Type", "Radius", "Axis", "Label"]);
    }

    #[test]
    fn list_elements_are_numbered() {
        let mut snapshot = SerializedModule::from_control(&control(), 1).unwrap();
        let names: Vec<_> = walk(&mut snapshot, true)
            .into_iter()
            .map(|(_, n)| n)
            .collect();
        assert_eq!(
            names,
            ["Type", "Points", "Element 0", "Element 1", "Looping"]
        );
    }

    #[test]
    fn set_value_through_cursor() {
        let mut snapshot = SerializedModule::from_control(&control(), 0).unwrap();
        {
            let mut cursor = snapshot.cursor();
            assert!(cursor.next_visible(true));
            assert!(cursor.is_type_field());
            assert!(matches!(
                cursor.set_value(Value::String("Other".into())),
                Err(PropertyError::ReadOnly(_))
            ));
            assert!(cursor.next_visible(false));
            assert_eq!(cursor.path(), "radius");
            assert_eq!(cursor.kind(), Some(FieldKind::F32));
            cursor.set_value(Value::F64(3.5)).unwrap();
            assert!(matches!(
                cursor.set_value(Value::Bool(true)),
                Err(PropertyError::TypeMismatch { .. })
            ));
        }
        assert!(snapshot.is_modified());
        assert_eq!(snapshot.find_property("radius"), Some(&Value::F32(3.5)));
    }

    #[test]
    fn set_property_by_path() {
        let mut snapshot = SerializedModule::from_control(&control(), 0).unwrap();
        snapshot.set_property("axis[2]", Value::F32(1.0)).unwrap();
        assert_eq!(snapshot.find_property("axis[2]"), Some(&Value::F32(1.0)));
        assert!(matches!(
            snapshot.set_property("axis", Value::F32(1.0)),
            Err(PropertyError::ReadOnly(_))
        ));
        assert!(matches!(
            snapshot.set_property("mass", Value::F32(1.0)),
            Err(PropertyError::UnknownPath(_))
        ));

        snapshot.revert();
        assert!(!snapshot.is_modified());
    }

    #[test]
    fn update_if_required_refreshes_clean_snapshots_only() {
        let mut control = control();
        let mut snapshot = SerializedModule::from_control(&control, 0).unwrap();
        assert!(!snapshot.update_if_required(&control).unwrap());

        control.find_mut::<Orbit>().unwrap().radius = 9.0;
        assert!(snapshot.update_if_required(&control).unwrap());
        assert_eq!(snapshot.find_property("radius"), Some(&Value::F32(9.0)));

        snapshot.set_property("radius", Value::F32(1.0)).unwrap();
        control.find_mut::<Orbit>().unwrap().radius = 4.0;
        assert!(!snapshot.update_if_required(&control).unwrap());
        assert_eq!(snapshot.find_property("radius"), Some(&Value::F32(1.0)));

        control.remove_module(0);
        assert!(matches!(
            snapshot.update_if_required(&control),
            Err(PropertyError::UnknownModule { index: 0 })
        ));
    }

    #[test]
    fn missing_index_is_reported() {
        assert!(matches!(
            SerializedModule::from_control(&control(), 7),
            Err(PropertyError::UnknownModule { index: 7 })
        ));
    }
}
