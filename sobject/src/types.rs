use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};

/// Opaque scalar held by a record attribute: string, number, boolean or null.
pub type FieldValue = Value;

/// Attribute values keyed by local field name.
pub type Attributes = Map<String, FieldValue>;

/// Attribute values keyed by remote field name, as exchanged with the remote client.
pub type RemoteAttributes = Map<String, FieldValue>;

/// Remote name of the primary identifier field present on every object.
pub const PRIMARY_ID_FIELD: &str = "Id";

/// Reserved local name the primary identifier maps to.
pub const EXTERNAL_ID_FIELD: &str = "external_id";

/// Suffix the remote system appends to custom objects and fields.
pub const CUSTOM_SUFFIX: &str = "__c";

/// One row of the bidirectional field table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub local: String,
    pub remote: String,
    /// Values of identifier fields are truncated on construction.
    pub is_id: bool,
    /// Foreign key to a parent type. Always also an identifier field.
    pub is_parent_id: bool,
    pub custom: bool,
}

impl FieldMapping {
    pub fn new(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
            is_id: false,
            is_parent_id: false,
            custom: false,
        }
    }

    pub(crate) fn primary_id() -> Self {
        Self {
            is_id: true,
            ..Self::new(EXTERNAL_ID_FIELD, PRIMARY_ID_FIELD)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// This type holds a foreign key to one record of the target type.
    Parent,
    /// Records of the target type hold a foreign key to this type.
    Children,
}

/// Static description of a relationship declared on a mapped type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipDescriptor {
    /// Accessor name, e.g. `account` or `contacts`.
    pub name: String,
    pub kind: RelationKind,
    /// Type key of the related schema in the registry.
    pub target: String,
    /// Local foreign-key field. Lives on this type for parents and on the
    /// target type for children.
    pub foreign_key: String,
}

/// Returns `true` for null values and strings that are empty or whitespace.
pub fn is_blank(value: &FieldValue) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Renders a value the way it is interpolated into a query literal.
///
/// Strings are taken verbatim, null renders as empty text and every other
/// scalar uses its JSON display form.
pub fn render_value(value: &FieldValue) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}
