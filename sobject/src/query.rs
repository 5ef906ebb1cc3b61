//! # Query condition building
//!
//! Turns local-field equality constraints into the remote query language.
//!
//! | Input (local)                                 | Output (remote)                                   |
//! |-----------------------------------------------|---------------------------------------------------|
//! | `{my_field1: "foo"}`                          | `MyField1 = 'foo'`                                |
//! | `{my_field1: "foo", my_field2: "bar"}`        | `MyField1 = 'foo' AND Test__MyField2__c = 'bar'`  |
//! | `{unknown: "x"}`                              | error naming `unknown` and the api name           |
//!
//! Values are interpolated literally: strings verbatim, null as empty text,
//! numbers and booleans in display form. Quote characters are NOT escaped, so
//! conditions must never carry untrusted input.

use std::fmt;

use crate::{
    errors::SObjectResult,
    schema::MappedTypeSchema,
    types::{FieldValue, PRIMARY_ID_FIELD, render_value},
};

/// Ordered local-field equality constraints.
///
/// Entries keep insertion order; setting an existing key replaces its value
/// in place.
///
/// ```
/// use sobject::query::Conditions;
///
/// let conditions = Conditions::new().with("my_field1", "foo").with("my_field1", "bar");
/// assert_eq!(conditions.len(), 1);
/// assert_eq!(conditions.get("my_field1"), Some(&serde_json::json!("bar")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    entries: Vec<(String, FieldValue)>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == field) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == field)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> + '_ {
        self.entries.iter().map(|(field, value)| (field.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Conditions
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut conditions = Conditions::new();
        for (field, value) in iter {
            conditions.set(field, value);
        }
        conditions
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Conditions
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Builds the predicate for `conditions`, validating every key against `schema`.
pub fn build_where(schema: &MappedTypeSchema, conditions: &Conditions) -> SObjectResult<String> {
    let clauses = conditions
        .iter()
        .map(|(field, value)| -> SObjectResult<String> {
            let remote = schema.remote_name(field).ok_or_else(|| schema.unknown_field(field))?;
            Ok(format!("{remote} = '{}'", render_value(value)))
        })
        .collect::<SObjectResult<Vec<String>>>()?;
    Ok(clauses.join(" AND "))
}

/// A single `SELECT` statement against one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub fields: Vec<String>,
    pub object: String,
    pub predicate: Option<String>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    /// Selects every mapped field, filtered by `conditions` when non-empty.
    pub fn all_fields(schema: &MappedTypeSchema, conditions: &Conditions) -> SObjectResult<Self> {
        Ok(Self {
            fields: schema.remote_field_names().map(str::to_string).collect(),
            object: schema.api_name().to_string(),
            predicate: predicate(schema, conditions)?,
            limit: None,
        })
    }

    /// Selects only the identifier, capped at one row.
    pub fn existence(schema: &MappedTypeSchema, conditions: &Conditions) -> SObjectResult<Self> {
        Ok(Self {
            fields: vec![PRIMARY_ID_FIELD.to_string()],
            object: schema.api_name().to_string(),
            predicate: predicate(schema, conditions)?,
            limit: Some(1),
        })
    }
}

fn predicate(schema: &MappedTypeSchema, conditions: &Conditions) -> SObjectResult<Option<String>> {
    if conditions.is_empty() {
        Ok(None)
    } else {
        build_where(schema, conditions).map(Some)
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.fields.join(","), self.object)?;
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {predicate}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}
