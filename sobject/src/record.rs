//! Instances of mapped types.
//!
//! A [`Record`] keeps one value slot per declared field, in declaration
//! order, and knows how to translate itself to and from the remote shape.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use crate::{
    errors::{SObjectError, SObjectResult},
    id::truncate_id,
    relation::{self, CollectionProxy, Related},
    repository::Repo,
    schema::MappedTypeSchema,
    types::{
        Attributes, EXTERNAL_ID_FIELD, FieldMapping, FieldValue, RelationKind, RelationshipDescriptor, RemoteAttributes,
        is_blank,
    },
};

/// Options for [`Record::to_attributes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeOptions {
    /// Include parent foreign-key fields.
    pub include_parent_ids: bool,
}

#[derive(Debug, Clone)]
pub struct Record {
    repo: Repo,
    values: Vec<FieldValue>,
}

impl Record {
    /// Assigns `values` to a fresh record. With `translate` set, keys are
    /// read as remote names first and local names second. Unknown keys are
    /// dropped and identifier values are truncated.
    pub(crate) fn construct<I, K, V>(repo: Repo, values: I, translate: bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut slots = vec![Value::Null; repo.schema().fields().len()];
        {
            let schema = repo.schema();
            for (key, value) in values {
                let key = key.as_ref();
                let position = if translate {
                    schema.position_of_remote(key).or_else(|| schema.position(key))
                } else {
                    schema.position(key)
                };
                match position {
                    Some(index) => slots[index] = normalize(&schema.fields()[index], value.into()),
                    None => debug!("ignoring '{key}': not an attribute of {}", schema.api_name()),
                }
            }
        }
        Self { repo, values: slots }
    }

    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    pub fn schema(&self) -> &Arc<MappedTypeSchema> {
        self.repo.schema()
    }

    /// Identifier assigned by the remote system, when there is one.
    pub fn external_id(&self) -> Option<&str> {
        self.get(EXTERNAL_ID_FIELD)
            .filter(|value| !is_blank(value))
            .and_then(Value::as_str)
    }

    /// A record is new until it carries a non-blank external id.
    pub fn is_new(&self) -> bool {
        self.get(EXTERNAL_ID_FIELD).is_none_or(is_blank)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.schema().position(field).map(|index| &self.values[index])
    }

    /// Sets one attribute by local name. Values are stored as given.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> SObjectResult<()> {
        let index = self
            .schema()
            .position(field)
            .ok_or_else(|| self.schema().unknown_field(field))?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Sets several attributes by local name. Keys that name no declared
    /// field are ignored.
    pub fn assign_attributes<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        for (field, value) in values {
            let field = field.as_ref();
            match self.schema().position(field) {
                Some(index) => self.values[index] = value.into(),
                None => debug!("ignoring '{field}': not an attribute of {}", self.repo.api_name()),
            }
        }
    }

    /// Local-keyed attributes, excluding parent foreign keys.
    pub fn attributes(&self) -> Attributes {
        self.to_attributes(AttributeOptions::default())
    }

    pub fn to_attributes(&self, options: AttributeOptions) -> Attributes {
        self.schema()
            .fields()
            .iter()
            .zip(&self.values)
            .filter(|(field, _)| options.include_parent_ids || !field.is_parent_id)
            .map(|(field, value)| (field.local.clone(), value.clone()))
            .collect()
    }

    /// [`attributes`](Self::attributes) keyed by remote name. This is the
    /// payload sent on create and update.
    pub fn remote_attributes(&self) -> RemoteAttributes {
        self.schema()
            .fields()
            .iter()
            .zip(&self.values)
            .filter(|(field, _)| !field.is_parent_id)
            .map(|(field, value)| (field.remote.clone(), value.clone()))
            .collect()
    }

    /// Creates the record when new, updates it otherwise. Returns `false`
    /// on any failure after logging it.
    pub fn save(&mut self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(err) => {
                warn!("saving {} failed: {err}", self.repo.api_name());
                false
            }
        }
    }

    pub fn try_save(&mut self) -> SObjectResult<()> {
        let client = self.repo.session().client()?;
        let api_name = self.repo.api_name().to_string();
        let payload = self.remote_attributes();

        if self.is_new() {
            debug!("create {api_name}");
            let id = client.create(&api_name, &payload).map_err(SObjectError::Remote)?;
            self.set(EXTERNAL_ID_FIELD, id)?;
            if self.is_new() {
                return Err(SObjectError::SaveFailed {
                    operation: "create",
                    api_name,
                });
            }
        } else {
            debug!("update {api_name} {}", self.external_id().unwrap_or_default());
            let updated = client.update(&api_name, &payload).map_err(SObjectError::Remote)?;
            if !updated {
                return Err(SObjectError::SaveFailed {
                    operation: "update",
                    api_name,
                });
            }
        }
        Ok(())
    }

    /// Assigns `values` and saves. Failures are logged and reported as `false`.
    pub fn update<I, K, V>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        match self.try_update(values) {
            Ok(()) => true,
            Err(err) => {
                warn!("updating {} failed: {err}", self.repo.api_name());
                false
            }
        }
    }

    pub fn try_update<I, K, V>(&mut self, values: I) -> SObjectResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        self.assign_attributes(values);
        self.try_save()
    }

    /// Resolves the relationship declared as `name`.
    pub fn related(&self, name: &str) -> SObjectResult<Related> {
        relation::resolve(self, self.relationship(name)?)
    }

    /// The parent record behind relationship `name`. Each call asks the
    /// remote client again.
    pub fn parent(&self, name: &str) -> SObjectResult<Option<Record>> {
        let descriptor = self.relationship_of_kind(name, RelationKind::Parent)?;
        match relation::resolve(self, descriptor)? {
            Related::Parent(parent) => Ok(parent),
            Related::Children(_) => Err(self.wrong_kind(name, RelationKind::Parent)),
        }
    }

    pub fn children(&self, name: &str) -> SObjectResult<CollectionProxy> {
        let descriptor = self.relationship_of_kind(name, RelationKind::Children)?;
        match relation::resolve(self, descriptor)? {
            Related::Children(proxy) => Ok(proxy),
            Related::Parent(_) => Err(self.wrong_kind(name, RelationKind::Children)),
        }
    }

    fn relationship(&self, name: &str) -> SObjectResult<&RelationshipDescriptor> {
        self.schema()
            .relationship(name)
            .ok_or_else(|| SObjectError::UnknownRelationship {
                name: name.to_string(),
                type_key: self.schema().type_key().to_string(),
            })
    }

    fn relationship_of_kind(&self, name: &str, kind: RelationKind) -> SObjectResult<&RelationshipDescriptor> {
        let descriptor = self.relationship(name)?;
        if descriptor.kind != kind {
            return Err(self.wrong_kind(name, kind));
        }
        Ok(descriptor)
    }

    fn wrong_kind(&self, name: &str, expected: RelationKind) -> SObjectError {
        let expected = match expected {
            RelationKind::Parent => "parent",
            RelationKind::Children => "children",
        };
        SObjectError::schema(format!(
            "'{name}' on {} is not a {expected} relationship",
            self.schema().type_key()
        ))
    }
}

fn normalize(field: &FieldMapping, value: FieldValue) -> FieldValue {
    match value {
        Value::String(id) if field.is_id => Value::String(truncate_id(&id).to_string()),
        other => other,
    }
}
