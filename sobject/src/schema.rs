//! Mapped type schemas and the builder that declares them.
//!
//! A schema is declared once, frozen by [`SchemaBuilder::build`], and shared
//! read-only by every record of the type.
//!
//! ```
//! use sobject::{Configuration, schema::{MappedTypeSchema, FieldOptions}};
//!
//! let config = Configuration::new().with_namespace("Test");
//! let schema = MappedTypeSchema::builder("TestObject", &config)
//!     .maps_object("TestObject")
//!     .maps_standard_field("my_field1", "MyField1")
//!     .maps_field("my_field2", "MyField2", FieldOptions::custom())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.remote_name("my_field2"), Some("Test__MyField2__c"));
//! assert_eq!(schema.local_name("MyField1"), Some("my_field1"));
//! ```

use serde::Serialize;

use crate::{
    config::Configuration,
    errors::{SObjectError, SObjectResult, ValidationError, ValidationIssue},
    naming::{self, NameContext},
    types::{EXTERNAL_ID_FIELD, FieldMapping, RelationKind, RelationshipDescriptor},
    validators::{is_valid_local_name, is_valid_remote_name},
};

/// Frozen description of one mapped type.
#[derive(Debug, Clone, Serialize)]
pub struct MappedTypeSchema {
    type_key: String,
    object_name: String,
    api_name: String,
    fields: Vec<FieldMapping>,
    relationships: Vec<RelationshipDescriptor>,
}

impl MappedTypeSchema {
    /// Starts declaring the type registered under `type_key`. The namespace
    /// used for custom names is read from `config` now and never again.
    pub fn builder(type_key: impl Into<String>, config: &Configuration) -> SchemaBuilder {
        SchemaBuilder::new(type_key, config.namespace())
    }

    /// Registry key of this type.
    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    /// Remote object name as declared.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Remote api name used in every client call and query.
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Field table in declaration order; the primary identifier comes first.
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn relationships(&self) -> &[RelationshipDescriptor] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipDescriptor> {
        self.relationships.iter().find(|relation| relation.name == name)
    }

    /// `remote -> local` pairs in declaration order.
    pub fn remote_to_local(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|field| (field.remote.as_str(), field.local.as_str()))
    }

    /// `local -> remote` pairs, the exact inverse of [`remote_to_local`](Self::remote_to_local).
    pub fn local_to_remote(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|field| (field.local.as_str(), field.remote.as_str()))
    }

    /// Identifier fields as `remote -> local` pairs.
    pub fn remote_id_fields(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields
            .iter()
            .filter(|field| field.is_id)
            .map(|field| (field.remote.as_str(), field.local.as_str()))
    }

    /// Parent foreign-key fields as `remote -> local` pairs.
    pub fn remote_parent_id_fields(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields
            .iter()
            .filter(|field| field.is_parent_id)
            .map(|field| (field.remote.as_str(), field.local.as_str()))
    }

    pub fn local_field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|field| field.local.as_str())
    }

    pub fn remote_field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|field| field.remote.as_str())
    }

    pub fn local_name(&self, remote: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.remote == remote)
            .map(|field| field.local.as_str())
    }

    pub fn remote_name(&self, local: &str) -> Option<&str> {
        self.field(local).map(|field| field.remote.as_str())
    }

    pub fn field(&self, local: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|field| field.local == local)
    }

    pub fn has_local_field(&self, local: &str) -> bool {
        self.position(local).is_some()
    }

    /// Index of `local` in [`fields`](Self::fields); records store values at the same index.
    pub fn position(&self, local: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.local == local)
    }

    pub(crate) fn position_of_remote(&self, remote: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.remote == remote)
    }

    /// Local name of the primary identifier, always present.
    pub fn external_id_field(&self) -> &str {
        EXTERNAL_ID_FIELD
    }

    pub(crate) fn unknown_field(&self, field: impl Into<String>) -> SObjectError {
        SObjectError::UnknownField {
            field: field.into(),
            api_name: self.api_name.clone(),
        }
    }
}

/// Options for [`SchemaBuilder::maps_object_with`].
#[derive(Debug, Clone, Default)]
pub struct ObjectOptions {
    /// Api name when it differs from the object name.
    pub api_name: Option<String>,
    /// Append the custom suffix to the api name.
    pub custom: bool,
}

/// Options for [`SchemaBuilder::maps_field`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOptions {
    /// Namespace and suffix the remote name.
    pub custom: bool,
    /// Treat the field as an identifier.
    pub id: bool,
}

impl FieldOptions {
    pub fn custom() -> Self {
        Self {
            custom: true,
            ..Self::default()
        }
    }

    pub fn id() -> Self {
        Self {
            id: true,
            ..Self::default()
        }
    }
}

/// Options for [`SchemaBuilder::maps_parent`].
#[derive(Debug, Clone, Default)]
pub struct ParentOptions {
    /// Local foreign-key name; defaults to `{field}_id`.
    pub field_foreign_key: Option<String>,
    /// Remote foreign-key name; defaults to the PascalCase local foreign key.
    pub remote_foreign_key: Option<String>,
    /// Namespace and suffix the remote foreign key.
    pub custom: bool,
}

/// Options for [`SchemaBuilder::maps_children`].
#[derive(Debug, Clone, Default)]
pub struct ChildrenOptions {
    /// Foreign-key field on the child type; defaults to the snake_case api
    /// name of this type followed by `_id`.
    pub foreign_key: Option<String>,
}

/// Declares a [`MappedTypeSchema`].
///
/// Declaration methods never fail on their own; every problem is collected
/// and reported by [`build`](Self::build).
#[derive(Debug)]
pub struct SchemaBuilder {
    type_key: String,
    namespace: String,
    object: Option<(String, String)>,
    fields: Vec<FieldMapping>,
    relationships: Vec<RelationshipDescriptor>,
    pending_children: Vec<(usize, bool)>,
    errors: Vec<SObjectError>,
}

impl SchemaBuilder {
    pub fn new(type_key: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            namespace: namespace.into(),
            object: None,
            fields: vec![FieldMapping::primary_id()],
            relationships: Vec::new(),
            pending_children: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    /// Names the remote object this type reflects.
    pub fn maps_object(self, name: impl Into<String>) -> Self {
        self.maps_object_with(name, ObjectOptions::default())
    }

    /// Names a custom remote object; the api name gains the custom suffix.
    pub fn maps_custom_object(self, name: impl Into<String>) -> Self {
        self.maps_object_with(
            name,
            ObjectOptions {
                custom: true,
                ..ObjectOptions::default()
            },
        )
    }

    pub fn maps_object_with(mut self, name: impl Into<String>, options: ObjectOptions) -> Self {
        let name = name.into();
        let mut api_name = options.api_name.unwrap_or_else(|| name.clone());
        if options.custom {
            api_name = naming::custom_object(&api_name);
        }
        self.object = Some((name, api_name));
        self
    }

    pub fn maps_field(mut self, local: impl Into<String>, remote: impl Into<String>, options: FieldOptions) -> Self {
        let remote: String = remote.into();
        let remote = NameContext::new(&self.namespace).field(&remote, options.custom);
        let mapping = FieldMapping {
            is_id: options.id,
            custom: options.custom,
            ..FieldMapping::new(local, remote)
        };
        self.insert_field(mapping);
        self
    }

    pub fn maps_standard_field(self, local: impl Into<String>, remote: impl Into<String>) -> Self {
        self.maps_field(local, remote, FieldOptions::default())
    }

    pub fn maps_custom_field(self, local: impl Into<String>, remote: impl Into<String>) -> Self {
        self.maps_field(local, remote, FieldOptions::custom())
    }

    /// Declares a parent relationship named `field` pointing at the type
    /// registered as `target`, along with its foreign-key identifier field.
    pub fn maps_parent(mut self, field: impl Into<String>, target: impl Into<String>, options: ParentOptions) -> Self {
        let field = field.into();
        let foreign_key = options
            .field_foreign_key
            .unwrap_or_else(|| naming::parent_foreign_key(&field));
        let remote = options
            .remote_foreign_key
            .unwrap_or_else(|| naming::remote_foreign_key(&foreign_key));
        let remote = NameContext::new(&self.namespace).field(&remote, options.custom);

        self.insert_field(FieldMapping {
            is_id: true,
            is_parent_id: true,
            custom: options.custom,
            ..FieldMapping::new(foreign_key.clone(), remote)
        });
        self.insert_relationship(RelationshipDescriptor {
            name: field,
            kind: RelationKind::Parent,
            target: target.into(),
            foreign_key,
        });
        self
    }

    pub fn maps_custom_parent(self, field: impl Into<String>, target: impl Into<String>) -> Self {
        self.maps_parent(
            field,
            target,
            ParentOptions {
                custom: true,
                ..ParentOptions::default()
            },
        )
    }

    /// Declares a children relationship named `field` over the type
    /// registered as `target`. No query runs until the proxy is used.
    pub fn maps_children(
        mut self,
        field: impl Into<String>,
        target: impl Into<String>,
        options: ChildrenOptions,
    ) -> Self {
        let defaulted = options.foreign_key.is_none();
        let index = self.relationships.len();
        self.insert_relationship(RelationshipDescriptor {
            name: field.into(),
            kind: RelationKind::Children,
            target: target.into(),
            foreign_key: options.foreign_key.unwrap_or_default(),
        });
        if self.relationships.len() > index {
            self.pending_children.push((index, defaulted));
        }
        self
    }

    fn insert_field(&mut self, mapping: FieldMapping) {
        let mut issues = Vec::new();
        if !is_valid_local_name(&mapping.local) {
            issues.push(ValidationIssue::new(
                &mapping.local,
                "schema.local_name",
                format!("'{}' is not a valid local field name", mapping.local),
            ));
        }
        if !is_valid_remote_name(&mapping.remote) {
            issues.push(ValidationIssue::new(
                &mapping.local,
                "schema.remote_name",
                format!("'{}' is not a valid remote field name", mapping.remote),
            ));
        }
        if !issues.is_empty() {
            self.errors.push(ValidationError::new(issues).into());
            return;
        }

        let conflict = self
            .fields
            .iter_mut()
            .find(|existing| existing.remote == mapping.remote || existing.local == mapping.local);
        match conflict {
            // Redeclaring the same pair keeps one row carrying the union of the flags.
            Some(existing) if existing.remote == mapping.remote && existing.local == mapping.local => {
                existing.is_id |= mapping.is_id;
                existing.is_parent_id |= mapping.is_parent_id;
                existing.custom |= mapping.custom;
            }
            Some(existing) => {
                let err = SObjectError::DuplicateField {
                    existing_remote: existing.remote.clone(),
                    existing_local: existing.local.clone(),
                    remote: mapping.remote,
                    local: mapping.local,
                };
                self.errors.push(err);
            }
            None => self.fields.push(mapping),
        }
    }

    fn insert_relationship(&mut self, relationship: RelationshipDescriptor) {
        if self.relationships.iter().any(|existing| existing.name == relationship.name) {
            self.errors.push(SObjectError::schema(format!(
                "relationship '{}' is declared more than once on {}",
                relationship.name, self.type_key
            )));
            return;
        }
        if self.fields.iter().any(|field| field.local == relationship.name) {
            self.errors.push(SObjectError::schema(format!(
                "relationship '{}' on {} collides with a field of the same name",
                relationship.name, self.type_key
            )));
            return;
        }
        self.relationships.push(relationship);
    }

    /// Freezes the declaration. Fails with the first collected error, or a
    /// schema error when no object name was declared.
    pub fn build(mut self) -> SObjectResult<MappedTypeSchema> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }

        let (object_name, api_name) = self
            .object
            .take()
            .filter(|(_, api_name)| !api_name.trim().is_empty())
            .ok_or_else(|| SObjectError::schema(format!("{} does not define an object name", self.type_key)))?;

        for (index, defaulted) in self.pending_children {
            if defaulted {
                self.relationships[index].foreign_key = naming::children_foreign_key(&api_name);
            }
        }

        Ok(MappedTypeSchema {
            type_key: self.type_key,
            object_name,
            api_name,
            fields: self.fields,
            relationships: self.relationships,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Configuration {
        Configuration::new().with_namespace("Test")
    }

    fn test_object() -> MappedTypeSchema {
        MappedTypeSchema::builder("TestObject", &config())
            .maps_object("TestObject")
            .maps_standard_field("my_field1", "MyField1")
            .maps_custom_field("my_field2", "MyField2")
            .build()
            .expect("schema")
    }

    #[test]
    fn basic_field_mapping() {
        let schema = test_object();
        assert_eq!(schema.local_name("MyField1"), Some("my_field1"));
        assert_eq!(schema.remote_name("my_field1"), Some("MyField1"));
        assert_eq!(schema.remote_name("external_id"), Some("Id"));
        assert_eq!(schema.remote_name("my_field2"), Some("Test__MyField2__c"));
    }

    #[test]
    fn local_to_remote_inverts_remote_to_local() {
        let schema = test_object();
        for (local, remote) in schema.local_to_remote() {
            assert_eq!(schema.local_name(remote), Some(local));
        }
        assert_eq!(schema.remote_to_local().count(), schema.local_to_remote().count());
    }

    #[test]
    fn primary_id_is_always_an_identifier() {
        let schema = test_object();
        let ids: Vec<_> = schema.remote_id_fields().collect();
        assert_eq!(ids, vec![("Id", "external_id")]);
        assert_eq!(schema.remote_parent_id_fields().count(), 0);
    }

    #[test]
    fn custom_object_api_names() {
        let schema = MappedTypeSchema::builder("Invoice", &config())
            .maps_custom_object("Invoice")
            .build()
            .expect("schema");
        assert_eq!(schema.object_name(), "Invoice");
        assert_eq!(schema.api_name(), "Invoice__c");

        let explicit = MappedTypeSchema::builder("Invoice", &config())
            .maps_object_with(
                "Invoice",
                ObjectOptions {
                    api_name: Some("Billing_Invoice__c".into()),
                    custom: true,
                },
            )
            .build()
            .expect("schema");
        assert_eq!(explicit.api_name(), "Billing_Invoice__c");
    }

    #[test]
    fn missing_object_name_is_a_schema_error() {
        let err = MappedTypeSchema::builder("Nameless", &config())
            .maps_standard_field("name", "Name")
            .build()
            .expect_err("object name required");
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("does not define an object name"));
    }

    #[test]
    fn duplicate_remote_field_fails_fast() {
        let err = MappedTypeSchema::builder("TestObject", &config())
            .maps_object("TestObject")
            .maps_standard_field("first", "Name")
            .maps_standard_field("second", "Name")
            .build()
            .expect_err("duplicate");
        assert!(matches!(err, SObjectError::DuplicateField { ref remote, ref existing_local, .. }
            if remote == "Name" && existing_local == "first"));
    }

    #[test]
    fn duplicate_local_field_fails_fast() {
        let err = MappedTypeSchema::builder("TestObject", &config())
            .maps_object("TestObject")
            .maps_standard_field("name", "Name")
            .maps_standard_field("name", "FullName")
            .build()
            .expect_err("duplicate");
        assert!(matches!(err, SObjectError::DuplicateField { .. }));
    }

    #[test]
    fn identical_redeclaration_adds_no_row() {
        let schema = MappedTypeSchema::builder("TestObject", &config())
            .maps_object("TestObject")
            .maps_standard_field("name", "Name")
            .maps_standard_field("name", "Name")
            .build()
            .expect("schema");
        assert_eq!(schema.fields().len(), 2);
    }

    #[test]
    fn parent_over_declared_foreign_key_marks_it_as_parent_id() {
        let schema = MappedTypeSchema::builder("Contact", &config())
            .maps_object("Contact")
            .maps_standard_field("account_id", "AccountId")
            .maps_parent("account", "Account", ParentOptions::default())
            .build()
            .expect("schema");

        assert_eq!(schema.fields().len(), 2);
        let parents: Vec<_> = schema.remote_parent_id_fields().collect();
        assert_eq!(parents, vec![("AccountId", "account_id")]);
        let ids: Vec<_> = schema.remote_id_fields().collect();
        assert_eq!(ids, vec![("Id", "external_id"), ("AccountId", "account_id")]);
    }

    #[test]
    fn parent_declares_identifier_foreign_key() {
        let schema = MappedTypeSchema::builder("Child", &config())
            .maps_object("Child")
            .maps_parent("parent", "Parent", ParentOptions::default())
            .maps_custom_parent("owner", "Owner")
            .build()
            .expect("schema");

        let parents: Vec<_> = schema.remote_parent_id_fields().collect();
        assert_eq!(parents, vec![("ParentId", "parent_id"), ("Test__OwnerId__c", "owner_id")]);
        assert_eq!(schema.remote_id_fields().count(), 3);

        let relation = schema.relationship("parent").expect("relationship");
        assert_eq!(relation.kind, RelationKind::Parent);
        assert_eq!(relation.target, "Parent");
        assert_eq!(relation.foreign_key, "parent_id");
    }

    #[test]
    fn parent_foreign_key_overrides() {
        let schema = MappedTypeSchema::builder("Contact", &config())
            .maps_object("Contact")
            .maps_parent(
                "account",
                "Account",
                ParentOptions {
                    field_foreign_key: Some("company_id".into()),
                    remote_foreign_key: Some("AccountId".into()),
                    custom: false,
                },
            )
            .build()
            .expect("schema");
        assert_eq!(schema.remote_name("company_id"), Some("AccountId"));
        assert_eq!(schema.relationship("account").map(|r| r.foreign_key.as_str()), Some("company_id"));
    }

    #[test]
    fn children_foreign_key_defaults_to_api_name() {
        let schema = MappedTypeSchema::builder("Parent", &config())
            .maps_children("children", "Child", ChildrenOptions::default())
            .maps_object("Parent")
            .maps_children(
                "notes",
                "Note",
                ChildrenOptions {
                    foreign_key: Some("subject_id".into()),
                },
            )
            .build()
            .expect("schema");
        let children = schema.relationship("children").expect("children");
        assert_eq!(children.kind, RelationKind::Children);
        assert_eq!(children.foreign_key, "parent_id");
        assert_eq!(schema.relationship("notes").map(|r| r.foreign_key.as_str()), Some("subject_id"));
    }

    #[test]
    fn relationship_names_are_unique() {
        let err = MappedTypeSchema::builder("Parent", &config())
            .maps_object("Parent")
            .maps_children("children", "Child", ChildrenOptions::default())
            .maps_children("children", "Other", ChildrenOptions::default())
            .build()
            .expect_err("duplicate relationship");
        assert!(err.is_schema_error());
    }

    #[test]
    fn invalid_names_are_rejected() {
        let err = MappedTypeSchema::builder("TestObject", &config())
            .maps_object("TestObject")
            .maps_standard_field("my field", "My Field")
            .build()
            .expect_err("invalid names");
        match err {
            SObjectError::Validation(validation) => assert_eq!(validation.issues.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
