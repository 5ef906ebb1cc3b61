//! Schema declarations loaded from TOML.
//!
//! ```toml
//! namespace = "Acme"
//!
//! [[objects]]
//! type = "Account"
//! name = "Account"
//! fields = [{ local = "name", remote = "Name" }]
//! children = [{ field = "contacts", target = "Contact", foreign_key = "account_id" }]
//!
//! [[objects]]
//! type = "Contact"
//! name = "Contact"
//! fields = [{ local = "last_name", remote = "LastName" }]
//! parents = [{ field = "account", target = "Account" }]
//! ```
//!
//! A manifest's `namespace`, when present, overrides the configured one for
//! the types it declares.

use std::{collections::HashSet, fs, path::Path, str::FromStr};

use log::debug;
use serde::Deserialize;

use crate::{
    config::Configuration,
    errors::{SObjectResult, ValidationError, ValidationIssue, ValidationResult},
    registry::SchemaRegistry,
    repository::Repo,
    schema::{ChildrenOptions, FieldOptions, MappedTypeSchema, ObjectOptions, ParentOptions, SchemaBuilder},
    session::Session,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub objects: Vec<ObjectManifest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectManifest {
    /// Registry key; defaults to `name`.
    #[serde(rename = "type", default)]
    pub type_key: Option<String>,
    pub name: String,
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub fields: Vec<FieldManifest>,
    #[serde(default)]
    pub parents: Vec<ParentManifest>,
    #[serde(default)]
    pub children: Vec<ChildrenManifest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldManifest {
    pub local: String,
    pub remote: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub id: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParentManifest {
    pub field: String,
    #[serde(alias = "class")]
    pub target: String,
    #[serde(default)]
    pub field_foreign_key: Option<String>,
    #[serde(default)]
    pub remote_foreign_key: Option<String>,
    #[serde(default)]
    pub custom: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildrenManifest {
    pub field: String,
    #[serde(alias = "class")]
    pub target: String,
    #[serde(default)]
    pub foreign_key: Option<String>,
}

impl ObjectManifest {
    pub fn type_key(&self) -> &str {
        self.type_key.as_deref().unwrap_or(&self.name)
    }

    fn builder(&self, config: &Configuration) -> SchemaBuilder {
        let mut builder = MappedTypeSchema::builder(self.type_key(), config).maps_object_with(
            &self.name,
            ObjectOptions {
                api_name: self.api_name.clone(),
                custom: self.custom,
            },
        );
        for field in &self.fields {
            builder = builder.maps_field(
                &field.local,
                &field.remote,
                FieldOptions {
                    custom: field.custom,
                    id: field.id,
                },
            );
        }
        for parent in &self.parents {
            builder = builder.maps_parent(
                &parent.field,
                &parent.target,
                ParentOptions {
                    field_foreign_key: parent.field_foreign_key.clone(),
                    remote_foreign_key: parent.remote_foreign_key.clone(),
                    custom: parent.custom,
                },
            );
        }
        for children in &self.children {
            builder = builder.maps_children(
                &children.field,
                &children.target,
                ChildrenOptions {
                    foreign_key: children.foreign_key.clone(),
                },
            );
        }
        builder
    }
}

impl FromStr for Manifest {
    type Err = crate::errors::SObjectError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(source)?)
    }
}

impl Manifest {
    pub fn from_path(path: impl AsRef<Path>) -> SObjectResult<Self> {
        let path = path.as_ref();
        debug!("loading manifest {}", path.display());
        fs::read_to_string(path)?.parse()
    }

    /// One builder per declared object, using the manifest namespace when set.
    pub fn builders(&self, config: &Configuration) -> Vec<SchemaBuilder> {
        let config = match &self.namespace {
            Some(namespace) => config.clone().with_namespace(namespace.clone()),
            None => config.clone(),
        };
        self.objects.iter().map(|object| object.builder(&config)).collect()
    }

    /// Builds every declared schema without registering anything.
    pub fn schemas(&self, config: &Configuration) -> SObjectResult<Vec<MappedTypeSchema>> {
        self.builders(config).into_iter().map(SchemaBuilder::build).collect()
    }

    /// Checks type keys are unique, including against `registry`, and every relationship targets a type
    /// declared here or already present in `registry`.
    pub fn validate(&self, registry: &SchemaRegistry) -> ValidationResult<()> {
        let mut issues = Vec::new();
        let mut declared = HashSet::new();
        for object in &self.objects {
            if !declared.insert(object.type_key()) {
                issues.push(ValidationIssue::new(
                    object.type_key(),
                    "manifest.duplicate_type",
                    format!("type '{}' is declared more than once", object.type_key()),
                ));
            } else if registry.contains(object.type_key()) {
                issues.push(ValidationIssue::new(
                    object.type_key(),
                    "manifest.duplicate_type",
                    format!("type '{}' is already registered", object.type_key()),
                ));
            }
        }

        for object in &self.objects {
            let targets = object
                .parents
                .iter()
                .map(|parent| (&parent.field, &parent.target))
                .chain(object.children.iter().map(|children| (&children.field, &children.target)));
            for (field, target) in targets {
                if !declared.contains(target.as_str()) && !registry.contains(target) {
                    issues.push(ValidationIssue::new(
                        format!("{}.{field}", object.type_key()),
                        "manifest.unknown_target",
                        format!("'{field}' on {} targets undeclared type '{target}'", object.type_key()),
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Validates, builds and registers every declared type with `session`.
    /// Nothing is registered unless every schema builds.
    pub fn register(&self, session: &Session) -> SObjectResult<Vec<Repo>> {
        self.validate(session.registry())?;
        let schemas = self.schemas(session.configuration())?;
        schemas
            .into_iter()
            .map(|schema| session.register_schema(schema))
            .collect()
    }
}
