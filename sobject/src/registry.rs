use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use log::debug;

use crate::{
    errors::{SObjectError, SObjectResult},
    schema::MappedTypeSchema,
    types::RelationKind,
};

/// Type-key to schema map. Schemas are write-once: registering a second
/// schema under an existing key is rejected.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<MappedTypeSchema>>>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by [`Session::global`](crate::Session::global).
    pub fn global() -> Arc<SchemaRegistry> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(SchemaRegistry::new())))
    }

    pub fn register(&self, schema: MappedTypeSchema) -> SObjectResult<Arc<MappedTypeSchema>> {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        if schemas.contains_key(schema.type_key()) {
            return Err(SObjectError::schema(format!(
                "type '{}' is already registered",
                schema.type_key()
            )));
        }
        debug!(
            "registering {} as {} with {} fields",
            schema.type_key(),
            schema.api_name(),
            schema.fields().len()
        );
        let schema = Arc::new(schema);
        schemas.insert(schema.type_key().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    pub fn get(&self, type_key: &str) -> Option<Arc<MappedTypeSchema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_key)
            .cloned()
    }

    pub fn require(&self, type_key: &str) -> SObjectResult<Arc<MappedTypeSchema>> {
        self.get(type_key).ok_or_else(|| SObjectError::UnknownType {
            type_key: type_key.to_string(),
        })
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(type_key)
    }

    /// Registered type keys, sorted.
    pub fn type_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Drops every schema. Intended for tests that share the global registry.
    pub fn clear(&self) {
        self.schemas.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// A relationship on another type that points at a given type.
#[derive(Debug, Clone)]
pub struct IncomingRelation {
    /// Type key declaring the relationship
    pub source: String,
    /// Accessor name on the source type
    pub name: String,
    pub kind: RelationKind,
    pub foreign_key: String,
}

impl SchemaRegistry {
    /// Every relationship, on any registered type, whose target is `target`.
    pub fn incoming_relations(&self, target: &str) -> Vec<IncomingRelation> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        let mut incoming: Vec<IncomingRelation> = schemas
            .values()
            .flat_map(|schema| {
                schema
                    .relationships()
                    .iter()
                    .filter(|relation| relation.target == target)
                    .map(move |relation| IncomingRelation {
                        source: schema.type_key().to_string(),
                        name: relation.name.clone(),
                        kind: relation.kind,
                        foreign_key: relation.foreign_key.clone(),
                    })
            })
            .collect();
        incoming.sort_by(|a, b| (&a.source, &a.name).cmp(&(&b.source, &b.name)));
        incoming
    }

    /// Relationships whose target type is not registered, as `(type_key, relationship)` pairs.
    pub fn dangling_relations(&self) -> Vec<(String, String)> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        let mut dangling: Vec<(String, String)> = schemas
            .values()
            .flat_map(|schema| {
                schema
                    .relationships()
                    .iter()
                    .filter(|relation| !schemas.contains_key(&relation.target))
                    .map(move |relation| (schema.type_key().to_string(), relation.name.clone()))
            })
            .collect();
        dangling.sort();
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Configuration,
        schema::{ChildrenOptions, ParentOptions},
    };

    fn parent() -> MappedTypeSchema {
        MappedTypeSchema::builder("Parent", &Configuration::new())
            .maps_object("Parent")
            .maps_children("children", "Child", ChildrenOptions::default())
            .build()
            .expect("schema")
    }

    fn child() -> MappedTypeSchema {
        MappedTypeSchema::builder("Child", &Configuration::new())
            .maps_object("Child")
            .maps_parent("parent", "Parent", ParentOptions::default())
            .build()
            .expect("schema")
    }

    #[test]
    fn registers_and_looks_up_schemas() {
        let registry = SchemaRegistry::new();
        registry.register(parent()).expect("register");
        assert!(registry.contains("Parent"));
        assert_eq!(registry.require("Parent").expect("schema").api_name(), "Parent");
        assert!(matches!(registry.require("Missing"), Err(SObjectError::UnknownType { .. })));
    }

    #[test]
    fn schemas_are_write_once() {
        let registry = SchemaRegistry::new();
        registry.register(parent()).expect("register");
        let err = registry.register(parent()).expect_err("second registration");
        assert!(err.is_schema_error());
    }

    #[test]
    fn reports_incoming_and_dangling_relations() {
        let registry = SchemaRegistry::new();
        registry.register(parent()).expect("register");
        assert_eq!(registry.dangling_relations(), vec![("Parent".to_string(), "children".to_string())]);

        registry.register(child()).expect("register");
        assert!(registry.dangling_relations().is_empty());

        let incoming = registry.incoming_relations("Parent");
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].source, "Child");
        assert_eq!(incoming[0].foreign_key, "parent_id");
        assert_eq!(registry.type_keys(), vec!["Child".to_string(), "Parent".to_string()]);
    }
}
