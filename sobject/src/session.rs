//! Entry point bundling a configuration with a schema registry.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use sobject::{Configuration, MemoryClient, Session};
//!
//! let session = Session::new(Configuration::new().with_client(Arc::new(MemoryClient::new())));
//! let accounts = session
//!     .register(session.declare("Account").maps_object("Account").maps_standard_field("name", "Name"))
//!     .unwrap();
//!
//! let account = accounts.try_create([("name", "Acme")]).unwrap();
//! assert!(!account.is_new());
//! assert_eq!(accounts.find_by([("name", "Acme")]).unwrap().unwrap().get("name").unwrap(), "Acme");
//! ```

use std::sync::Arc;

use crate::{
    client::RemoteClient,
    config::{self, Configuration},
    errors::SObjectResult,
    registry::SchemaRegistry,
    repository::Repo,
    schema::{MappedTypeSchema, SchemaBuilder},
};

/// Configuration plus registry, threaded through every remote-facing operation.
///
/// Cloning is cheap; records and repositories each keep a clone.
#[derive(Debug, Clone)]
pub struct Session {
    config: Arc<Configuration>,
    registry: Arc<SchemaRegistry>,
}

impl Session {
    /// Session with its own, empty registry.
    pub fn new(config: Configuration) -> Self {
        Self::with_registry(Arc::new(config), Arc::new(SchemaRegistry::new()))
    }

    pub fn with_registry(config: Arc<Configuration>, registry: Arc<SchemaRegistry>) -> Self {
        Self { config, registry }
    }

    /// Session over the process-wide configuration snapshot and registry.
    pub fn global() -> Self {
        Self::with_registry(config::configuration(), SchemaRegistry::global())
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Starts declaring a type using this session's namespace.
    pub fn declare(&self, type_key: impl Into<String>) -> SchemaBuilder {
        MappedTypeSchema::builder(type_key, &self.config)
    }

    /// Builds and registers a declaration, returning its repository.
    pub fn register(&self, builder: SchemaBuilder) -> SObjectResult<Repo> {
        self.register_schema(builder.build()?)
    }

    pub fn register_schema(&self, schema: MappedTypeSchema) -> SObjectResult<Repo> {
        let schema = self.registry.register(schema)?;
        Ok(Repo::new(schema, self.clone()))
    }

    /// Repository for a registered type.
    pub fn repo(&self, type_key: &str) -> SObjectResult<Repo> {
        let schema = self.registry.require(type_key)?;
        Ok(Repo::new(schema, self.clone()))
    }

    /// Invokes the configured client factory.
    pub fn client(&self) -> SObjectResult<Arc<dyn RemoteClient>> {
        self.config.client()
    }
}
