//! SObject mapping layer.
//!
//! Declares local types that reflect objects of a remote CRM service, keeps
//! the bidirectional field table between local and remote attribute names,
//! and routes create, update, find and query calls through an injected
//! [`RemoteClient`].
//!
//! ```
//! use std::sync::Arc;
//! use sobject::{ChildrenOptions, Configuration, MemoryClient, ParentOptions, Session};
//!
//! let client = Arc::new(MemoryClient::new());
//! let session = Session::new(Configuration::new().with_namespace("Acme").with_client(client));
//!
//! let accounts = session
//!     .register(
//!         session
//!             .declare("Account")
//!             .maps_object("Account")
//!             .maps_standard_field("name", "Name")
//!             .maps_children("contacts", "Contact", ChildrenOptions::default()),
//!     )
//!     .unwrap();
//! let contacts = session
//!     .register(
//!         session
//!             .declare("Contact")
//!             .maps_object("Contact")
//!             .maps_standard_field("last_name", "LastName")
//!             .maps_custom_field("loyalty", "Loyalty")
//!             .maps_parent("account", "Account", ParentOptions::default()),
//!     )
//!     .unwrap();
//!
//! let account = accounts.try_create([("name", "Acme")]).unwrap();
//! let mut contact = contacts.build([("last_name", "Doe")]);
//! contact.set("account_id", account.external_id().unwrap()).unwrap();
//! contact.try_save().unwrap();
//!
//! assert_eq!(contacts.schema().remote_name("loyalty"), Some("Acme__Loyalty__c"));
//! let parent = contact.parent("account").unwrap().unwrap();
//! assert_eq!(parent.get("name").unwrap(), "Acme");
//! ```
//!
//! Parent foreign keys are not part of the create/update payload: the
//! contact above is stored remotely without its `AccountId`.

pub mod client;
pub mod config;
pub mod errors;
pub mod id;
pub mod manifest;
pub mod naming;
pub mod query;
pub mod record;
pub mod registry;
pub mod relation;
pub mod repository;
pub mod schema;
pub mod session;
pub mod types;
pub mod validators;

pub use client::{MemoryClient, MemoryClientError, RemoteClient};
pub use config::{ClientFactory, Configuration, configuration, configure, reset_configuration};
pub use errors::*;
pub use manifest::Manifest;
pub use query::{Conditions, SelectQuery};
pub use record::{AttributeOptions, Record};
pub use registry::SchemaRegistry;
pub use relation::{CollectionProxy, Related};
pub use repository::Repo;
pub use schema::{ChildrenOptions, FieldOptions, MappedTypeSchema, ObjectOptions, ParentOptions, SchemaBuilder};
pub use session::Session;
pub use types::{
    Attributes, EXTERNAL_ID_FIELD, FieldMapping, FieldValue, PRIMARY_ID_FIELD, RelationKind, RelationshipDescriptor,
    RemoteAttributes,
};
