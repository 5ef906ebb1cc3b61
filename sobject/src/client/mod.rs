//! Remote client capability.
//!
//! This module provides:
//! - `RemoteClient` - The blocking interface the mapping layer issues create,
//!   update, find and query calls through
//! - `MemoryClient` - An in-process implementation backed by hash maps
//!
//! The mapping layer never retries, times out or wraps client failures; any
//! error a client returns reaches the caller as [`SObjectError::Remote`].
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use sobject::client::{MemoryClient, RemoteClient};
//!
//! let client = MemoryClient::new();
//! let mut attributes = serde_json::Map::new();
//! attributes.insert("Name".into(), "Acme".into());
//! let id = client.create("Account", &attributes).unwrap();
//! assert_eq!(client.find("Account", &id).unwrap()["Name"], "Acme");
//! let _shared: Arc<dyn RemoteClient> = Arc::new(client);
//! ```
//!
//! [`SObjectError::Remote`]: crate::errors::SObjectError::Remote

mod memory;

pub use memory::{MemoryClient, MemoryClientError};

use crate::{errors::RemoteError, types::RemoteAttributes};

/// Blocking client for the remote CRM service.
///
/// Attribute maps are keyed by remote field name. Implementations must be
/// shareable across threads; the mapping layer adds no coordination of its own.
pub trait RemoteClient: Send + Sync {
    /// Creates a record and returns its identifier.
    fn create(&self, api_name: &str, attributes: &RemoteAttributes) -> Result<String, RemoteError>;

    /// Updates the record identified by the `Id` entry of `attributes`.
    fn update(&self, api_name: &str, attributes: &RemoteAttributes) -> Result<bool, RemoteError>;

    /// Fetches one record, including its `Id` field. Fails if it does not exist.
    fn find(&self, api_name: &str, id: &str) -> Result<RemoteAttributes, RemoteError>;

    /// Runs a query and returns every row.
    fn query(&self, soql: &str) -> Result<Vec<RemoteAttributes>, RemoteError>;
}
