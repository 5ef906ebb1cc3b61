//! Process configuration: the custom-name namespace and the remote client factory.
//!
//! A [`Configuration`] is a plain value. Sessions hold their own copy; the
//! process-wide default behind [`configure`] is meant to be set once at
//! start-up and only reset by test scaffolding through [`reset_configuration`].

use std::{
    fmt,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use log::warn;

use crate::{
    client::RemoteClient,
    errors::{SObjectError, SObjectResult},
};

/// Environment variable read by [`Configuration::from_env`].
pub const NAMESPACE_ENV: &str = "SOBJECT_NAMESPACE";

/// Produces the remote client for each client-dependent call. Returning
/// `None` marks the client as unavailable.
pub type ClientFactory = Arc<dyn Fn() -> Option<Arc<dyn RemoteClient>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Configuration {
    namespace: String,
    client_factory: Option<ClientFactory>,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("namespace", &self.namespace)
            .field("client_factory", &self.client_factory.as_ref().map(|_| "<factory>"))
            .finish()
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with the namespace taken from `SOBJECT_NAMESPACE`.
    pub fn from_env() -> Self {
        let namespace = std::env::var(NAMESPACE_ENV).unwrap_or_default();
        Self::new().with_namespace(namespace)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_client_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn RemoteClient>> + Send + Sync + 'static,
    {
        self.client_factory = Some(Arc::new(factory));
        self
    }

    /// Installs a factory that always hands out the same client.
    pub fn with_client(self, client: Arc<dyn RemoteClient>) -> Self {
        self.with_client_factory(move || Some(Arc::clone(&client)))
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    pub fn set_client_factory<F>(&mut self, factory: F)
    where
        F: Fn() -> Option<Arc<dyn RemoteClient>> + Send + Sync + 'static,
    {
        self.client_factory = Some(Arc::new(factory));
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Invokes the client factory.
    pub fn client(&self) -> SObjectResult<Arc<dyn RemoteClient>> {
        let client = self.client_factory.as_ref().and_then(|factory| factory());
        client.ok_or_else(|| {
            warn!("client factory produced no remote client");
            SObjectError::ClientUnavailable
        })
    }
}

static CONFIGURATION: OnceLock<RwLock<Arc<Configuration>>> = OnceLock::new();

fn global() -> &'static RwLock<Arc<Configuration>> {
    CONFIGURATION.get_or_init(|| RwLock::new(Arc::new(Configuration::default())))
}

/// Mutates the process-wide configuration.
///
/// Schemas read the namespace when they are declared, so configure before
/// declaring any type.
pub fn configure<F>(update: F)
where
    F: FnOnce(&mut Configuration),
{
    let mut guard = global().write().unwrap_or_else(PoisonError::into_inner);
    let mut next = Configuration::clone(&guard);
    update(&mut next);
    *guard = Arc::new(next);
}

/// Snapshot of the process-wide configuration.
pub fn configuration() -> Arc<Configuration> {
    Arc::clone(&global().read().unwrap_or_else(PoisonError::into_inner))
}

/// Restores the process-wide configuration to its defaults. Intended for tests.
pub fn reset_configuration() {
    *global().write().unwrap_or_else(PoisonError::into_inner) = Arc::new(Configuration::default());
}
