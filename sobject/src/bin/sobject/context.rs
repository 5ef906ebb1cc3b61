use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use serde_json::Value;
use sobject::{Configuration, Manifest, MemoryClient, RemoteAttributes, Session};

/// A manifest loaded into its own session
pub struct ManifestContext {
    pub path: PathBuf,
    pub session: Session,
    /// Present when rows were loaded with `--data`
    pub client: Option<Arc<MemoryClient>>,
}

/// Rows keyed by remote api name, as stored in a `--data` file
type DataFile = BTreeMap<String, Vec<RemoteAttributes>>;

impl ManifestContext {
    /// Reads the manifest without registering anything.
    pub fn read(path: &Path) -> Result<Manifest> {
        Manifest::from_path(path).with_context(|| format!("Failed to load manifest {}", path.display()))
    }

    /// Reads and registers `path`. `namespace` overrides `SOBJECT_NAMESPACE`;
    /// `data` seeds an in-memory client.
    pub fn load(path: &Path, namespace: Option<&str>, data: Option<&Path>) -> Result<Self> {
        let manifest = Self::read(path)?;

        let mut config = Configuration::from_env();
        if let Some(namespace) = namespace {
            config.set_namespace(namespace);
        }

        let client = match data {
            Some(data) => Some(Arc::new(load_rows(data)?)),
            None => None,
        };
        if let Some(client) = &client {
            config = config.with_client(Arc::clone(client) as Arc<dyn sobject::RemoteClient>);
        }

        let session = Session::new(config);
        manifest
            .register(&session)
            .with_context(|| format!("Failed to register manifest {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            session,
            client,
        })
    }
}

fn load_rows(path: &Path) -> Result<MemoryClient> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read data file {}", path.display()))?;
    let data: DataFile =
        serde_json::from_str(&raw).with_context(|| format!("Data file {} is not valid JSON", path.display()))?;

    let client = MemoryClient::new();
    for (api_name, rows) in data {
        for row in rows {
            client.insert(&api_name, row);
        }
    }
    Ok(client)
}

/// Parses `field=value`. Values that parse as JSON scalars keep their type.
pub fn parse_condition(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    let value = match serde_json::from_str::<Value>(value) {
        Ok(scalar @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => scalar,
        _ => Value::String(value.to_string()),
    };
    Ok((field.to_string(), value))
}
