#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use sobject::{
    ChildrenOptions, Configuration, ParentOptions, Repo, Session,
    client::RemoteClient,
    errors::RemoteError,
    types::RemoteAttributes,
};

/// A call received by [`RecordingClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { api_name: String, attributes: RemoteAttributes },
    Update { api_name: String, attributes: RemoteAttributes },
    Find { api_name: String, id: String },
    Query(String),
}

/// Stub client that records every call and answers from canned responses.
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    created_id: Mutex<String>,
    update_result: Mutex<bool>,
    records: Mutex<HashMap<String, RemoteAttributes>>,
    query_results: Mutex<VecDeque<Vec<RemoteAttributes>>>,
    failure: Mutex<Option<String>>,
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            created_id: Mutex::new("somefakeid".to_string()),
            update_result: Mutex::new(true),
            records: Mutex::new(HashMap::new()),
            query_results: Mutex::new(VecDeque::new()),
            failure: Mutex::new(None),
        }
    }
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A client whose every call fails with `message`.
    pub fn failing(message: &str) -> Arc<Self> {
        let client = Self::default();
        *client.failure.lock().unwrap() = Some(message.to_string());
        Arc::new(client)
    }

    pub fn set_created_id(&self, id: &str) {
        *self.created_id.lock().unwrap() = id.to_string();
    }

    pub fn set_update_result(&self, result: bool) {
        *self.update_result.lock().unwrap() = result;
    }

    /// Answer for `find(_, id)`.
    pub fn add_record(&self, id: &str, attributes: RemoteAttributes) {
        self.records.lock().unwrap().insert(id.to_string(), attributes);
    }

    /// Rows for the next `query` call. Queries with nothing queued return no rows.
    pub fn queue_rows(&self, rows: Vec<RemoteAttributes>) {
        self.query_results.lock().unwrap().push_back(rows);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Query(soql) => Some(soql),
                _ => None,
            })
            .collect()
    }

    pub fn find_count(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, Call::Find { .. })).count()
    }

    fn record(&self, call: Call) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

impl RemoteClient for RecordingClient {
    fn create(&self, api_name: &str, attributes: &RemoteAttributes) -> Result<String, RemoteError> {
        self.record(Call::Create {
            api_name: api_name.to_string(),
            attributes: attributes.clone(),
        })?;
        Ok(self.created_id.lock().unwrap().clone())
    }

    fn update(&self, api_name: &str, attributes: &RemoteAttributes) -> Result<bool, RemoteError> {
        self.record(Call::Update {
            api_name: api_name.to_string(),
            attributes: attributes.clone(),
        })?;
        Ok(*self.update_result.lock().unwrap())
    }

    fn find(&self, api_name: &str, id: &str) -> Result<RemoteAttributes, RemoteError> {
        self.record(Call::Find {
            api_name: api_name.to_string(),
            id: id.to_string(),
        })?;
        self.records
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| format!("{api_name} {id} not found").into())
    }

    fn query(&self, soql: &str) -> Result<Vec<RemoteAttributes>, RemoteError> {
        self.record(Call::Query(soql.to_string()))?;
        Ok(self.query_results.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Builds remote attributes from a JSON object literal.
pub fn attributes(value: Value) -> RemoteAttributes {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn session(client: Arc<RecordingClient>) -> Session {
    Session::new(Configuration::new().with_namespace("Test").with_client(client))
}

/// `TestObject` with one standard and one custom field.
pub fn test_object(session: &Session) -> Repo {
    session
        .register(
            session
                .declare("TestObject")
                .maps_object("TestObject")
                .maps_standard_field("my_field1", "MyField1")
                .maps_custom_field("my_field2", "MyField2"),
        )
        .expect("register TestObject")
}

/// `Parent` and `Child` linked through `Child.parent_id`.
pub fn family(session: &Session) -> (Repo, Repo) {
    let child = session
        .register(
            session
                .declare("Child")
                .maps_object("Child")
                .maps_standard_field("name", "Name")
                .maps_parent("parent", "Parent", ParentOptions::default()),
        )
        .expect("register Child");
    let parent = session
        .register(
            session
                .declare("Parent")
                .maps_object("Parent")
                .maps_children("children", "Child", ChildrenOptions::default()),
        )
        .expect("register Parent");
    (parent, child)
}
