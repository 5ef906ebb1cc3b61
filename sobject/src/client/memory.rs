use std::{
    collections::HashMap,
    sync::{LazyLock, Mutex, PoisonError, RwLock},
};

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::RemoteClient;
use crate::{
    errors::RemoteError,
    id,
    types::{PRIMARY_ID_FIELD, RemoteAttributes, render_value},
};

static SELECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*SELECT\s+(?P<fields>.+?)\s+FROM\s+(?P<object>\w+)(?:\s+WHERE\s+(?P<predicate>.+?))?(?:\s+LIMIT\s+(?P<limit>\d+))?\s*$",
    )
    .expect("valid regex")
});
static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?P<field>\w+)\s*=\s*'(?P<value>.*?)'(?:\s+AND\s+|\s*$)").expect("valid regex")
});

#[derive(Debug, Error)]
pub enum MemoryClientError {
    #[error("{api_name} record '{id}' not found")]
    NotFound { api_name: String, id: String },

    #[error("{api_name} update requires a non-empty Id")]
    MissingId { api_name: String },

    #[error("unsupported query: {soql}")]
    UnsupportedQuery { soql: String },
}

/// In-process [`RemoteClient`] storing rows per object api name.
///
/// Queries are limited to the grammar the condition builder emits:
/// `SELECT f1,f2 FROM Object [WHERE F = 'v' AND ...] [LIMIT n]`.
/// A literal ends at the first quote followed by `AND` or the end of the
/// predicate, so values may contain ` AND ` or single quotes, but a value
/// containing `' AND ` is read as two clauses.
/// Identifiers compare on their 15-character form, so a row created with an
/// 18-character id is found by the truncated id a record keeps.
#[derive(Debug, Default)]
pub struct MemoryClient {
    objects: RwLock<HashMap<String, Vec<RemoteAttributes>>>,
    queries: Mutex<Vec<String>>,
}

struct ParsedQuery {
    fields: Vec<String>,
    object: String,
    clauses: Vec<(String, String)>,
    limit: Option<usize>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a row directly, generating an `Id` when the row carries none.
    pub fn insert(&self, api_name: &str, mut attributes: RemoteAttributes) -> String {
        let id = match attributes.get(PRIMARY_ID_FIELD).and_then(Value::as_str) {
            Some(existing) if !existing.is_empty() => existing.to_string(),
            _ => {
                let generated = id::generate_id(api_name);
                attributes.insert(PRIMARY_ID_FIELD.to_string(), Value::String(generated.clone()));
                generated
            }
        };
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(api_name.to_string())
            .or_default()
            .push(attributes);
        id
    }

    /// Snapshot of every row stored for `api_name`.
    pub fn rows(&self, api_name: &str) -> Vec<RemoteAttributes> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(api_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Every query string received, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn parse(soql: &str) -> Result<ParsedQuery, MemoryClientError> {
        let unsupported = || MemoryClientError::UnsupportedQuery { soql: soql.to_string() };
        let captures = SELECT.captures(soql).ok_or_else(unsupported)?;

        let fields = captures["fields"]
            .split(',')
            .map(|field| field.trim().to_string())
            .filter(|field| !field.is_empty())
            .collect();
        let object = captures["object"].to_string();

        let mut clauses = Vec::new();
        if let Some(predicate) = captures.name("predicate") {
            let mut rest = predicate.as_str();
            while !rest.trim().is_empty() {
                let parsed = CLAUSE.captures(rest).ok_or_else(unsupported)?;
                clauses.push((parsed["field"].to_string(), parsed["value"].to_string()));
                rest = &rest[parsed.get(0).map_or(rest.len(), |clause| clause.end())..];
            }
        }

        let limit = match captures.name("limit") {
            Some(raw) => Some(raw.as_str().parse::<usize>().map_err(|_| unsupported())?),
            None => None,
        };

        Ok(ParsedQuery {
            fields,
            object,
            clauses,
            limit,
        })
    }
}

fn same_id(left: &str, right: &str) -> bool {
    id::truncate_id(left) == id::truncate_id(right)
}

fn row_id(row: &RemoteAttributes) -> Option<&str> {
    row.get(PRIMARY_ID_FIELD).and_then(Value::as_str)
}

fn matches_literal(stored: Option<&Value>, literal: &str) -> bool {
    let rendered = stored.map(render_value).unwrap_or_default();
    rendered == literal || (id::is_valid_id(&rendered) && id::is_valid_id(literal) && same_id(&rendered, literal))
}

impl RemoteClient for MemoryClient {
    fn create(&self, api_name: &str, attributes: &RemoteAttributes) -> Result<String, RemoteError> {
        let mut row = attributes.clone();
        row.remove(PRIMARY_ID_FIELD);
        Ok(self.insert(api_name, row))
    }

    fn update(&self, api_name: &str, attributes: &RemoteAttributes) -> Result<bool, RemoteError> {
        let target = attributes
            .get(PRIMARY_ID_FIELD)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MemoryClientError::MissingId {
                api_name: api_name.to_string(),
            })?;

        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        let row = objects
            .get_mut(api_name)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row).is_some_and(|id| same_id(id, target))))
            .ok_or_else(|| MemoryClientError::NotFound {
                api_name: api_name.to_string(),
                id: target.to_string(),
            })?;

        for (field, value) in attributes {
            if field != PRIMARY_ID_FIELD {
                row.insert(field.clone(), value.clone());
            }
        }
        Ok(true)
    }

    fn find(&self, api_name: &str, id: &str) -> Result<RemoteAttributes, RemoteError> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        objects
            .get(api_name)
            .and_then(|rows| rows.iter().find(|row| row_id(row).is_some_and(|stored| same_id(stored, id))))
            .cloned()
            .ok_or_else(|| {
                MemoryClientError::NotFound {
                    api_name: api_name.to_string(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    fn query(&self, soql: &str) -> Result<Vec<RemoteAttributes>, RemoteError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(soql.to_string());

        let parsed = Self::parse(soql)?;
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let rows = objects.get(&parsed.object).map(Vec::as_slice).unwrap_or_default();

        let selected = rows
            .iter()
            .filter(|row| {
                parsed
                    .clauses
                    .iter()
                    .all(|(field, literal)| matches_literal(row.get(field), literal))
            })
            .take(parsed.limit.unwrap_or(usize::MAX))
            .map(|row| {
                parsed
                    .fields
                    .iter()
                    .map(|field| (field.clone(), row.get(field).cloned().unwrap_or(Value::Null)))
                    .collect::<RemoteAttributes>()
            })
            .collect();
        Ok(selected)
    }
}
