//! Relationship resolution.
//!
//! Parent relationships fetch the owning record through its foreign key on
//! every access. Children relationships hand back a [`CollectionProxy`]
//! that runs no query until one of its finders is called.

use log::debug;

use crate::{
    errors::SObjectResult,
    query::Conditions,
    record::Record,
    repository::Repo,
    types::{EXTERNAL_ID_FIELD, FieldValue, RelationKind, RelationshipDescriptor, is_blank, render_value},
};

/// Outcome of resolving a relationship on a record.
#[derive(Debug, Clone)]
pub enum Related {
    /// The parent record, or `None` when the foreign key is blank.
    Parent(Option<Record>),
    Children(CollectionProxy),
}

pub(crate) fn resolve(record: &Record, descriptor: &RelationshipDescriptor) -> SObjectResult<Related> {
    match descriptor.kind {
        RelationKind::Parent => resolve_parent(record, descriptor).map(Related::Parent),
        RelationKind::Children => {
            let repo = record.repo().session().repo(&descriptor.target)?;
            let parent_id = record.get(EXTERNAL_ID_FIELD).cloned().unwrap_or_default();
            Ok(Related::Children(CollectionProxy::new(
                repo,
                parent_id,
                descriptor.foreign_key.clone(),
            )))
        }
    }
}

fn resolve_parent(record: &Record, descriptor: &RelationshipDescriptor) -> SObjectResult<Option<Record>> {
    let foreign_key = match record.get(&descriptor.foreign_key) {
        Some(value) if !is_blank(value) => render_value(value).into_owned(),
        _ => return Ok(None),
    };
    let repo = record.repo().session().repo(&descriptor.target)?;
    debug!("resolving {} {foreign_key} for {}", descriptor.name, record.schema().type_key());
    repo.find(&foreign_key).map(Some)
}

/// Query facade over the children of one record.
///
/// Every finder constrains the child foreign key to the owner's external id,
/// overriding any value the caller supplied for that field.
#[derive(Debug, Clone)]
pub struct CollectionProxy {
    repo: Repo,
    parent_id: FieldValue,
    foreign_key: String,
}

impl CollectionProxy {
    pub fn new(repo: Repo, parent_id: FieldValue, foreign_key: impl Into<String>) -> Self {
        Self {
            repo,
            parent_id,
            foreign_key: foreign_key.into(),
        }
    }

    /// Repository of the child type.
    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    /// External id of the owning record.
    pub fn parent_id(&self) -> &FieldValue {
        &self.parent_id
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    /// The child with identifier `id`, if it belongs to the owner.
    pub fn find(&self, id: &str) -> SObjectResult<Option<Record>> {
        self.find_by([(EXTERNAL_ID_FIELD, id)])
    }

    pub fn find_by(&self, conditions: impl Into<Conditions>) -> SObjectResult<Option<Record>> {
        self.repo.find_by(self.scope(conditions.into()))
    }

    pub fn find_where(&self, conditions: impl Into<Conditions>) -> SObjectResult<Vec<Record>> {
        self.repo.find_where(self.scope(conditions.into()))
    }

    pub fn exists(&self, conditions: impl Into<Conditions>) -> SObjectResult<bool> {
        self.repo.exists(self.scope(conditions.into()))
    }

    /// Every child of the owner.
    pub fn all(&self) -> SObjectResult<Vec<Record>> {
        self.find_where(Conditions::new())
    }

    fn scope(&self, mut conditions: Conditions) -> Conditions {
        conditions.set(self.foreign_key.clone(), self.parent_id.clone());
        conditions
    }
}
