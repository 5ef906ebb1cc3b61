//! Type-level operations: construction, creation and the finders.

use std::sync::Arc;

use log::debug;

use crate::{
    errors::{SObjectError, SObjectResult},
    query::{self, Conditions, SelectQuery},
    record::Record,
    schema::MappedTypeSchema,
    session::Session,
    types::FieldValue,
};

/// Handle on one registered type within a [`Session`].
#[derive(Debug, Clone)]
pub struct Repo {
    schema: Arc<MappedTypeSchema>,
    session: Session,
}

impl Repo {
    pub fn new(schema: Arc<MappedTypeSchema>, session: Session) -> Self {
        Self { schema, session }
    }

    pub fn schema(&self) -> &Arc<MappedTypeSchema> {
        &self.schema
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api_name(&self) -> &str {
        self.schema.api_name()
    }

    /// A new, empty record.
    pub fn new_record(&self) -> Record {
        self.build(std::iter::empty::<(&str, FieldValue)>())
    }

    /// A new record from local-keyed values. Unknown keys are dropped.
    pub fn build<I, K, V>(&self, values: I) -> Record
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        Record::construct(self.clone(), values, false)
    }

    /// A record from remote-keyed values, as returned by the remote client.
    /// Keys already in local form are accepted as well.
    pub fn build_translated<I, K, V>(&self, values: I) -> Record
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        Record::construct(self.clone(), values, true)
    }

    /// Builds and saves a record. Failure is logged and leaves the returned
    /// record new; use [`try_create`](Self::try_create) to observe the error.
    pub fn create<I, K, V>(&self, values: I) -> Record
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut record = self.build(values);
        record.save();
        record
    }

    pub fn try_create<I, K, V>(&self, values: I) -> SObjectResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut record = self.build(values);
        record.try_save()?;
        Ok(record)
    }

    /// Fetches one record by identifier.
    pub fn find(&self, id: &str) -> SObjectResult<Record> {
        let client = self.session.client()?;
        debug!("find {} {id}", self.api_name());
        let values = client.find(self.api_name(), id).map_err(SObjectError::Remote)?;
        Ok(self.build_translated(values))
    }

    /// First record matching `conditions`, if any.
    pub fn find_by(&self, conditions: impl Into<Conditions>) -> SObjectResult<Option<Record>> {
        Ok(self.find_where(conditions)?.into_iter().next())
    }

    /// Every record matching `conditions`, in the order the client returns them.
    pub fn find_where(&self, conditions: impl Into<Conditions>) -> SObjectResult<Vec<Record>> {
        let statement = SelectQuery::all_fields(&self.schema, &conditions.into())?;
        self.run(&statement)
    }

    /// Every record of this type.
    pub fn all(&self) -> SObjectResult<Vec<Record>> {
        self.find_where(Conditions::new())
    }

    /// Whether at least one record matches `conditions`. Asks the client for
    /// the identifier of at most one row.
    pub fn exists(&self, conditions: impl Into<Conditions>) -> SObjectResult<bool> {
        let statement = SelectQuery::existence(&self.schema, &conditions.into())?;
        let client = self.session.client()?;
        let statement = statement.to_string();
        debug!("exists: {statement}");
        let rows = client.query(&statement).map_err(SObjectError::Remote)?;
        Ok(!rows.is_empty())
    }

    /// The predicate [`find_where`](Self::find_where) would send.
    pub fn build_where(&self, conditions: impl Into<Conditions>) -> SObjectResult<String> {
        query::build_where(&self.schema, &conditions.into())
    }

    fn run(&self, statement: &SelectQuery) -> SObjectResult<Vec<Record>> {
        let client = self.session.client()?;
        let statement = statement.to_string();
        debug!("query: {statement}");
        let rows = client.query(&statement).map_err(SObjectError::Remote)?;
        debug!("{} {} rows returned", rows.len(), self.api_name());
        Ok(rows.into_iter().map(|row| self.build_translated(row)).collect())
    }
}
