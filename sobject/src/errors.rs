use std::borrow::Cow;

use thiserror::Error;

/// Error produced by a [`RemoteClient`](crate::client::RemoteClient) implementation.
///
/// The mapping layer never inspects or wraps these beyond carrying them in
/// [`SObjectError::Remote`].
pub type RemoteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type returned by the mapping layer.
#[derive(Debug, Error)]
pub enum SObjectError {
    /// A schema declaration is incomplete or inconsistent.
    #[error("schema error: {message}")]
    Schema { message: Cow<'static, str> },

    /// A condition or assignment referenced a field the type does not declare.
    #[error("'{field}' is not an attribute of {api_name}")]
    UnknownField { field: String, api_name: String },

    /// The bidirectional field table would stop being a bijection.
    #[error("remote field '{remote}' conflicts with existing mapping '{existing_remote}' -> '{existing_local}' (requested local name '{local}')")]
    DuplicateField {
        remote: String,
        local: String,
        existing_remote: String,
        existing_local: String,
    },

    /// No schema is registered under the requested type key.
    #[error("no schema registered for type '{type_key}'")]
    UnknownType { type_key: String },

    /// The record's type does not declare the requested relationship.
    #[error("relationship '{name}' is not declared on {type_key}")]
    UnknownRelationship { name: String, type_key: String },

    /// The configured client factory produced no usable client.
    #[error("unable to establish remote client")]
    ClientUnavailable,

    /// The remote client reported a failure. Carried unmodified.
    #[error("remote operation failed: {0}")]
    Remote(#[source] RemoteError),

    /// A create or update completed without error but reported no success.
    #[error("{operation} of {api_name} was not successful")]
    SaveFailed { operation: &'static str, api_name: String },

    /// Validation failed for one or more declarations or values.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// A schema manifest could not be parsed.
    #[error("invalid manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    /// A schema manifest could not be read.
    #[error("unable to read manifest: {0}")]
    Io(#[from] std::io::Error),
}

impl SObjectError {
    pub(crate) fn schema(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Schema { message: message.into() }
    }

    /// Returns `true` for errors caused by the shape of a schema or by a
    /// reference to something a schema does not declare.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. }
                | Self::UnknownField { .. }
                | Self::DuplicateField { .. }
                | Self::UnknownType { .. }
                | Self::UnknownRelationship { .. }
        )
    }
}

/// Collection of validation issues encountered while checking declarations or values.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Detailed validation failure for a single field or logical path.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub type SObjectResult<T> = Result<T, SObjectError>;
