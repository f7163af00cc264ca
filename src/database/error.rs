use thiserror::Error;

use crate::database::namespace::{Namespace, RecordKind};

/// Errors from the document store and the record service
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Missing context key for {0} namespace")]
    MissingContext(RecordKind),

    #[error("Invalid namespace key: {0}")]
    InvalidNamespace(String),

    #[error("Not found: '{id}' in {namespace}")]
    NotFound { namespace: Namespace, id: String },

    #[error("Duplicate key: '{id}' already exists in {namespace}")]
    DuplicateKey { namespace: Namespace, id: String },

    #[error("{field} '{value}' already exists")]
    Conflict { field: String, value: String },

    #[error("'{id}' in {namespace} was modified concurrently (expected version {expected})")]
    VersionConflict {
        namespace: Namespace,
        id: String,
        expected: i64,
    },

    #[error("Field '{field}' of '{id}' in {namespace} is not an array")]
    NotAnArray {
        namespace: Namespace,
        id: String,
        field: String,
    },

    #[error("Failed to decode document from {namespace}: {source}")]
    Decode {
        namespace: Namespace,
        #[source]
        source: bson::de::Error,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("{operation} timed out after {elapsed_ms}ms")]
    Timeout {
        operation: &'static str,
        elapsed_ms: u64,
    },

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

impl StoreError {
    pub fn not_found(namespace: &Namespace, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            namespace: namespace.clone(),
            id: id.into(),
        }
    }

    pub fn duplicate_key(namespace: &Namespace, id: impl Into<String>) -> Self {
        StoreError::DuplicateKey {
            namespace: namespace.clone(),
            id: id.into(),
        }
    }

    pub fn not_an_array(namespace: &Namespace, id: impl Into<String>, field: &str) -> Self {
        StoreError::NotAnArray {
            namespace: namespace.clone(),
            id: id.into(),
            field: field.to_string(),
        }
    }

    /// Whether a failure originates from the backend connection rather than the data
    pub fn is_backend(&self) -> bool {
        matches!(self, StoreError::Mongo(_) | StoreError::Timeout { .. })
    }
}
