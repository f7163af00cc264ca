use serde::{de::DeserializeOwned, Serialize};

use crate::database::error::StoreError;
use crate::database::namespace::{Namespace, RecordKind};

/// Field every stored document is keyed by
pub const ID_KEY: &str = "_id";

/// Field holding the optimistic-locking counter of a stored document
pub const VERSION_KEY: &str = "_version";

/// Capability every persistable record type provides.
///
/// `id()` must return a stable, non-empty value once the record is fully
/// constructed. Nothing in the store enforces this; lookups and uniqueness
/// checks against an empty id simply match nothing useful.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind of record, decides the namespace
    const KIND: RecordKind;

    /// Name of the identifier field as callers see it (used in conflict reports)
    const ID_FIELD: &'static str;

    fn id(&self) -> &str;

    /// Foreign key the namespace depends on (the owning course for scoped kinds)
    fn context_key(&self) -> Option<&str> {
        None
    }

    fn namespace(&self) -> Result<Namespace, StoreError> {
        Self::KIND.resolve(self.context_key())
    }

    /// Additional candidate-unique fields and their current values
    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}
