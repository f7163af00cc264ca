use async_trait::async_trait;
use bson::{Bson, Document};
use futures::stream::BoxStream;

use crate::database::error::StoreError;
use crate::database::namespace::Namespace;
use crate::filter::Filter;

/// Single-pass stream over every document of a namespace
pub type DocumentStream = BoxStream<'static, Result<Document, StoreError>>;

/// Membership-list edit applied by [`DocumentStore::sync_array_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Push,
    Pull,
}

impl SyncOp {
    pub fn operator(&self) -> &'static str {
        match self {
            SyncOp::Push => "$push",
            SyncOp::Pull => "$pull",
        }
    }
}

/// Namespace-scoped document storage.
///
/// Implementations share one long-lived connection handle across concurrent
/// callers and perform no client-side locking beyond what a single operation
/// needs.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// First matching document; `None` is not an error
    async fn find_one(&self, ns: &Namespace, filter: &Filter)
        -> Result<Option<Document>, StoreError>;

    /// Insert a document; fails with `DuplicateKey` when its `_id` is taken
    async fn insert_one(&self, ns: &Namespace, doc: Document) -> Result<Bson, StoreError>;

    /// Replace the first matching document, returning the matched count
    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        doc: Document,
    ) -> Result<u64, StoreError>;

    /// Delete the first matching document, returning the deleted count
    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError>;

    async fn count(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError>;

    async fn list_all(&self, ns: &Namespace) -> Result<DocumentStream, StoreError>;

    /// Push or pull `element` on the array `field` of the document keyed `id`.
    ///
    /// * missing document: `NotFound`
    /// * push onto an unset or null field: the field becomes `[element]`
    /// * pull from an unset or null field: no-op
    ///
    /// Every effective change bumps the document's version counter.
    async fn sync_array_field(
        &self,
        ns: &Namespace,
        id: &str,
        op: SyncOp,
        field: &str,
        element: Bson,
    ) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
