use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use futures::StreamExt;
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::document::{ID_KEY, VERSION_KEY};
use crate::database::error::StoreError;
use crate::database::namespace::Namespace;
use crate::database::store::{DocumentStream, DocumentStore, SyncOp};
use crate::filter::Filter;

/// Process-local document store with MongoDB-compatible semantics.
///
/// Documents keep insertion order inside each namespace, the same natural
/// order a fresh MongoDB collection scan returns.
#[derive(Clone, Default)]
pub struct MemoryStore {
    namespaces: Arc<RwLock<HashMap<Namespace, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of namespaces that have received at least one document
    pub async fn namespace_count(&self) -> usize {
        self.namespaces.read().await.len()
    }
}

fn id_string(id: &Bson) -> String {
    match id {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn bump_version(doc: &mut Document) {
    let next = match doc.get(VERSION_KEY) {
        Some(Bson::Int64(v)) => v + 1,
        Some(Bson::Int32(v)) => i64::from(*v) + 1,
        _ => 1,
    };
    doc.insert(VERSION_KEY, Bson::Int64(next));
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let namespaces = self.namespaces.read().await;
        let found = namespaces
            .get(ns)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)))
            .cloned();
        debug!("memory find_one {} -> {}", ns, found.is_some());
        Ok(found)
    }

    async fn insert_one(&self, ns: &Namespace, mut doc: Document) -> Result<Bson, StoreError> {
        let id = match doc.get(ID_KEY) {
            Some(id) => id.clone(),
            None => {
                let generated = Bson::ObjectId(ObjectId::new());
                doc.insert(ID_KEY, generated.clone());
                generated
            }
        };

        let mut namespaces = self.namespaces.write().await;
        let docs = namespaces.entry(ns.clone()).or_default();
        if docs.iter().any(|existing| existing.get(ID_KEY) == Some(&id)) {
            return Err(StoreError::duplicate_key(ns, id_string(&id)));
        }
        docs.push(doc);
        debug!("memory insert_one {} -> {}", ns, id);
        Ok(id)
    }

    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        mut doc: Document,
    ) -> Result<u64, StoreError> {
        let mut namespaces = self.namespaces.write().await;
        let Some(docs) = namespaces.get_mut(ns) else {
            return Ok(0);
        };
        let Some(slot) = docs.iter_mut().find(|existing| filter.matches(existing)) else {
            return Ok(0);
        };

        // The key is immutable across replacements
        match slot.get(ID_KEY).cloned() {
            Some(id) => {
                doc.insert(ID_KEY, id);
            }
            None => {
                doc.remove(ID_KEY);
            }
        }
        *slot = doc;
        Ok(1)
    }

    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        let mut namespaces = self.namespaces.write().await;
        let Some(docs) = namespaces.get_mut(ns) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        let namespaces = self.namespaces.read().await;
        let count = namespaces
            .get(ns)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn list_all(&self, ns: &Namespace) -> Result<DocumentStream, StoreError> {
        // Snapshot at open time, like a server-side cursor
        let snapshot = self
            .namespaces
            .read()
            .await
            .get(ns)
            .cloned()
            .unwrap_or_default();
        Ok(futures::stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    async fn sync_array_field(
        &self,
        ns: &Namespace,
        id: &str,
        op: SyncOp,
        field: &str,
        element: Bson,
    ) -> Result<(), StoreError> {
        let by_id = Filter::by_id(id);
        let mut namespaces = self.namespaces.write().await;
        let doc = namespaces
            .get_mut(ns)
            .and_then(|docs| docs.iter_mut().find(|doc| by_id.matches(doc)))
            .ok_or_else(|| StoreError::not_found(ns, id))?;

        // Same outcomes as the server's $push/$pull on a filtered document
        let changed = match op {
            SyncOp::Push => match doc.get_mut(field) {
                Some(Bson::Array(items)) => {
                    items.push(element);
                    true
                }
                None | Some(Bson::Null) => {
                    doc.insert(field, Bson::Array(vec![element]));
                    true
                }
                Some(_) => return Err(StoreError::not_an_array(ns, id, field)),
            },
            SyncOp::Pull => match doc.get_mut(field) {
                Some(Bson::Array(items)) => {
                    let before = items.len();
                    items.retain(|item| item != &element);
                    items.len() != before
                }
                Some(scalar) if *scalar == element => {
                    return Err(StoreError::not_an_array(ns, id, field))
                }
                _ => false,
            },
        };

        if changed {
            bump_version(doc);
        }
        debug!("memory {} {}.{} on {} '{}'", op.operator(), ns, field, id, changed);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
