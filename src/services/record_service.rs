use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bson::{Bson, Document as BsonDocument};
use futures::TryStreamExt;
use tracing::{debug, error, info, warn};

use crate::database::document::{Document, ID_KEY, VERSION_KEY};
use crate::database::error::StoreError;
use crate::database::merge::Merge;
use crate::database::namespace::Namespace;
use crate::database::store::{DocumentStore, SyncOp};
use crate::filter::Filter;

/// Generic CRUD over any [`Document`] type.
///
/// The caller passes a template (or a full record) and the service derives
/// the namespace and key from it. Every backend call runs under the
/// configured operation deadline.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl RecordService {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Fetch the stored record addressed by `template`
    pub async fn get<T: Document>(&self, template: &T) -> Result<T, StoreError> {
        let ns = template.namespace()?;
        let id = template.id();
        let doc = self
            .bounded("get", self.store.find_one(&ns, &Filter::by_id(id)))
            .await?
            .ok_or_else(|| StoreError::not_found(&ns, id))?;
        decode(&ns, doc)
    }

    pub async fn create<T: Document>(&self, record: &T) -> Result<(), StoreError> {
        let ns = record.namespace()?;
        let mut doc = bson::to_document(record)?;
        doc.insert(ID_KEY, record.id());
        doc.insert(VERSION_KEY, 1_i64);

        self.bounded("create", self.store.insert_one(&ns, doc)).await?;
        info!("Created {} '{}' in {}", T::KIND, record.id(), ns);
        Ok(())
    }

    /// Merge `update` onto the stored record and write it back.
    ///
    /// The write only lands if the stored version is still the one that was
    /// read; otherwise the caller gets `VersionConflict` and nothing changes.
    pub async fn update<T: Document + Merge>(&self, update: T) -> Result<T, StoreError> {
        let ns = update.namespace()?;
        let id = update.id().to_string();

        let stored = self
            .bounded("update", self.store.find_one(&ns, &Filter::by_id(&id)))
            .await?
            .ok_or_else(|| StoreError::not_found(&ns, &id))?;
        let previous = stored.get(VERSION_KEY).cloned().unwrap_or(Bson::Null);

        let mut record: T = decode(&ns, stored)?;
        let before = record.unique_fields();
        record.merge(update);

        // Only values this update introduces need checking against other records
        for (field, value) in record.unique_fields() {
            let unchanged = before.iter().any(|(f, v)| *f == field && *v == value);
            if value.is_empty() || unchanged {
                continue;
            }
            self.ensure_unused(&ns, field, field, value, Some(id.as_str())).await?;
        }

        let mut doc = bson::to_document(&record)?;
        doc.insert(ID_KEY, id.as_str());
        doc.insert(VERSION_KEY, next_version(&previous));

        let guard = Filter::by_id(&id).eq(VERSION_KEY, previous.clone());
        let matched = self
            .bounded("update", self.store.replace_one(&ns, &guard, doc))
            .await?;
        if matched == 0 {
            let expected = version_number(&previous);
            warn!(
                "Concurrent update of {} '{}' in {} (expected version {})",
                T::KIND,
                id,
                ns,
                expected
            );
            return Err(StoreError::VersionConflict {
                namespace: ns,
                id,
                expected,
            });
        }

        debug!("Updated {} '{}' in {}", T::KIND, id, ns);
        Ok(record)
    }

    pub async fn delete<T: Document>(&self, template: &T) -> Result<(), StoreError> {
        let ns = template.namespace()?;
        let id = template.id();
        let deleted = self
            .bounded("delete", self.store.delete_one(&ns, &Filter::by_id(id)))
            .await?;
        if deleted == 0 {
            return Err(StoreError::not_found(&ns, id));
        }
        info!("Deleted {} '{}' from {}", T::KIND, id, ns);
        Ok(())
    }

    /// Every record in the template's namespace, in natural order
    pub async fn list<T: Document>(&self, template: &T) -> Result<Vec<T>, StoreError> {
        let ns = template.namespace()?;
        let docs: Vec<BsonDocument> = self
            .bounded("list", async {
                let stream = self.store.list_all(&ns).await?;
                stream.try_collect().await
            })
            .await?;

        debug!("Listed {} {} record(s) from {}", docs.len(), T::KIND, ns);
        docs.into_iter().map(|doc| decode(&ns, doc)).collect()
    }

    /// Check the record's id and candidate-unique fields against stored data.
    ///
    /// Advisory only: a concurrent writer can still slip in between this check
    /// and the insert, in which case the backend's duplicate key error wins.
    pub async fn validate_name_uniqueness<T: Document>(&self, record: &T) -> Result<(), StoreError> {
        let ns = record.namespace()?;

        let mut checks = vec![(T::ID_FIELD, ID_KEY, record.id().to_string())];
        checks.extend(
            record
                .unique_fields()
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(field, value)| (field, field, value)),
        );

        for (field, key, value) in checks {
            self.ensure_unused(&ns, field, key, value, None).await?;
        }
        Ok(())
    }

    /// `Conflict` when a record other than `exclude` already holds `value` under `key`
    async fn ensure_unused(
        &self,
        ns: &Namespace,
        field: &str,
        key: &str,
        value: String,
        exclude: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut filter = Filter::new().eq(key, value.as_str());
        if let Some(id) = exclude {
            filter = filter.ne(ID_KEY, id);
        }
        let count = self.bounded("validate", self.store.count(ns, &filter)).await?;
        if count > 0 {
            return Err(StoreError::Conflict {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    /// Push or pull `child_id` on the membership list `field` of `parent`
    pub async fn sync<P: Document>(
        &self,
        parent: &P,
        op: SyncOp,
        field: &str,
        child_id: &str,
    ) -> Result<(), StoreError> {
        let ns = parent.namespace()?;
        self.bounded(
            "sync",
            self.store
                .sync_array_field(&ns, parent.id(), op, field, Bson::String(child_id.to_string())),
        )
        .await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("ping", self.store.ping()).await
    }

    async fn bounded<R, F>(&self, operation: &'static str, fut: F) -> Result<R, StoreError>
    where
        F: Future<Output = Result<R, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                operation,
                elapsed_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

fn decode<T: Document>(ns: &Namespace, doc: BsonDocument) -> Result<T, StoreError> {
    bson::from_document(doc).map_err(|source| {
        error!("Failed to decode {} from {}: {}", T::KIND, ns, source);
        StoreError::Decode {
            namespace: ns.clone(),
            source,
        }
    })
}

fn version_number(version: &Bson) -> i64 {
    match version {
        Bson::Int64(v) => *v,
        Bson::Int32(v) => i64::from(*v),
        _ => 0,
    }
}

fn next_version(previous: &Bson) -> i64 {
    version_number(previous) + 1
}
