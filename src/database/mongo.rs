//! MongoDB-backed document store
//!
//! One `Client` is built at startup and shared by every request; the driver
//! keeps its own connection pool, so no additional caching happens here.

use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, Credential},
    Client, Collection,
};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::database::document::{ID_KEY, VERSION_KEY};
use crate::database::error::StoreError;
use crate::database::namespace::Namespace;
use crate::database::store::{DocumentStream, DocumentStore, SyncOp};
use crate::filter::Filter;

/// Server error code for unique index violations
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Server error codes for an update operator applied to the wrong type
const BAD_VALUE_CODE: i32 = 2;
const TYPE_MISMATCH_CODE: i32 = 14;

/// Database that holds the credentials of application users
const AUTH_SOURCE: &str = "admin";

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Connect and verify the server answers a ping
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let uri = config
            .uri
            .as_deref()
            .ok_or(StoreError::ConfigMissing("MONGODB_URI"))?;
        info!("Connecting to MongoDB at {}", redact_uri(uri));

        let mut options = ClientOptions::parse(uri).await?;
        let timeout = Duration::from_millis(config.connect_timeout_ms);
        options.app_name = Some(config.app_name.clone());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.max_pool_size = Some(config.max_pool_size);

        if let Some(username) = &config.username {
            let mut credential = Credential::default();
            credential.username = Some(username.clone());
            credential.password = config.password.clone();
            credential.source = Some(AUTH_SOURCE.to_string());
            options.credential = Some(credential);
        }

        let store = Self::from_client(Client::with_options(options)?);
        store.ping().await?;
        info!("Connected to MongoDB");
        Ok(store)
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Close every pooled connection (e.g., on shutdown)
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("Closed MongoDB client");
    }

    fn collection(&self, ns: &Namespace) -> Collection<Document> {
        self.client
            .database(&ns.database)
            .collection::<Document>(&ns.collection)
    }
}

fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &uri[..scheme_end], &uri[at..])
        }
        _ => uri.to_string(),
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    write_error_code(err) == Some(DUPLICATE_KEY_CODE)
}

fn write_error_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        _ => None,
    }
}

/// `$push`/`$pull` onto a field holding a non-array value
fn array_operator_error(err: mongodb::error::Error, ns: &Namespace, id: &str, field: &str) -> StoreError {
    match write_error_code(&err) {
        Some(BAD_VALUE_CODE) | Some(TYPE_MISMATCH_CODE) => StoreError::not_an_array(ns, id, field),
        _ => err.into(),
    }
}

fn key_string(id: Option<&Bson>) -> String {
    match id {
        Some(Bson::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn by_id(id: &str) -> Document {
    doc! { ID_KEY: id }
}

/// `{ <op>: { <field>: <value> }, $inc: { _version: 1 } }`
fn versioned_update(op: &str, field: &str, value: Bson) -> Document {
    let mut change = Document::new();
    change.insert(field, value);

    let mut update = Document::new();
    update.insert(op, change);
    update.insert("$inc", doc! { VERSION_KEY: 1i64 });
    update
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn find_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        debug!("mongo find_one {} {:?}", ns, filter);
        Ok(self.collection(ns).find_one(filter.to_document()).await?)
    }

    async fn insert_one(&self, ns: &Namespace, doc: Document) -> Result<Bson, StoreError> {
        let id = key_string(doc.get(ID_KEY));
        debug!("mongo insert_one {} '{}'", ns, id);
        match self.collection(ns).insert_one(doc).await {
            Ok(result) => Ok(result.inserted_id),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::duplicate_key(ns, id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        doc: Document,
    ) -> Result<u64, StoreError> {
        debug!("mongo replace_one {} {:?}", ns, filter);
        let result = self
            .collection(ns)
            .replace_one(filter.to_document(), doc)
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        debug!("mongo delete_one {} {:?}", ns, filter);
        let result = self.collection(ns).delete_one(filter.to_document()).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        Ok(self
            .collection(ns)
            .count_documents(filter.to_document())
            .await?)
    }

    async fn list_all(&self, ns: &Namespace) -> Result<DocumentStream, StoreError> {
        let cursor = self.collection(ns).find(doc! {}).await?;
        Ok(cursor.map_err(StoreError::from).boxed())
    }

    async fn sync_array_field(
        &self,
        ns: &Namespace,
        id: &str,
        op: SyncOp,
        field: &str,
        element: Bson,
    ) -> Result<(), StoreError> {
        let collection = self.collection(ns);
        debug!("mongo {} {}.{} on '{}'", op.operator(), ns, field, id);

        let matched = match op {
            SyncOp::Push => {
                // Unset or null: initialise instead of pushing
                let mut unset = by_id(id);
                unset.insert(field, Bson::Null);
                let init = collection
                    .update_one(
                        unset,
                        versioned_update("$set", field, Bson::Array(vec![element.clone()])),
                    )
                    .await?;
                if init.matched_count > 0 {
                    return Ok(());
                }
                collection
                    .update_one(by_id(id), versioned_update("$push", field, element))
                    .await
                    .map_err(|err| array_operator_error(err, ns, id, field))?
                    .matched_count
            }
            SyncOp::Pull => {
                // Only touch documents whose array holds the element
                let mut holding = by_id(id);
                holding.insert(field, element.clone());
                let pulled = collection
                    .update_one(holding, versioned_update("$pull", field, element))
                    .await
                    .map_err(|err| array_operator_error(err, ns, id, field))?
                    .matched_count;
                if pulled > 0 {
                    return Ok(());
                }
                collection.count_documents(by_id(id)).await?
            }
        };

        if matched == 0 {
            return Err(StoreError::not_found(ns, id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(AUTH_SOURCE)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
