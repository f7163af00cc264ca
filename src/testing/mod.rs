use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::error::StoreError;
use crate::database::memory::MemoryStore;
use crate::database::models::{Bio, Content, Course, Lesson, Role, User};
use crate::database::namespace::Namespace;
use crate::database::store::{DocumentStore, DocumentStream, SyncOp};
use crate::filter::Filter;
use crate::services::{CourseService, RecordService};

/// Services wired over a fresh in-memory store
pub struct TestContext {
    pub store: MemoryStore,
    pub records: RecordService,
    pub courses: CourseService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        Self::with_store(store.clone(), Arc::new(store))
    }

    /// Route service traffic through `backend` while keeping direct access to `store`
    pub fn with_store(store: MemoryStore, backend: Arc<dyn DocumentStore>) -> Self {
        let records = RecordService::new(backend, Duration::from_secs(5));
        let courses = CourseService::new(records.clone());
        Self {
            store,
            records,
            courses,
        }
    }

    /// Course id that is unique per test and valid as a database name
    pub fn unique_course_id(&self) -> String {
        format!("test_{}", Uuid::new_v4().simple())
    }
}

pub fn course(id: &str) -> Course {
    Course {
        title: "Rust Fundamentals".into(),
        description: "Ownership and borrowing".into(),
        instructors: vec!["sakib".into()],
        start_date: NaiveDate::from_ymd_opt(2024, 1, 15),
        duration: 8,
        price: "5000".into(),
        ..Course::with_id(id)
    }
}

pub fn lesson(course_ref: &str, id: &str) -> Lesson {
    Lesson {
        title: format!("Lesson {}", id),
        description: "Walkthrough".into(),
        ..Lesson::with_id(course_ref, id)
    }
}

pub fn content(course_ref: &str, lesson_ref: &str, id: &str) -> Content {
    Content {
        lesson_ref: lesson_ref.into(),
        name: format!("Video {}", id),
        kind: "video".into(),
        url: format!("https://cdn.example.com/{}.mp4", id),
        duration: 12,
        ..Content::with_id(course_ref, id)
    }
}

pub fn user(name: &str) -> User {
    User {
        email: format!("{}@example.com", name),
        phone: "01700000000".into(),
        role: Some(Role::Student),
        bio: Some(Bio {
            address: "Dhaka".into(),
            phone: "01700000000".into(),
            postal_code: 1207,
        }),
        ..User::with_id(name)
    }
}

/// [`MemoryStore`] wrapper that injects latency and sync failures
#[derive(Clone, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    read_delay: Option<Duration>,
    fail_sync: bool,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrapping(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Hold every read result for `delay` before handing it back
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn with_failing_sync(mut self) -> Self {
        self.fail_sync = true;
        self
    }

    async fn stall(&self) {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    fn backend(&self) -> &'static str {
        "faulty"
    }

    async fn find_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
    ) -> Result<Option<BsonDocument>, StoreError> {
        let found = self.inner.find_one(ns, filter).await;
        self.stall().await;
        found
    }

    async fn insert_one(&self, ns: &Namespace, doc: BsonDocument) -> Result<Bson, StoreError> {
        self.inner.insert_one(ns, doc).await
    }

    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        doc: BsonDocument,
    ) -> Result<u64, StoreError> {
        self.inner.replace_one(ns, filter, doc).await
    }

    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        self.inner.delete_one(ns, filter).await
    }

    async fn count(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        let count = self.inner.count(ns, filter).await;
        self.stall().await;
        count
    }

    async fn list_all(&self, ns: &Namespace) -> Result<DocumentStream, StoreError> {
        self.inner.list_all(ns).await
    }

    async fn sync_array_field(
        &self,
        ns: &Namespace,
        id: &str,
        op: SyncOp,
        field: &str,
        element: Bson,
    ) -> Result<(), StoreError> {
        if self.fail_sync {
            return Err(StoreError::Timeout {
                operation: "sync",
                elapsed_ms: 0,
            });
        }
        self.inner.sync_array_field(ns, id, op, field, element).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
