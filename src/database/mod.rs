pub mod document;
pub mod error;
pub mod memory;
pub mod merge;
pub mod models;
pub mod mongo;
pub mod namespace;
pub mod store;

pub use document::Document;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use merge::Merge;
pub use mongo::MongoStore;
pub use namespace::{Namespace, RecordKind};
pub use store::{DocumentStore, SyncOp};
