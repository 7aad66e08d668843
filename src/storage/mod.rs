pub mod blob_store;
pub mod task_store;

pub use blob_store::{BlobStore, FsBlobStore};
pub use task_store::{TASKS_RECORD, TaskStore};

#[cfg(test)]
pub use blob_store::MemoryBlobStore;
