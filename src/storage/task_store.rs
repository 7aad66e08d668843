// Task store - JSON persistence of the task list in a single record

use serde_json::Value;

use super::BlobStore;
use crate::error::StorageError;
use crate::models::Task;

pub const TASKS_RECORD: &str = "tasks.json";

const EMPTY_RECORD: &[u8] = b"[]";

pub struct TaskStore {
    blobs: Box<dyn BlobStore>,
    key: String,
}

impl TaskStore {
    pub fn new(blobs: Box<dyn BlobStore>) -> Self {
        Self::with_key(blobs, TASKS_RECORD)
    }

    pub fn with_key(blobs: Box<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
        }
    }

    /// Creates the record with an empty list if it is missing. Idempotent.
    pub fn ensure_record_exists(&self) -> Result<(), StorageError> {
        if self.blobs.exists(&self.key)? {
            return Ok(());
        }

        tracing::info!(target: "storage", record = %self.key, "Creating task record");
        self.blobs.create(&self.key)?;
        self.blobs.write_all(&self.key, EMPTY_RECORD)?;
        Ok(())
    }

    /// Loads the task list. Never fails: a missing, unreadable or malformed
    /// record yields an empty list and a log entry.
    pub fn load(&self) -> Vec<Task> {
        let bytes = match self
            .ensure_record_exists()
            .and_then(|_| self.blobs.read_all(&self.key))
        {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(target: "storage", record = %self.key, error = %err, "Failed to read tasks");
                return Vec::new();
            }
        };

        match decode_tasks(&bytes) {
            Ok(tasks) => {
                tracing::info!(target: "storage", record = %self.key, count = tasks.len(), "Loaded tasks");
                tasks
            }
            Err(reason) => {
                tracing::warn!(target: "storage", record = %self.key, reason = %reason, "Ignoring unusable task record");
                Vec::new()
            }
        }
    }

    pub fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.ensure_record_exists()?;
        let bytes = encode_tasks(tasks)?;

        if let Err(err) = self.blobs.write_all(&self.key, &bytes) {
            tracing::error!(target: "storage", record = %self.key, error = %err, "Failed to save tasks");
            return Err(err);
        }

        tracing::debug!(target: "storage", record = %self.key, count = tasks.len(), "Saved tasks");
        Ok(())
    }
}

/// Pretty-printed JSON array, two-space indentation.
pub fn encode_tasks(tasks: &[Task]) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec_pretty(tasks)?)
}

/// Decodes a record into tasks. The error is a human readable reason for the
/// log, not something callers are expected to act on.
pub fn decode_tasks(bytes: &[u8]) -> Result<Vec<Task>, String> {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(err) => return Err(format!("invalid JSON: {err}")),
    };

    match value {
        Value::Array(_) => {
            serde_json::from_value(value).map_err(|err| format!("malformed task: {err}"))
        }
        other => Err(format!("expected an array, found {}", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
