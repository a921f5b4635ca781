use crate::error::StoreError;
use crate::models::{FieldMap, TaskDraft, TaskInstance};
use crate::series::OrdinalPredicate;
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod tasks;

pub use memory::MemoryTaskStore;
pub use tasks::SqliteTaskStore;

/// Persistence gateway consumed by the scheduler.
///
/// Every read and write is scoped to an owner: rows of another owner behave
/// exactly like missing rows. Writes report the number of rows they touched;
/// zero is a normal outcome (the row may have been removed concurrently).
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores one row and returns its newly assigned id.
    async fn insert(&self, draft: TaskDraft) -> Result<Uuid, StoreError>;

    /// Stores rows in order and returns their ids in the same order.
    ///
    /// An implementation that cannot write the batch atomically reports the
    /// rows already written through `StoreError::Partial`.
    async fn insert_batch(&self, drafts: Vec<TaskDraft>) -> Result<Vec<Uuid>, StoreError>;

    async fn update_fields(&self, owner: Uuid, id: Uuid, fields: &FieldMap) -> Result<u64, StoreError>;

    async fn update_where(
        &self,
        owner: Uuid,
        series_id: Uuid,
        predicate: OrdinalPredicate,
        fields: &FieldMap,
    ) -> Result<u64, StoreError>;

    async fn delete_where(&self, owner: Uuid, series_id: Uuid, predicate: OrdinalPredicate) -> Result<u64, StoreError>;

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<u64, StoreError>;

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<TaskInstance>, StoreError>;

    /// Members of a series in ordinal order.
    async fn list_by_series(&self, owner: Uuid, series_id: Uuid) -> Result<Vec<TaskInstance>, StoreError>;

    /// All tasks of an owner, earliest due first.
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<TaskInstance>, StoreError>;

    /// Tasks whose id, written as hex without hyphens, starts with `prefix`.
    async fn find_by_id_prefix(&self, owner: Uuid, prefix: &str) -> Result<Vec<TaskInstance>, StoreError>;
}

/// Normalizes a short id to upper-case hex without hyphens.
///
/// Returns `None` when the input contains anything but hex digits and hyphens.
pub(crate) fn normalize_id_prefix(prefix: &str) -> Option<String> {
    let hex: String = prefix.chars().filter(|c| *c != '-').collect();
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(hex.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id_prefix() {
        assert_eq!(normalize_id_prefix("01a9-f").as_deref(), Some("01A9F"));
        assert_eq!(normalize_id_prefix("zz"), None);
        assert_eq!(normalize_id_prefix("--"), None);
    }
}
