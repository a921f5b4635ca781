use crate::error::StoreError;
use crate::models::{FieldMap, TaskDraft, TaskInstance};
use crate::repository::normalize_id_prefix;
use crate::series::OrdinalPredicate;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// In-process gateway backed by a vector of rows.
///
/// Used for embedding the scheduler without a database and in unit tests.
/// Batches are applied under a single lock, so they are atomic here as well.
#[derive(Default)]
pub struct MemoryTaskStore {
    rows: Mutex<Vec<TaskInstance>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored row, across all owners.
    pub fn snapshot(&self) -> Result<Vec<TaskInstance>, StoreError> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<TaskInstance>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn series_member(task: &TaskInstance, owner: Uuid, series_id: Uuid, predicate: OrdinalPredicate) -> bool {
        task.owner_id == owner && task.series_id == Some(series_id) && predicate.matches(task.ordinal)
    }
}

fn apply_fields(task: &mut TaskInstance, fields: &FieldMap) {
    fields.apply(task);
    task.updated_at = Utc::now();
}

#[async_trait]
impl super::TaskStore for MemoryTaskStore {
    async fn insert(&self, draft: TaskDraft) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        self.lock()?.push(draft.into_instance(id, Utc::now()));
        tracing::debug!(task_id = %id, "inserted task");
        Ok(id)
    }

    async fn insert_batch(&self, drafts: Vec<TaskDraft>) -> Result<Vec<Uuid>, StoreError> {
        let mut rows = self.lock()?;
        let now = Utc::now();
        let ids: Vec<Uuid> = drafts
            .into_iter()
            .map(|draft| {
                let id = Uuid::now_v7();
                rows.push(draft.into_instance(id, now));
                id
            })
            .collect();
        tracing::debug!(rows = ids.len(), "inserted task batch");
        Ok(ids)
    }

    async fn update_fields(&self, owner: Uuid, id: Uuid, fields: &FieldMap) -> Result<u64, StoreError> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut rows = self.lock()?;
        let mut affected = 0;
        for task in rows.iter_mut().filter(|t| t.id == id && t.owner_id == owner) {
            apply_fields(task, fields);
            affected += 1;
        }
        tracing::debug!(task_id = %id, rows = affected, "updated task");
        Ok(affected)
    }

    async fn update_where(
        &self,
        owner: Uuid,
        series_id: Uuid,
        predicate: OrdinalPredicate,
        fields: &FieldMap,
    ) -> Result<u64, StoreError> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut rows = self.lock()?;
        let mut affected = 0;
        for task in rows
            .iter_mut()
            .filter(|t| Self::series_member(t, owner, series_id, predicate))
        {
            apply_fields(task, fields);
            affected += 1;
        }
        tracing::debug!(series_id = %series_id, predicate = ?predicate, rows = affected, "updated series members");
        Ok(affected)
    }

    async fn delete_where(&self, owner: Uuid, series_id: Uuid, predicate: OrdinalPredicate) -> Result<u64, StoreError> {
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|t| !Self::series_member(t, owner, series_id, predicate));
        let affected = (before - rows.len()) as u64;
        tracing::debug!(series_id = %series_id, predicate = ?predicate, rows = affected, "deleted series members");
        Ok(affected)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<u64, StoreError> {
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|t| !(t.id == id && t.owner_id == owner));
        let affected = (before - rows.len()) as u64;
        tracing::debug!(task_id = %id, rows = affected, "deleted task");
        Ok(affected)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<TaskInstance>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .find(|t| t.id == id && t.owner_id == owner)
            .cloned())
    }

    async fn list_by_series(&self, owner: Uuid, series_id: Uuid) -> Result<Vec<TaskInstance>, StoreError> {
        let mut members: Vec<TaskInstance> = self
            .lock()?
            .iter()
            .filter(|t| t.owner_id == owner && t.series_id == Some(series_id))
            .cloned()
            .collect();
        members.sort_by_key(|t| t.ordinal);
        Ok(members)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<TaskInstance>, StoreError> {
        let mut tasks: Vec<TaskInstance> = self.lock()?.iter().filter(|t| t.owner_id == owner).cloned().collect();
        tasks.sort_by_key(|t| (t.due_at, t.ordinal));
        Ok(tasks)
    }

    async fn find_by_id_prefix(&self, owner: Uuid, prefix: &str) -> Result<Vec<TaskInstance>, StoreError> {
        let Some(hex) = normalize_id_prefix(prefix) else {
            return Ok(Vec::new());
        };
        let mut tasks: Vec<TaskInstance> = self
            .lock()?
            .iter()
            .filter(|t| t.owner_id == owner && t.id.simple().to_string().to_ascii_uppercase().starts_with(&hex))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.due_at);
        Ok(tasks)
    }
}
