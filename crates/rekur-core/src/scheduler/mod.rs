//! The scheduler service: series generation, scoped mutation and reads over
//! a [`TaskStore`].
//!
//! The scheduler keeps no state between calls besides its gateway and
//! configuration. Every decision (series membership, ordinals, whether a
//! successor is due) is recomputed from the rows the gateway returns.

use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::error::CoreError;
use crate::models::TaskInstance;
use crate::repository::TaskStore;

mod generator;
mod mutation;

/// Minimum length of a short id accepted by [`TaskScheduler::resolve_id_prefix`].
pub const MIN_ID_PREFIX_LEN: usize = 2;

pub struct TaskScheduler<S> {
    store: S,
    config: SchedulerConfig,
}

impl<S: TaskStore> TaskScheduler<S> {
    pub fn new(store: S, config: SchedulerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub async fn get_task(&self, owner: Uuid, id: Uuid) -> Result<TaskInstance, CoreError> {
        self.load(owner, id).await
    }

    /// Every task of `owner`, earliest due first.
    pub async fn list_tasks(&self, owner: Uuid) -> Result<Vec<TaskInstance>, CoreError> {
        Ok(self.store.list_by_owner(owner).await?)
    }

    /// Members of a series in ordinal order. An unknown series is empty.
    pub async fn list_series(&self, owner: Uuid, series_id: Uuid) -> Result<Vec<TaskInstance>, CoreError> {
        Ok(self.store.list_by_series(owner, series_id).await?)
    }

    /// Resolves a full id or a short hex prefix of one to exactly one task id.
    pub async fn resolve_id_prefix(&self, owner: Uuid, prefix: &str) -> Result<Uuid, CoreError> {
        if let Ok(id) = Uuid::parse_str(prefix) {
            return Ok(id);
        }
        if prefix.len() < MIN_ID_PREFIX_LEN {
            return Err(CoreError::Validation(format!(
                "Short ID must be at least {} characters long.",
                MIN_ID_PREFIX_LEN
            )));
        }

        let tasks = self.store.find_by_id_prefix(owner, prefix).await?;
        match tasks.as_slice() {
            [task] => Ok(task.id),
            [] => Err(CoreError::NotFound(format!("No task found with ID prefix '{}'", prefix))),
            _ => Err(CoreError::AmbiguousId(
                tasks.into_iter().map(|t| (t.id.to_string(), t.title)).collect(),
            )),
        }
    }

    async fn load(&self, owner: Uuid, id: Uuid) -> Result<TaskInstance, CoreError> {
        self.store
            .get(owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }
}
