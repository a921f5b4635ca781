use anyhow::Result;
use rekur_core::models::TaskInstance;
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

/// Resolves a full or short task id and loads the task.
pub async fn resolve_task<S: TaskStore>(
    scheduler: &TaskScheduler<S>,
    owner: Uuid,
    short_id: &str,
) -> Result<TaskInstance> {
    let id = scheduler.resolve_id_prefix(owner, short_id).await?;
    Ok(scheduler.get_task(owner, id).await?)
}

/// First eight hex digits of an id, as shown in tables.
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// `3/12` for series members, empty for standalone tasks.
pub fn series_position(task: &TaskInstance) -> String {
    if task.is_series_member() {
        format!("{}/{}", task.ordinal, task.planned_occurrences)
    } else {
        String::new()
    }
}
