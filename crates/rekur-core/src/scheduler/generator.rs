use uuid::Uuid;

use super::TaskScheduler;
use crate::error::CoreError;
use crate::models::{
    normalize_description, validate_occurrences, validate_reminder, validate_title, CreatedTasks, FieldChange,
    FieldMap, TaskDefinition, TaskDraft,
};
use crate::repository::TaskStore;
use crate::series::plan_series;

impl<S: TaskStore> TaskScheduler<S> {
    /// Creates a standalone task, or materializes a whole recurring series.
    ///
    /// Input is validated before the store is touched. For a series the root
    /// is written first, then linked to itself, then the siblings are written
    /// as one batch. A failure after the root exists surfaces as a partial
    /// store error carrying the number of rows already created; nothing is
    /// rolled back.
    pub async fn create_task(&self, owner: Uuid, definition: TaskDefinition) -> Result<CreatedTasks, CoreError> {
        // Only a recurring definition asking for more than one occurrence
        // becomes a series; anything else is a single standalone task.
        let count = match definition.recurring_type {
            Some(_) if definition.occurrences > 1 => {
                validate_occurrences(definition.occurrences, self.config.max_occurrences)?
            }
            _ => 1,
        };
        let root = self.root_draft(owner, definition)?;

        let mut plan = plan_series(root, count, self.config.timezone)?;
        let siblings = plan.split_off(1);
        let Some(root) = plan.pop() else {
            return Err(CoreError::Validation("Nothing to create".to_string()));
        };

        let root_id = self.store.insert(root).await?;

        if siblings.is_empty() {
            let task = self
                .store
                .get(owner, root_id)
                .await
                .map_err(|e| e.after(1))?
                .ok_or_else(|| CoreError::NotFound(root_id.to_string()))?;
            tracing::info!(task_id = %task.id, "created task");
            return Ok(CreatedTasks::Single(task));
        }

        // The series is identified by its root, so the link can only be
        // written once the root has an id.
        let mut created = 1;
        let link = FieldMap::new().with(FieldChange::SeriesId(Some(root_id)));
        self.store
            .update_fields(owner, root_id, &link)
            .await
            .map_err(|e| e.after(created))?;

        let siblings: Vec<TaskDraft> = siblings
            .into_iter()
            .map(|draft| TaskDraft {
                series_id: Some(root_id),
                ..draft
            })
            .collect();
        let batch = siblings.len();
        if let Err(e) = self.store.insert_batch(siblings).await {
            tracing::warn!(series_id = %root_id, applied = created, "series generation stopped part way");
            return Err(e.after(created).into());
        }
        created += batch;

        let members = self
            .store
            .list_by_series(owner, root_id)
            .await
            .map_err(|e| e.after(created))?;

        tracing::info!(series_id = %root_id, occurrences = members.len(), "created recurring series");
        Ok(CreatedTasks::Series(members))
    }

    fn root_draft(&self, owner: Uuid, definition: TaskDefinition) -> Result<TaskDraft, CoreError> {
        let title = validate_title(&definition.title)?;
        let reminder_minutes = match definition.reminder_minutes {
            Some(minutes) => validate_reminder(minutes)?,
            None => self.config.default_reminder_minutes,
        };

        Ok(TaskDraft {
            owner_id: owner,
            title,
            description: normalize_description(definition.description),
            category: definition.category,
            due_at: definition.due_at,
            reminder_minutes,
            is_recurring: definition.recurring_type.is_some(),
            recurring_type: definition.recurring_type,
            series_id: None,
            ordinal: 1,
            planned_occurrences: 1,
        })
    }
}
