use chrono::{Duration, Utc};
use uuid::Uuid;

use super::TaskScheduler;
use crate::cadence;
use crate::error::CoreError;
use crate::models::{
    CompletionResult, EditScope, FieldChange, FieldMap, TaskDraft, TaskInstance, TaskPatch, ValidatedPatch,
};
use crate::repository::TaskStore;
use crate::series::{select_members, shift_series, OrdinalPredicate, ShiftedDue};

impl<S: TaskStore> TaskScheduler<S> {
    /// Applies `patch` to one instance, or to it and every later occurrence
    /// of its series.
    ///
    /// With [`EditScope::AllFuture`] metadata is copied verbatim to the later
    /// occurrences, while a due-date change moves each of them by the same
    /// delta the target moved. Returns the number of distinct rows written.
    pub async fn update_task(&self, owner: Uuid, id: Uuid, patch: TaskPatch, scope: EditScope) -> Result<u64, CoreError> {
        let patch = patch.validate(self.config.max_occurrences)?;
        let target = self.load(owner, id).await?;
        if scope == EditScope::AllFuture && target.series_id.is_none() {
            return Err(CoreError::InvalidScope(id));
        }
        if patch.is_empty() {
            return Ok(0);
        }

        let written = match scope {
            EditScope::Single => self.store.update_fields(owner, id, &patch.target_fields()).await?,
            EditScope::AllFuture => self.update_future(owner, &target, &patch).await?,
        };

        if written == 0 {
            tracing::warn!(task_id = %id, "update matched no rows");
        }
        tracing::info!(task_id = %id, scope = %scope, rows = written, "updated task");
        Ok(written)
    }

    async fn update_future(&self, owner: Uuid, target: &TaskInstance, patch: &ValidatedPatch) -> Result<u64, CoreError> {
        let series_id = target.series_id.ok_or(CoreError::InvalidScope(target.id))?;
        let later = OrdinalPredicate::After(target.ordinal);

        let delta = patch
            .due_at
            .map(|due_at| due_at - target.due_at)
            .filter(|delta| *delta != Duration::zero());

        // Shifts are computed up front so a date overflow fails before any write.
        let shifts: Option<Vec<ShiftedDue>> = match delta {
            Some(delta) => {
                let members = self.store.list_by_series(owner, series_id).await?;
                Some(shift_series(select_members(&members, later), delta)?)
            }
            None => None,
        };

        let mut written = self.store.update_fields(owner, target.id, &patch.target_fields()).await?;

        match shifts {
            Some(shifts) => {
                for shift in shifts {
                    let applied = written as usize;
                    let fields = patch.metadata.clone().with(FieldChange::DueAt(shift.to));
                    written += self
                        .store
                        .update_fields(owner, shift.id, &fields)
                        .await
                        .map_err(|e| e.after(applied))?;
                }
            }
            None if !patch.metadata.is_empty() => {
                let applied = written as usize;
                written += self
                    .store
                    .update_where(owner, series_id, later, &patch.metadata)
                    .await
                    .map_err(|e| e.after(applied))?;
            }
            None => {}
        }

        Ok(written)
    }

    /// Deletes one instance, or it and every later occurrence of its series.
    ///
    /// Earlier occurrences are never touched and remaining ordinals are not
    /// renumbered.
    pub async fn delete_task(&self, owner: Uuid, id: Uuid, scope: EditScope) -> Result<u64, CoreError> {
        let target = self.load(owner, id).await?;

        let deleted = match scope {
            EditScope::Single => self.store.delete(owner, id).await?,
            EditScope::AllFuture => {
                let series_id = target.series_id.ok_or(CoreError::InvalidScope(id))?;
                self.store
                    .delete_where(owner, series_id, OrdinalPredicate::AtLeast(target.ordinal))
                    .await?
            }
        };

        if deleted == 0 {
            tracing::warn!(task_id = %id, "delete matched no rows");
        }
        tracing::info!(task_id = %id, scope = %scope, rows = deleted, "deleted task");
        Ok(deleted)
    }

    /// Marks a pending instance completed.
    ///
    /// Completing a series member writes the occurrence right after it when
    /// the series has planned occurrences left and that ordinal is not live,
    /// so a generated series only regrows slots that were deleted. Completing
    /// an instance that is already completed changes nothing.
    pub async fn complete_task(&self, owner: Uuid, id: Uuid) -> Result<CompletionResult, CoreError> {
        let task = self.load(owner, id).await?;
        if task.completed {
            return Ok(CompletionResult {
                updated: task,
                spawned: None,
            });
        }

        let successor = self.successor_of(owner, &task).await?;

        let fields = FieldMap::new().with(FieldChange::Completion(Some(Utc::now())));
        if self.store.update_fields(owner, id, &fields).await? == 0 {
            tracing::warn!(task_id = %id, "task vanished before completion was written");
            let mut updated = task;
            fields.apply(&mut updated);
            return Ok(CompletionResult { updated, spawned: None });
        }
        let updated = self.reload(owner, task, &fields).await?;

        let spawned = match successor {
            Some(draft) => {
                let spawned_id = self.store.insert(draft).await.map_err(|e| e.after(1))?;
                let spawned = self.store.get(owner, spawned_id).await.map_err(|e| e.after(2))?;
                tracing::info!(task_id = %id, spawned_id = %spawned_id, "spawned next occurrence");
                spawned
            }
            None => None,
        };

        tracing::info!(task_id = %id, "completed task");
        Ok(CompletionResult { updated, spawned })
    }

    /// Returns a completed instance to pending. Occurrences spawned by its
    /// completion are kept.
    pub async fn reopen_task(&self, owner: Uuid, id: Uuid) -> Result<TaskInstance, CoreError> {
        let task = self.load(owner, id).await?;
        if !task.completed {
            return Ok(task);
        }

        let fields = FieldMap::new().with(FieldChange::Completion(None));
        if self.store.update_fields(owner, id, &fields).await? == 0 {
            tracing::warn!(task_id = %id, "task vanished before reopening was written");
        }

        tracing::info!(task_id = %id, "reopened task");
        self.reload(owner, task, &fields).await
    }

    /// The draft of the occurrence that completing `task` should append, if any.
    async fn successor_of(&self, owner: Uuid, task: &TaskInstance) -> Result<Option<TaskDraft>, CoreError> {
        let (Some(series_id), Some(cadence)) = (task.series_id, task.recurring_type) else {
            return Ok(None);
        };
        if !task.has_remaining_occurrences() {
            return Ok(None);
        }

        let next = task.ordinal + 1;
        let members = self.store.list_by_series(owner, series_id).await?;
        if members.iter().any(|m| m.ordinal == next) {
            return Ok(None);
        }

        let due_at = cadence::advance_utc(task.due_at, cadence, self.config.timezone).ok_or_else(|| {
            CoreError::Validation(format!("Next {} occurrence after {} is out of range", cadence, task.due_at))
        })?;
        Ok(Some(TaskDraft::successor_of(task, due_at)))
    }

    /// Re-reads `task` after a write, falling back to applying `fields` locally
    /// when the row is gone.
    async fn reload(&self, owner: Uuid, mut task: TaskInstance, fields: &FieldMap) -> Result<TaskInstance, CoreError> {
        match self.store.get(owner, task.id).await? {
            Some(fresh) => Ok(fresh),
            None => {
                fields.apply(&mut task);
                Ok(task)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::cadence::Cadence;
    use crate::models::{TaskCategory, TaskDefinition};

    async fn series_of(
        scheduler: &TaskScheduler<crate::repository::MemoryTaskStore>,
        owner: Uuid,
        cadence: Cadence,
        count: u32,
    ) -> Vec<TaskInstance> {
        let definition = TaskDefinition {
            title: "Internet bill".to_string(),
            category: TaskCategory::InternetBill,
            due_at: at(2024, 1, 1),
            recurring_type: Some(cadence),
            occurrences: count,
            ..Default::default()
        };
        scheduler.create_task(owner, definition).await.unwrap().into_instances()
    }

    #[tokio::test]
    async fn test_single_update_touches_only_target() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Weekly, 4).await;

        let patch = TaskPatch {
            title: Some("Fiber bill".into()),
            due_at: Some(members[1].due_at + Duration::days(1)),
            ..Default::default()
        };
        let written = scheduler
            .update_task(owner, members[1].id, patch, EditScope::Single)
            .await
            .unwrap();
        assert_eq!(written, 1);

        let after = scheduler.list_series(owner, members[0].id).await.unwrap();
        assert_eq!(after[1].title, "Fiber bill");
        assert_eq!(after[1].due_at, members[1].due_at + Duration::days(1));
        for i in [0, 2, 3] {
            assert_eq!(after[i].title, "Internet bill");
            assert_eq!(after[i].due_at, members[i].due_at);
        }
    }

    #[tokio::test]
    async fn test_future_update_shifts_later_occurrences() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Weekly, 5).await;

        let patch = TaskPatch {
            reminder_minutes: Some(30),
            due_at: Some(members[2].due_at + Duration::days(2)),
            ..Default::default()
        };
        let written = scheduler
            .update_task(owner, members[2].id, patch, EditScope::AllFuture)
            .await
            .unwrap();
        assert_eq!(written, 3);

        let after = scheduler.list_series(owner, members[0].id).await.unwrap();
        for i in 0..2 {
            assert_eq!(after[i].due_at, members[i].due_at);
            assert_eq!(after[i].reminder_minutes, 60);
        }
        for i in 2..5 {
            assert_eq!(after[i].due_at - members[i].due_at, Duration::days(2));
            assert_eq!(after[i].reminder_minutes, 30);
        }
    }

    #[tokio::test]
    async fn test_future_update_metadata_only() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Daily, 4).await;

        let patch = TaskPatch {
            description: Some(Some("autopay".into())),
            due_at: Some(members[1].due_at),
            ..Default::default()
        };
        let written = scheduler
            .update_task(owner, members[1].id, patch, EditScope::AllFuture)
            .await
            .unwrap();
        assert_eq!(written, 3);

        let after = scheduler.list_series(owner, members[0].id).await.unwrap();
        assert!(after[0].description.is_none());
        assert!(after[1..].iter().all(|t| t.description.as_deref() == Some("autopay")));
        assert!(after.iter().zip(&members).all(|(a, b)| a.due_at == b.due_at));
    }

    #[tokio::test]
    async fn test_future_scope_requires_series() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let created = scheduler.create_task(owner, rent(1)).await.unwrap();
        let id = created.instances()[0].id;

        let patch = TaskPatch {
            title: Some("Other".into()),
            ..Default::default()
        };
        assert!(matches!(
            scheduler.update_task(owner, id, patch, EditScope::AllFuture).await,
            Err(CoreError::InvalidScope(bad)) if bad == id
        ));
        assert!(matches!(
            scheduler.delete_task(owner, id, EditScope::AllFuture).await,
            Err(CoreError::InvalidScope(_))
        ));
        assert_eq!(scheduler.get_task(owner, id).await.unwrap().title, "Pay rent");
    }

    #[tokio::test]
    async fn test_empty_patch_is_noop() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Daily, 2).await;

        let written = scheduler
            .update_task(owner, members[0].id, TaskPatch::default(), EditScope::AllFuture)
            .await
            .unwrap();
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_empty_patch_still_checks_target() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let created = scheduler.create_task(owner, rent(1)).await.unwrap();
        let id = created.instances()[0].id;

        assert!(matches!(
            scheduler.update_task(owner, id, TaskPatch::default(), EditScope::AllFuture).await,
            Err(CoreError::InvalidScope(bad)) if bad == id
        ));
        assert_eq!(
            scheduler
                .update_task(owner, id, TaskPatch::default(), EditScope::Single)
                .await
                .unwrap(),
            0
        );
        assert!(matches!(
            scheduler
                .update_task(owner, Uuid::now_v7(), TaskPatch::default(), EditScope::Single)
                .await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_scopes() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Monthly, 5).await;
        let series_id = members[0].id;

        assert_eq!(
            scheduler.delete_task(owner, members[1].id, EditScope::Single).await.unwrap(),
            1
        );
        assert_eq!(
            scheduler.delete_task(owner, members[2].id, EditScope::AllFuture).await.unwrap(),
            3
        );

        let left = scheduler.list_series(owner, series_id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].ordinal, 1);
        assert!(matches!(
            scheduler.delete_task(owner, members[3].id, EditScope::Single).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_completion_fills_next_ordinal_only() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Weekly, 4).await;
        let series_id = members[0].id;

        // The next occurrence exists, nothing is written.
        let result = scheduler.complete_task(owner, members[0].id).await.unwrap();
        assert!(result.updated.completed && result.updated.completed_at.is_some());
        assert!(result.spawned.is_none());

        // Trim the tail, then completing ordinal 2 appends ordinal 3 again.
        scheduler
            .delete_task(owner, members[2].id, EditScope::AllFuture)
            .await
            .unwrap();
        let result = scheduler.complete_task(owner, members[1].id).await.unwrap();
        let spawned = result.spawned.expect("next occurrence");
        assert_eq!(spawned.ordinal, 3);
        assert_eq!(spawned.series_id, Some(series_id));
        assert_eq!(spawned.due_at, members[1].due_at + Duration::weeks(1));
        assert_eq!(spawned.planned_occurrences, 4);
        assert!(!spawned.completed);

        assert_eq!(scheduler.list_series(owner, series_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_completion_refills_deleted_gap() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Weekly, 5).await;
        let series_id = members[0].id;

        scheduler
            .delete_task(owner, members[1].id, EditScope::Single)
            .await
            .unwrap();
        let result = scheduler.complete_task(owner, members[0].id).await.unwrap();
        let spawned = result.spawned.expect("ordinal 2 is refilled");
        assert_eq!(spawned.ordinal, 2);
        assert_eq!(spawned.due_at, members[0].due_at + Duration::weeks(1));
        assert_eq!(spawned.series_id, Some(series_id));

        let ordinals: Vec<u32> = scheduler
            .list_series(owner, series_id)
            .await
            .unwrap()
            .iter()
            .map(|t| t.ordinal)
            .collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);

        // Completing the refilled occurrence finds ordinal 3 live.
        let result = scheduler.complete_task(owner, spawned.id).await.unwrap();
        assert!(result.spawned.is_none());
    }

    #[tokio::test]
    async fn test_completing_final_occurrence_spawns_nothing() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Daily, 3).await;

        let result = scheduler.complete_task(owner, members[2].id).await.unwrap();
        assert!(result.spawned.is_none());
        assert_eq!(scheduler.store().len().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_complete_twice_and_reopen() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let members = series_of(&scheduler, owner, Cadence::Daily, 2).await;
        scheduler
            .delete_task(owner, members[1].id, EditScope::Single)
            .await
            .unwrap();

        let first = scheduler.complete_task(owner, members[0].id).await.unwrap();
        assert!(first.spawned.is_some());

        let second = scheduler.complete_task(owner, members[0].id).await.unwrap();
        assert!(second.spawned.is_none());
        assert_eq!(second.updated.completed_at, first.updated.completed_at);

        let reopened = scheduler.reopen_task(owner, members[0].id).await.unwrap();
        assert!(!reopened.completed);
        assert!(reopened.completed_at.is_none());
        assert_eq!(scheduler.store().len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let scheduler = scheduler();
        let owner = Uuid::now_v7();
        let missing = Uuid::now_v7();

        assert!(matches!(
            scheduler.complete_task(owner, missing).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            scheduler.reopen_task(owner, missing).await,
            Err(CoreError::NotFound(_))
        ));
        let patch = TaskPatch {
            title: Some("x".into()),
            ..Default::default()
        };
        assert!(matches!(
            scheduler.update_task(owner, missing, patch, EditScope::Single).await,
            Err(CoreError::NotFound(_))
        ));
    }
}
