use crate::db::DbPool;
use crate::error::{CoreError, StoreError};
use crate::models::{FieldChange, FieldMap, TaskDraft, TaskInstance};
use crate::repository::normalize_id_prefix;
use crate::series::OrdinalPredicate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, Transaction};
use uuid::Uuid;

/// SQLite implementation of the task store gateway
pub struct SqliteTaskStore {
    pool: DbPool,
}

impl SqliteTaskStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens (and migrates) the database at `db_path`.
    pub async fn connect(db_path: &str) -> Result<Self, CoreError> {
        let pool = crate::db::establish_connection(db_path).await?;
        Ok(Self::new(pool))
    }

    /// The pool this store runs its queries on
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Inserts one draft inside `tx` and returns the generated id. The row
    /// starts pending, with `created_at` and `updated_at` both set to `now`.
    pub(crate) async fn insert_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        draft: TaskDraft,
        now: DateTime<Utc>,
    ) -> Result<Uuid, sqlx::Error> {
        let id = Uuid::now_v7();

        sqlx::query(
            r#"INSERT INTO tasks (id, owner_id, title, description, category, due_at, reminder_minutes,
            completed, completed_at, is_recurring, recurring_type, series_id, ordinal, planned_occurrences,
            created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, NULL, $8, $9, $10, $11, $12, $13, $13)"#,
        )
        .bind(id)
        .bind(draft.owner_id)
        .bind(draft.title)
        .bind(draft.description)
        .bind(draft.category)
        .bind(draft.due_at)
        .bind(draft.reminder_minutes)
        .bind(draft.is_recurring)
        .bind(draft.recurring_type)
        .bind(draft.series_id)
        .bind(draft.ordinal)
        .bind(draft.planned_occurrences)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        Ok(id)
    }
}

/// Appends `col = value` pairs for every present field, followed by `updated_at`.
fn push_assignments(qb: &mut QueryBuilder<'_, Sqlite>, fields: &FieldMap, now: DateTime<Utc>) {
    let mut separated = qb.separated(", ");
    for change in fields {
        match change {
            FieldChange::Title(v) => {
                separated.push("title = ").push_bind_unseparated(v.clone());
            }
            FieldChange::Description(v) => {
                separated.push("description = ").push_bind_unseparated(v.clone());
            }
            FieldChange::Category(v) => {
                separated.push("category = ").push_bind_unseparated(*v);
            }
            FieldChange::DueAt(v) => {
                separated.push("due_at = ").push_bind_unseparated(*v);
            }
            FieldChange::ReminderMinutes(v) => {
                separated.push("reminder_minutes = ").push_bind_unseparated(*v);
            }
            FieldChange::Recurrence(v) => {
                separated.push("recurring_type = ").push_bind_unseparated(*v);
                separated.push("is_recurring = ").push_bind_unseparated(v.is_some());
            }
            FieldChange::PlannedOccurrences(v) => {
                separated.push("planned_occurrences = ").push_bind_unseparated(*v);
            }
            FieldChange::Completion(v) => {
                separated.push("completed = ").push_bind_unseparated(v.is_some());
                separated.push("completed_at = ").push_bind_unseparated(*v);
            }
            FieldChange::SeriesId(v) => {
                separated.push("series_id = ").push_bind_unseparated(*v);
            }
        }
    }
    separated.push("updated_at = ").push_bind_unseparated(now);
}

#[async_trait]
impl super::TaskStore for SqliteTaskStore {
    /// Inserts a single task in its own transaction
    async fn insert(&self, draft: TaskDraft) -> Result<Uuid, StoreError> {
        let mut tx = self.pool().begin().await?;
        let id = Self::insert_in_transaction(&mut tx, draft, Utc::now()).await?;
        tx.commit().await?;

        tracing::debug!(task_id = %id, "inserted task");
        Ok(id)
    }

    /// Inserts all drafts in one transaction, returning ids in input order
    async fn insert_batch(&self, drafts: Vec<TaskDraft>) -> Result<Vec<Uuid>, StoreError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        // One transaction: the batch lands completely or not at all.
        let mut tx = self.pool().begin().await?;
        let now = Utc::now();
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            ids.push(Self::insert_in_transaction(&mut tx, draft, now).await?);
        }
        tx.commit().await?;

        tracing::debug!(rows = ids.len(), "inserted task batch");
        Ok(ids)
    }

    /// Updates the listed columns of one task and bumps `updated_at`.
    /// Returns 0 when the id is unknown or belongs to another owner.
    async fn update_fields(&self, owner: Uuid, id: Uuid, fields: &FieldMap) -> Result<u64, StoreError> {
        if fields.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tasks SET ");
        push_assignments(&mut qb, fields, Utc::now());
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND owner_id = ");
        qb.push_bind(owner);

        let result = qb.build().execute(self.pool()).await?;
        tracing::debug!(task_id = %id, fields = fields.len(), rows = result.rows_affected(), "updated task");
        Ok(result.rows_affected())
    }

    /// Applies the same field changes to every series member whose ordinal
    /// matches `predicate`
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

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tasks SET ");
        push_assignments(&mut qb, fields, Utc::now());
        qb.push(" WHERE owner_id = ");
        qb.push_bind(owner);
        qb.push(" AND series_id = ");
        qb.push_bind(series_id);
        qb.push(format!(" AND ordinal {} ", predicate.sql_operator()));
        qb.push_bind(predicate.bound());

        let result = qb.build().execute(self.pool()).await?;
        tracing::debug!(
            series_id = %series_id,
            predicate = ?predicate,
            rows = result.rows_affected(),
            "updated series members"
        );
        Ok(result.rows_affected())
    }

    /// Deletes the series members whose ordinal matches `predicate`
    async fn delete_where(&self, owner: Uuid, series_id: Uuid, predicate: OrdinalPredicate) -> Result<u64, StoreError> {
        let sql = format!(
            "DELETE FROM tasks WHERE owner_id = $1 AND series_id = $2 AND ordinal {} $3",
            predicate.sql_operator()
        );
        let result = sqlx::query(&sql)
            .bind(owner)
            .bind(series_id)
            .bind(predicate.bound())
            .execute(self.pool())
            .await?;

        tracing::debug!(
            series_id = %series_id,
            predicate = ?predicate,
            rows = result.rows_affected(),
            "deleted series members"
        );
        Ok(result.rows_affected())
    }

    /// Deletes one task by id
    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool())
            .await?;

        tracing::debug!(task_id = %id, rows = result.rows_affected(), "deleted task");
        Ok(result.rows_affected())
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<TaskInstance>, StoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool())
            .await?;
        Ok(task)
    }

    /// Lists a series in ordinal order
    async fn list_by_series(&self, owner: Uuid, series_id: Uuid) -> Result<Vec<TaskInstance>, StoreError> {
        let tasks = sqlx::query_as("SELECT * FROM tasks WHERE owner_id = $1 AND series_id = $2 ORDER BY ordinal")
            .bind(owner)
            .bind(series_id)
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }

    /// Lists every task of an owner, soonest due first
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<TaskInstance>, StoreError> {
        let tasks = sqlx::query_as("SELECT * FROM tasks WHERE owner_id = $1 ORDER BY due_at, ordinal")
            .bind(owner)
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }

    /// Finds tasks whose hex id starts with `prefix` (hyphens ignored)
    async fn find_by_id_prefix(&self, owner: Uuid, prefix: &str) -> Result<Vec<TaskInstance>, StoreError> {
        let Some(hex) = normalize_id_prefix(prefix) else {
            return Ok(Vec::new());
        };

        let mut pattern = String::with_capacity(hex.len() + 1);
        pattern.push_str(&hex);
        pattern.push('%');

        let tasks = sqlx::query_as("SELECT * FROM tasks WHERE owner_id = $1 AND hex(id) LIKE $2 ORDER BY due_at")
            .bind(owner)
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }
}
