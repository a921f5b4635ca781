use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::cadence::Cadence;
use crate::error::CoreError;

/// Closed set of subjects a task can be filed under. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    ServerRenewal,
    ElectricityBill,
    InternetBill,
    WaterBill,
    Rent,
    Insurance,
    Subscription,
    Maintenance,
    Other,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 9] = [
        TaskCategory::ServerRenewal,
        TaskCategory::ElectricityBill,
        TaskCategory::InternetBill,
        TaskCategory::WaterBill,
        TaskCategory::Rent,
        TaskCategory::Insurance,
        TaskCategory::Subscription,
        TaskCategory::Maintenance,
        TaskCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::ServerRenewal => "server-renewal",
            TaskCategory::ElectricityBill => "electricity-bill",
            TaskCategory::InternetBill => "internet-bill",
            TaskCategory::WaterBill => "water-bill",
            TaskCategory::Rent => "rent",
            TaskCategory::Insurance => "insurance",
            TaskCategory::Subscription => "subscription",
            TaskCategory::Maintenance => "maintenance",
            TaskCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task category: {0}")]
pub struct ParseTaskCategoryError(String);

impl FromStr for TaskCategory {
    type Err = ParseTaskCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        TaskCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ParseTaskCategoryError(s.to_string()))
    }
}

/// One concrete, dated obligation. Series are the rows sharing a `series_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TaskInstance {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: TaskCategory,
    pub due_at: DateTime<Utc>,
    /// Lead time in minutes before `due_at` at which a reminder is due
    pub reminder_minutes: u32,
    pub completed: bool,
    /// Set exactly when `completed` is true
    pub completed_at: Option<DateTime<Utc>>,
    pub is_recurring: bool,
    /// `None` is the "none" recurrence type
    pub recurring_type: Option<Cadence>,
    /// Id of the series root; `None` for standalone tasks
    pub series_id: Option<Uuid>,
    /// 1-based position within the series
    pub ordinal: u32,
    pub planned_occurrences: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskInstance {
    /// The instant an external reminder scanner should notify the owner.
    pub fn remind_at(&self) -> DateTime<Utc> {
        self.due_at - Duration::minutes(i64::from(self.reminder_minutes))
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    pub fn is_series_member(&self) -> bool {
        self.series_id.is_some()
    }

    /// Whether completing this instance may append the next occurrence.
    pub fn has_remaining_occurrences(&self) -> bool {
        self.is_recurring && self.series_id.is_some() && self.ordinal < self.planned_occurrences
    }
}

/// A row to be inserted. The store assigns `id` and the timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: TaskCategory,
    pub due_at: DateTime<Utc>,
    pub reminder_minutes: u32,
    pub is_recurring: bool,
    pub recurring_type: Option<Cadence>,
    pub series_id: Option<Uuid>,
    pub ordinal: u32,
    pub planned_occurrences: u32,
}

impl TaskDraft {
    /// The pending successor of `instance` due at `due_at`.
    pub fn successor_of(instance: &TaskInstance, due_at: DateTime<Utc>) -> Self {
        Self {
            owner_id: instance.owner_id,
            title: instance.title.clone(),
            description: instance.description.clone(),
            category: instance.category,
            due_at,
            reminder_minutes: instance.reminder_minutes,
            is_recurring: instance.is_recurring,
            recurring_type: instance.recurring_type,
            series_id: instance.series_id,
            ordinal: instance.ordinal + 1,
            planned_occurrences: instance.planned_occurrences,
        }
    }

    /// Materializes the draft as a stored row.
    pub fn into_instance(self, id: Uuid, now: DateTime<Utc>) -> TaskInstance {
        TaskInstance {
            id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            category: self.category,
            due_at: self.due_at,
            reminder_minutes: self.reminder_minutes,
            completed: false,
            completed_at: None,
            is_recurring: self.is_recurring,
            recurring_type: self.recurring_type,
            series_id: self.series_id,
            ordinal: self.ordinal,
            planned_occurrences: self.planned_occurrences,
            created_at: now,
            updated_at: now,
        }
    }
}

/// What a caller asks for when creating a task or a recurring series.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub title: String,
    pub description: Option<String>,
    pub category: TaskCategory,
    pub due_at: DateTime<Utc>,
    /// Falls back to the scheduler's default when `None`
    pub reminder_minutes: Option<i64>,
    pub recurring_type: Option<Cadence>,
    /// Number of instances to materialize for a recurring definition
    pub occurrences: u32,
}

impl Default for TaskDefinition {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            category: TaskCategory::Other,
            due_at: Utc::now(),
            reminder_minutes: None,
            recurring_type: None,
            occurrences: 1,
        }
    }
}

/// A single column change understood by every gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Title(String),
    Description(Option<String>),
    Category(TaskCategory),
    DueAt(DateTime<Utc>),
    ReminderMinutes(u32),
    /// Also sets `is_recurring` to `cadence.is_some()`
    Recurrence(Option<Cadence>),
    PlannedOccurrences(u32),
    /// `Some(t)`: completed at `t`; `None`: pending. Writes both completion columns.
    Completion(Option<DateTime<Utc>>),
    SeriesId(Option<Uuid>),
}

impl FieldChange {
    pub fn apply(&self, task: &mut TaskInstance) {
        match self {
            FieldChange::Title(v) => task.title = v.clone(),
            FieldChange::Description(v) => task.description = v.clone(),
            FieldChange::Category(v) => task.category = *v,
            FieldChange::DueAt(v) => task.due_at = *v,
            FieldChange::ReminderMinutes(v) => task.reminder_minutes = *v,
            FieldChange::Recurrence(v) => {
                task.recurring_type = *v;
                task.is_recurring = v.is_some();
            }
            FieldChange::PlannedOccurrences(v) => task.planned_occurrences = *v,
            FieldChange::Completion(v) => {
                task.completed = v.is_some();
                task.completed_at = *v;
            }
            FieldChange::SeriesId(v) => task.series_id = *v,
        }
    }
}

/// The set of present fields of an update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap(Vec<FieldChange>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, change: FieldChange) -> Self {
        self.push(change);
        self
    }

    pub fn push(&mut self, change: FieldChange) {
        self.0.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.0.iter()
    }

    pub fn apply(&self, task: &mut TaskInstance) {
        for change in &self.0 {
            change.apply(task);
        }
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Caller-facing partial update. Every field is optional; only present ones
/// are validated and written.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<TaskCategory>,
    pub reminder_minutes: Option<i64>,
    pub recurring_type: Option<Option<Cadence>>,
    pub planned_occurrences: Option<u32>,
    pub due_at: Option<DateTime<Utc>>,
}

/// A validated patch, split into the parts that propagate differently along
/// a series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedPatch {
    /// Metadata written verbatim to every affected instance
    pub metadata: FieldMap,
    /// New due date of the target; siblings are shifted by the same delta
    pub due_at: Option<DateTime<Utc>>,
}

impl ValidatedPatch {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.due_at.is_none()
    }

    /// All changes for the target instance itself.
    pub fn target_fields(&self) -> FieldMap {
        let mut fields = self.metadata.clone();
        if let Some(due_at) = self.due_at {
            fields.push(FieldChange::DueAt(due_at));
        }
        fields
    }
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.reminder_minutes.is_none()
            && self.recurring_type.is_none()
            && self.planned_occurrences.is_none()
            && self.due_at.is_none()
    }

    /// Validates the present fields and splits metadata from the due date.
    pub fn validate(self, max_occurrences: u32) -> Result<ValidatedPatch, CoreError> {
        let mut metadata = FieldMap::new();

        if let Some(title) = self.title {
            metadata.push(FieldChange::Title(validate_title(&title)?));
        }
        if let Some(description) = self.description {
            metadata.push(FieldChange::Description(normalize_description(description)));
        }
        if let Some(category) = self.category {
            metadata.push(FieldChange::Category(category));
        }
        if let Some(minutes) = self.reminder_minutes {
            metadata.push(FieldChange::ReminderMinutes(validate_reminder(minutes)?));
        }
        if let Some(recurring_type) = self.recurring_type {
            metadata.push(FieldChange::Recurrence(recurring_type));
        }
        if let Some(planned) = self.planned_occurrences {
            metadata.push(FieldChange::PlannedOccurrences(validate_occurrences(planned, max_occurrences)?));
        }

        Ok(ValidatedPatch {
            metadata,
            due_at: self.due_at,
        })
    }
}

pub(crate) fn validate_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

pub(crate) fn validate_reminder(minutes: i64) -> Result<u32, CoreError> {
    u32::try_from(minutes).map_err(|_| {
        CoreError::Validation(format!(
            "Reminder time must be a non-negative number of minutes, got {}",
            minutes
        ))
    })
}

pub(crate) fn validate_occurrences(count: u32, max: u32) -> Result<u32, CoreError> {
    if count == 0 {
        return Err(CoreError::Validation("Occurrence count must be at least 1".to_string()));
    }
    if count > max {
        return Err(CoreError::Validation(format!(
            "Occurrence count {} exceeds the limit of {}",
            count, max
        )));
    }
    Ok(count)
}

/// Blast radius of an update or delete on a series member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditScope {
    /// Only the named instance
    #[default]
    Single,
    /// The named instance and every later occurrence of its series
    AllFuture,
}

impl std::fmt::Display for EditScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditScope::Single => write!(f, "single"),
            EditScope::AllFuture => write!(f, "future"),
        }
    }
}

impl FromStr for EditScope {
    type Err = ParseEditScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "this" | "occurrence" => Ok(EditScope::Single),
            "future" | "all-future" | "all_future" | "allfuture" => Ok(EditScope::AllFuture),
            _ => Err(ParseEditScopeError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid edit scope: {0}")]
pub struct ParseEditScopeError(String);

/// Result of `create_task`.
#[derive(Debug, Clone)]
pub enum CreatedTasks {
    Single(TaskInstance),
    /// Series members in ordinal order; the root comes first
    Series(Vec<TaskInstance>),
}

impl CreatedTasks {
    pub fn instances(&self) -> &[TaskInstance] {
        match self {
            CreatedTasks::Single(task) => std::slice::from_ref(task),
            CreatedTasks::Series(tasks) => tasks,
        }
    }

    pub fn into_instances(self) -> Vec<TaskInstance> {
        match self {
            CreatedTasks::Single(task) => vec![task],
            CreatedTasks::Series(tasks) => tasks,
        }
    }

    pub fn series_id(&self) -> Option<Uuid> {
        self.instances().first().and_then(|t| t.series_id)
    }
}

/// Result of `complete_task`.
#[derive(Debug, Clone)]
pub struct CompletionResult {
    pub updated: TaskInstance,
    /// The next occurrence appended by this completion, if any
    pub spawned: Option<TaskInstance>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> TaskInstance {
        TaskDraft {
            owner_id: Uuid::nil(),
            title: "Pay rent".to_string(),
            description: None,
            category: TaskCategory::Rent,
            due_at: Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap(),
            reminder_minutes: 90,
            is_recurring: true,
            recurring_type: Some(Cadence::Monthly),
            series_id: Some(Uuid::nil()),
            ordinal: 1,
            planned_occurrences: 3,
        }
        .into_instance(Uuid::now_v7(), Utc::now())
    }

    #[test]
    fn test_category_round_trips_kebab_case() {
        for category in TaskCategory::ALL {
            assert_eq!(category.as_str().parse::<TaskCategory>(), Ok(category));
        }
        assert_eq!("water_bill".parse::<TaskCategory>(), Ok(TaskCategory::WaterBill));
        assert!("groceries".parse::<TaskCategory>().is_err());
    }

    #[test]
    fn test_remind_at() {
        let task = sample();
        assert_eq!(task.remind_at(), Utc.with_ymd_and_hms(2024, 1, 31, 7, 30, 0).unwrap());
    }

    #[test]
    fn test_completion_change_keeps_flag_and_timestamp_in_sync() {
        let mut task = sample();
        let now = Utc::now();
        FieldChange::Completion(Some(now)).apply(&mut task);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));

        FieldChange::Completion(None).apply(&mut task);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_recurrence_change_sets_is_recurring() {
        let mut task = sample();
        FieldChange::Recurrence(None).apply(&mut task);
        assert!(!task.is_recurring);
        assert!(task.recurring_type.is_none());
    }

    #[test]
    fn test_patch_validation() {
        let patch = TaskPatch {
            title: Some("  Rent  ".to_string()),
            reminder_minutes: Some(30),
            due_at: Some(Utc::now()),
            ..Default::default()
        };
        let validated = patch.validate(100).unwrap();
        assert_eq!(validated.metadata.len(), 2);
        assert!(validated.metadata.iter().any(|c| *c == FieldChange::Title("Rent".to_string())));
        assert_eq!(validated.target_fields().len(), 3);

        let empty_title = TaskPatch {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(empty_title.validate(100), Err(CoreError::Validation(_))));

        let negative = TaskPatch {
            reminder_minutes: Some(-5),
            ..Default::default()
        };
        assert!(matches!(negative.validate(100), Err(CoreError::Validation(_))));

        let zero_planned = TaskPatch {
            planned_occurrences: Some(0),
            ..Default::default()
        };
        assert!(matches!(zero_planned.validate(100), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_edit_scope_parse() {
        assert_eq!("this".parse::<EditScope>(), Ok(EditScope::Single));
        assert_eq!("all-future".parse::<EditScope>(), Ok(EditScope::AllFuture));
        assert!("series".parse::<EditScope>().is_err());
    }

    #[test]
    fn test_has_remaining_occurrences() {
        let mut task = sample();
        assert!(task.has_remaining_occurrences());
        task.ordinal = 3;
        assert!(!task.has_remaining_occurrences());
        task.ordinal = 1;
        task.series_id = None;
        assert!(!task.has_remaining_occurrences());
    }
}
