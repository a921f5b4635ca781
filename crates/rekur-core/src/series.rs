//! Series identity and the pure parts of series generation and mutation.
//!
//! A series is never stored as its own row. It is the set of instances that
//! share the id of their root (the first instance created) as `series_id`,
//! ordered by a 1-based `ordinal`. Everything here works on drafts and loaded
//! instances only, so it can be tested without a store.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::cadence;
use crate::error::CoreError;
use crate::models::{TaskDraft, TaskInstance};

/// Ordinal filter for scope-wide gateway writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalPredicate {
    /// `ordinal > n`: the future siblings of `n`
    After(u32),
    /// `ordinal >= n`: `n` and its future siblings
    AtLeast(u32),
}

impl OrdinalPredicate {
    pub fn matches(&self, ordinal: u32) -> bool {
        match *self {
            OrdinalPredicate::After(n) => ordinal > n,
            OrdinalPredicate::AtLeast(n) => ordinal >= n,
        }
    }

    pub fn sql_operator(&self) -> &'static str {
        match self {
            OrdinalPredicate::After(_) => ">",
            OrdinalPredicate::AtLeast(_) => ">=",
        }
    }

    pub fn bound(&self) -> u32 {
        match *self {
            OrdinalPredicate::After(n) | OrdinalPredicate::AtLeast(n) => n,
        }
    }
}

/// Expands a root draft into the drafts of a whole series.
///
/// The root keeps ordinal 1. When the root is not recurring or `count <= 1`
/// the plan is the root alone, standalone (`series_id = None`,
/// `planned_occurrences = 1`). Otherwise each following draft is due one
/// cadence step after the *previous* draft, so month-end clamping carries
/// forward the way a real calendar does.
///
/// `series_id` is left unset on every draft; it is only known once the root
/// has been stored.
pub fn plan_series(root: TaskDraft, count: u32, tz: Tz) -> Result<Vec<TaskDraft>, CoreError> {
    let cadence = match root.recurring_type {
        Some(cadence) if count > 1 => cadence,
        _ => {
            return Ok(vec![TaskDraft {
                series_id: None,
                ordinal: 1,
                planned_occurrences: 1,
                ..root
            }]);
        }
    };

    let dues = cadence::chain(root.due_at, cadence, count as usize, tz).ok_or_else(|| {
        CoreError::Validation(format!(
            "A {} series of {} occurrences starting {} runs past the supported date range",
            cadence, count, root.due_at
        ))
    })?;

    Ok(dues
        .into_iter()
        .zip(1..=count)
        .map(|(due_at, ordinal)| TaskDraft {
            due_at,
            is_recurring: true,
            series_id: None,
            ordinal,
            planned_occurrences: count,
            ..root.clone()
        })
        .collect())
}

/// A due-date move computed by `shift_series`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftedDue {
    pub id: Uuid,
    pub ordinal: u32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Moves every given instance by the same signed `delta`.
///
/// Spacing between occurrences is preserved as stored; the cadence chain is
/// not recomputed.
pub fn shift_series<'a, I>(instances: I, delta: Duration) -> Result<Vec<ShiftedDue>, CoreError>
where
    I: IntoIterator<Item = &'a TaskInstance>,
{
    instances
        .into_iter()
        .map(|task| {
            let to = task.due_at.checked_add_signed(delta).ok_or_else(|| {
                CoreError::Validation(format!("Shifting task {} by {} leaves the supported date range", task.id, delta))
            })?;
            Ok(ShiftedDue {
                id: task.id,
                ordinal: task.ordinal,
                from: task.due_at,
                to,
            })
        })
        .collect()
}

/// The members of a loaded series selected by `predicate`, in ordinal order.
pub fn select_members(members: &[TaskInstance], predicate: OrdinalPredicate) -> Vec<&TaskInstance> {
    let mut selected: Vec<&TaskInstance> = members.iter().filter(|t| predicate.matches(t.ordinal)).collect();
    selected.sort_by_key(|t| t.ordinal);
    selected
}
