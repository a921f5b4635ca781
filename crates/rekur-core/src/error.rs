use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Task {0} is not part of a recurring series; 'future' scope does not apply")]
    InvalidScope(Uuid),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Title)

    #[error("Store error")]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Number of rows the store had written before the failure.
    ///
    /// Zero for every error raised before a write, so callers can tell
    /// "nothing changed" apart from "partially changed".
    pub fn rows_applied(&self) -> usize {
        match self {
            CoreError::Store(e) => e.rows_applied(),
            _ => 0,
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        CoreError::Store(StoreError::Database(e))
    }
}

impl From<sqlx::migrate::MigrateError> for CoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        CoreError::Store(StoreError::Migration(e))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Store(StoreError::Io(e))
    }
}

/// Failures reported by a `TaskStore` gateway.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Batch write failed after {applied} row(s) were written")]
    Partial {
        applied: usize,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    pub fn rows_applied(&self) -> usize {
        match self {
            StoreError::Partial { applied, .. } => *applied,
            _ => 0,
        }
    }

    /// Wraps `self` as a partial failure, adding `applied` rows written by the
    /// caller before the failing call.
    pub(crate) fn after(self, applied: usize) -> StoreError {
        match self {
            StoreError::Partial { applied: inner, source } => StoreError::Partial {
                applied: applied + inner,
                source,
            },
            other if applied == 0 => other,
            other => StoreError::Partial {
                applied,
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_wraps_and_accumulates() {
        let err = StoreError::Unavailable("down".into()).after(2);
        assert_eq!(err.rows_applied(), 2);

        let err = err.after(3);
        assert_eq!(err.rows_applied(), 5);
        assert!(matches!(
            err,
            StoreError::Partial { ref source, .. } if matches!(**source, StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_after_zero_keeps_original() {
        let err = StoreError::Unavailable("down".into()).after(0);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(CoreError::from(err).rows_applied(), 0);
    }
}
