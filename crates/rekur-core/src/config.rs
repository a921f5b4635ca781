use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Tunables of the scheduler, usually loaded as the `[scheduler]` table of
/// the CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Calendar in which cadence steps are taken (IANA name, e.g. "Europe/Istanbul")
    pub timezone: Tz,
    /// Reminder lead time used when a definition does not name one
    pub default_reminder_minutes: u32,
    /// Upper bound on the occurrences a single definition may materialize
    pub max_occurrences: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            default_reminder_minutes: 60,
            max_occurrences: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(config.default_reminder_minutes, 60);
        assert_eq!(config.max_occurrences, 100);
    }
}
