use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLog {
    pub id: String,
    pub iteration_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTimeLog {
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewTimeLog {
    /// Reject negative durations and intervals that end before they start.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(d) = self.duration_minutes {
            if d < 0 {
                return Err(crate::WeekendError::Validation(format!(
                    "duration_minutes must not be negative (got {d})"
                )));
            }
        }
        if let Some(end) = self.ended_at {
            if end < self.started_at {
                return Err(crate::WeekendError::Validation(
                    "ended_at is before started_at".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn into_time_log(self, iteration_id: &str, user_id: &str) -> TimeLog {
        TimeLog {
            id: uuid::Uuid::new_v4().to_string(),
            iteration_id: iteration_id.to_string(),
            user_id: user_id.to_string(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            // A zero duration carries no information; store it as unknown.
            duration_minutes: self.duration_minutes.filter(|d| *d != 0),
            note: self.note.filter(|n| !n.is_empty()),
        }
    }
}

/// Human-readable duration: "0 hrs", "45m", "1 hr", "3 hrs", "2h 15m".
pub fn format_minutes(minutes: i64) -> String {
    if minutes == 0 {
        return "0 hrs".to_string();
    }
    let hrs = minutes / 60;
    let mins = minutes % 60;
    if hrs == 0 {
        return format!("{mins}m");
    }
    if mins == 0 {
        let plural = if hrs != 1 { "s" } else { "" };
        return format!("{hrs} hr{plural}");
    }
    format!("{hrs}h {mins}m")
}
