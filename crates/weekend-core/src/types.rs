use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// IterationStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

impl IterationStatus {
    pub fn all() -> &'static [IterationStatus] {
        &[
            IterationStatus::NotStarted,
            IterationStatus::InProgress,
            IterationStatus::Complete,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IterationStatus::NotStarted => "not_started",
            IterationStatus::InProgress => "in_progress",
            IterationStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for IterationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IterationStatus {
    type Err = crate::error::WeekendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" | "not-started" => Ok(IterationStatus::NotStarted),
            "in_progress" | "in-progress" => Ok(IterationStatus::InProgress),
            "complete" => Ok(IterationStatus::Complete),
            _ => Err(crate::error::WeekendError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Viewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::WeekendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            _ => Err(crate::error::WeekendError::InvalidRole(s.to_string())),
        }
    }
}
