use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeekendError {
    #[error("not initialized: run 'weekend init'")]
    NotInitialized,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("not authorized: admin role required")]
    NotAuthorized,

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("iteration not found: {0}")]
    IterationNotFound(String),

    #[error("checklist item not found: {0}")]
    ChecklistItemNotFound(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("invalid status '{0}': expected not_started, in_progress or complete")]
    InvalidStatus(String),

    #[error("invalid role '{0}': expected admin or viewer")]
    InvalidRole(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("file is {size} bytes, limit is {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("blob storage error: {0}")]
    Blob(String),

    #[error("data store unavailable: {0}")]
    Store(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WeekendError {
    /// A write collided with a uniqueness or foreign-key constraint.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            WeekendError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

pub type Result<T> = std::result::Result<T, WeekendError>;
