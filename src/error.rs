//! Unified error hierarchy for LiftRS
//!
//! The scoring and record functions are total and never fail; errors only
//! arise at the storage boundary, when validating routines, and when
//! reading generated routine text.

use thiserror::Error;

/// Top-level error type for all LiftRS operations
#[derive(Debug, Error)]
pub enum LiftRsError {
    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Routine validation and parsing errors
    #[error("Routine error: {0}")]
    Routine(#[from] RoutineError),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored record could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found
    #[error("Record not found: {table}.{id}")]
    NotFound { table: String, id: String },

    /// Store is temporarily unusable (e.g. poisoned lock)
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Routine creation, progression, and parsing errors
#[derive(Debug, Error)]
pub enum RoutineError {
    /// Routine has no days, so there is no day to advance to
    #[error("Routine {routine_id} has no days")]
    NoDays { routine_id: String },

    /// Routine definition rejected at creation
    #[error("Invalid routine: {reason}")]
    Invalid { reason: String },

    /// Generated routine text was not valid JSON or lacked required fields
    #[error("Failed to parse generated routine: {reason}")]
    Parse { reason: String },
}

/// Result type alias for LiftRS operations
pub type Result<T> = std::result::Result<T, LiftRsError>;

impl LiftRsError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LiftRsError::Storage(StorageError::Unavailable { .. })
                | LiftRsError::Routine(RoutineError::Parse { .. })
                | LiftRsError::Io(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiftRsError::Storage(StorageError::NotFound { .. }) => ErrorSeverity::Warning,
            LiftRsError::Routine(RoutineError::Parse { .. }) => ErrorSeverity::Warning,
            LiftRsError::Routine(RoutineError::Invalid { .. }) => ErrorSeverity::Warning,
            LiftRsError::Validation(_) => ErrorSeverity::Warning,
            LiftRsError::Storage(_) => ErrorSeverity::Error,
            LiftRsError::Internal(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiftRsError::Routine(RoutineError::Parse { .. }) => {
                "Failed to parse the generated routine. Please try again.".to_string()
            }
            LiftRsError::Routine(RoutineError::Invalid { reason }) => reason.clone(),
            LiftRsError::Storage(StorageError::NotFound { table, id }) => {
                format!("Could not find {} '{}'", table.trim_end_matches('s'), id)
            }
            LiftRsError::Storage(StorageError::Sqlite(_)) => {
                "Unable to access the workout database. Please check your configuration."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
