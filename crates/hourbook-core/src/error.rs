use std::fmt;

use rusqlite::ErrorCode as SqliteCode;
use thiserror::Error;

/// Machine-readable error codes for scripts and callers that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    StoreMissing,
    ConfigParseError,
    InvalidInput,
    RecordNotFound,
    ReferenceViolation,
    StoreFailure,
    LockContention,
    OutputFailure,
    TotalOutOfRange,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::StoreMissing => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidInput => "E2001",
            Self::RecordNotFound => "E2002",
            Self::ReferenceViolation => "E2003",
            Self::StoreFailure => "E5001",
            Self::LockContention => "E5002",
            Self::OutputFailure => "E5003",
            Self::TotalOutOfRange => "E5004",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StoreMissing => "Database not found",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidInput => "Invalid input",
            Self::RecordNotFound => "Record not found",
            Self::ReferenceViolation => "Referenced employee or project does not exist",
            Self::StoreFailure => "Database error",
            Self::LockContention => "Database is busy",
            Self::OutputFailure => "Output could not be written",
            Self::TotalOutOfRange => "Accumulated hours out of range",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::StoreMissing => Some("Run `hb init` or point `--db` at an existing database."),
            Self::ConfigParseError => Some("Fix syntax in hourbook.toml and retry."),
            Self::InvalidInput => Some("Check the argument named in the message."),
            Self::RecordNotFound => None,
            Self::ReferenceViolation => {
                Some("Use `hb employees` and `hb projects` to find valid identifiers.")
            }
            Self::StoreFailure => Some("Nothing was changed. Retry once; if persistent, check the database file."),
            Self::LockContention => Some("Retry after the other writer finishes."),
            Self::OutputFailure => Some("Check the output path and free disk space."),
            Self::TotalOutOfRange => Some("Nothing was changed. The stored total is already near the numeric limit."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure taxonomy for report queries and hour upserts.
///
/// Nothing is committed when any variant is returned from a write.
#[derive(Debug, Error)]
pub enum HourbookError {
    /// Malformed caller input, rejected before the store is touched.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A detail lookup referenced a row that does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// The store rejected a write because a referenced row is missing.
    #[error("referential integrity violation: {detail}")]
    Referential { detail: String },

    /// Any other store-level failure.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The store computed a total that is not a finite number. The write
    /// was rolled back.
    #[error("accumulated hours for employee '{employee_id}' on project {project_id} are out of range")]
    TotalOutOfRange { employee_id: String, project_id: i64 },

    /// Writing an export failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl HourbookError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::InvalidInput,
            Self::NotFound { .. } => ErrorCode::RecordNotFound,
            Self::Referential { .. } => ErrorCode::ReferenceViolation,
            Self::Store(err) => match err.sqlite_error_code() {
                Some(SqliteCode::DatabaseBusy | SqliteCode::DatabaseLocked) => {
                    ErrorCode::LockContention
                }
                _ => ErrorCode::StoreFailure,
            },
            Self::TotalOutOfRange { .. } => ErrorCode::TotalOutOfRange,
            Self::Io(_) => ErrorCode::OutputFailure,
        }
    }

    /// Remediation text for terminal output.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }
}
