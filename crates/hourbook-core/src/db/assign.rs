//! Hour accumulation for (employee, project) assignments.
//!
//! `works_on` holds one running total per pair. Recording hours adds to that
//! total with a single `INSERT ... ON CONFLICT DO UPDATE` statement, so two
//! writers on the same pair are serialized by SQLite and neither delta is
//! lost. There is no select-then-write path.

use rusqlite::{Connection, TransactionBehavior, params};

use crate::access::AccessContext;
use crate::error::HourbookError;

const UPSERT_HOURS_SQL: &str = "INSERT INTO works_on (essn, pno, hours) VALUES (?1, ?2, ?3) \
     ON CONFLICT(essn, pno) DO UPDATE SET hours = works_on.hours + excluded.hours \
     RETURNING hours";

/// A validated request to add hours to an assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct HoursEntry {
    employee_id: String,
    project_id: i64,
    hours: f64,
}

impl HoursEntry {
    /// Validate raw caller input.
    ///
    /// # Errors
    ///
    /// Returns [`HourbookError::Validation`] naming the first bad field when
    /// the employee id is blank, the project id is not an integer, or the
    /// hours value is not a finite, non-negative number.
    pub fn from_raw(employee_id: &str, project_id: &str, hours: &str) -> Result<Self, HourbookError> {
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Err(HourbookError::validation("employee_id", "is required"));
        }

        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(HourbookError::validation("project_id", "is required"));
        }
        let project_id = project_id.parse::<i64>().map_err(|_| {
            HourbookError::validation("project_id", format!("'{project_id}' is not an integer"))
        })?;

        let hours = parse_hours(hours)?;

        Ok(Self {
            employee_id: employee_id.to_string(),
            project_id,
            hours,
        })
    }

    #[must_use]
    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    #[must_use]
    pub const fn project_id(&self) -> i64 {
        self.project_id
    }

    #[must_use]
    pub const fn hours(&self) -> f64 {
        self.hours
    }
}

fn parse_hours(raw: &str) -> Result<f64, HourbookError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(HourbookError::validation("hours", "is required"));
    }
    let hours = raw
        .parse::<f64>()
        .map_err(|_| HourbookError::validation("hours", format!("'{raw}' is not a number")))?;
    if !hours.is_finite() {
        return Err(HourbookError::validation("hours", "must be a finite number"));
    }
    if hours < 0.0 {
        return Err(HourbookError::validation("hours", "must not be negative"));
    }
    Ok(hours)
}

/// Add `entry.hours()` to the employee's total on the project, creating the
/// assignment if it does not exist yet. Returns the new total.
///
/// Either the new total is committed or nothing changes.
///
/// # Errors
///
/// - [`HourbookError::Referential`] if the employee or project does not exist
/// - [`HourbookError::TotalOutOfRange`] if the accumulated total is not finite
/// - [`HourbookError::Store`] for any other store failure
pub fn upsert_hours(
    conn: &mut Connection,
    access: &AccessContext,
    entry: &HoursEntry,
) -> Result<f64, HourbookError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let total: f64 = tx
        .query_row(
            UPSERT_HOURS_SQL,
            params![entry.employee_id, entry.project_id, entry.hours],
            |row| row.get(0),
        )
        .map_err(|err| classify_write_error(err, entry))?;

    if !total.is_finite() {
        // tx rolls back on drop
        tracing::warn!(
            employee_id = %entry.employee_id,
            project_id = entry.project_id,
            "hours rejected: accumulated total out of range"
        );
        return Err(HourbookError::TotalOutOfRange {
            employee_id: entry.employee_id.clone(),
            project_id: entry.project_id,
        });
    }

    tx.commit()?;

    tracing::info!(
        user = %access,
        employee_id = %entry.employee_id,
        project_id = entry.project_id,
        delta = entry.hours,
        total,
        "hours recorded"
    );
    Ok(total)
}

fn classify_write_error(err: rusqlite::Error, entry: &HoursEntry) -> HourbookError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            tracing::warn!(
                employee_id = %entry.employee_id,
                project_id = entry.project_id,
                "hours rejected: unknown employee or project"
            );
            HourbookError::Referential {
                detail: format!(
                    "employee '{}' or project {} does not exist",
                    entry.employee_id, entry.project_id
                ),
            }
        }
        other => HourbookError::Store(other),
    }
}
