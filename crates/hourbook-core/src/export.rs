//! CSV export of the employee report.
//!
//! The export runs [`list_employees`] with the caller's request and writes
//! the rows unchanged, so exported and displayed data always agree.

use std::io::{self, Write};

use rusqlite::Connection;

use crate::access::AccessContext;
use crate::db::query::{EmployeeReportRequest, EmployeeReportRow, list_employees};
use crate::error::HourbookError;

/// Fixed header row of the employee CSV export.
pub const EMPLOYEE_CSV_HEADER: [&str; 6] = [
    "First Name",
    "Last Name",
    "Department",
    "Dependents",
    "Projects",
    "Total Hours",
];

/// Run the employee report and write it as CSV. Returns the number of data
/// rows written.
///
/// # Errors
///
/// Returns [`HourbookError::Store`] if the query fails, or
/// [`HourbookError::Io`] if writing to `out` fails.
pub fn export_employees_csv<W: Write>(
    conn: &Connection,
    access: &AccessContext,
    request: &EmployeeReportRequest,
    out: W,
) -> Result<usize, HourbookError> {
    let rows = list_employees(conn, access, request)?;
    write_employees_csv(&rows, out)?;
    tracing::info!(user = %access, rows = rows.len(), "employee csv exported");
    Ok(rows.len())
}

/// Serialize report rows as CSV with [`EMPLOYEE_CSV_HEADER`], one line per
/// row in the given order. Lines end with CRLF.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_employees_csv<W: Write>(rows: &[EmployeeReportRow], mut out: W) -> io::Result<()> {
    write_record(&mut out, EMPLOYEE_CSV_HEADER.iter().copied())?;
    for row in rows {
        let dependents = row.dependent_count.to_string();
        let projects = row.project_count.to_string();
        let hours = row.total_hours.to_string();
        write_record(
            &mut out,
            [
                row.first_name.as_str(),
                row.last_name.as_str(),
                row.department_name.as_str(),
                dependents.as_str(),
                projects.as_str(),
                hours.as_str(),
            ],
        )?;
    }
    out.flush()
}

fn write_record<'a, W: Write>(
    out: &mut W,
    fields: impl IntoIterator<Item = &'a str>,
) -> io::Result<()> {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        write_field(out, field)?;
    }
    out.write_all(b"\r\n")
}

fn write_field<W: Write>(out: &mut W, field: &str) -> io::Result<()> {
    if field.contains([',', '"', '\r', '\n']) {
        write!(out, "\"{}\"", field.replace('"', "\"\""))
    } else {
        out.write_all(field.as_bytes())
    }
}
