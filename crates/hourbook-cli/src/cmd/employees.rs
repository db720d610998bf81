//! `hb employees` — employee roster with dependents, projects and hours.

use std::io::Write;

use clap::Args;
use hourbook_core::db::query::{self, EmployeeReportRequest, EmployeeReportRow};

use super::CommandContext;
use crate::output::{fail, format_hours, render_mode, write_table, write_tsv_row};

/// Filter and sort flags shared by `hb employees` and `hb export`.
///
/// Values are passed through as raw text: an unknown sort key or direction
/// falls back to name ascending and a non-numeric department means "all
/// departments".
#[derive(Args, Debug, Default, Clone)]
pub struct EmployeeFilterArgs {
    /// Case-insensitive substring of the first or last name.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Restrict to one department number (see `hb departments`).
    #[arg(short, long, value_name = "ID")]
    pub dept: Option<String>,

    /// Sort key: name or hours.
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,

    /// Sort direction: asc or desc.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<String>,
}

impl EmployeeFilterArgs {
    pub fn to_request(&self) -> EmployeeReportRequest {
        EmployeeReportRequest::from_raw(
            self.search.as_deref(),
            self.dept.as_deref(),
            self.sort.as_deref(),
            self.dir.as_deref(),
        )
    }
}

/// Arguments for `hb employees`.
#[derive(Args, Debug, Default)]
pub struct EmployeesArgs {
    #[command(flatten)]
    pub filter: EmployeeFilterArgs,
}

/// Execute `hb employees`.
///
/// # Errors
///
/// Returns an error if the database is missing or the query fails.
pub fn run_employees(args: &EmployeesArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let conn = ctx.open_existing()?;
    let request = args.filter.to_request();
    let rows =
        query::list_employees(&conn, &ctx.access, &request).map_err(|e| fail(ctx.output, e))?;

    render_mode(
        ctx.output,
        &rows,
        |rows, w| {
            for r in rows {
                write_tsv_row(w, &cells(r))?;
            }
            Ok(())
        },
        |rows, w| render_employees_pretty(rows, w),
    )
}

fn cells(r: &EmployeeReportRow) -> Vec<String> {
    vec![
        r.first_name.clone(),
        r.last_name.clone(),
        r.department_name.clone(),
        r.dependent_count.to_string(),
        r.project_count.to_string(),
        format_hours(r.total_hours),
    ]
}

fn render_employees_pretty(rows: &[EmployeeReportRow], w: &mut dyn Write) -> std::io::Result<()> {
    if rows.is_empty() {
        return writeln!(w, "No matching employees.");
    }
    let table: Vec<Vec<String>> = rows.iter().map(cells).collect();
    write_table(
        w,
        &["First", "Last", "Department", "Dependents", "Projects", "Hours"],
        &[false, false, false, true, true, true],
        &table,
    )?;
    writeln!(w)?;
    writeln!(w, "{} employee(s)", rows.len())
}
