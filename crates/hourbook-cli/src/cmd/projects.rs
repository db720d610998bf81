//! `hb projects` — project roster with headcount and hours.

use std::io::Write;

use clap::Args;
use hourbook_core::db::query::{self, ProjectReportRequest, ProjectReportRow};

use super::CommandContext;
use crate::output::{fail, format_hours, render_mode, write_table, write_tsv_row};

/// Arguments for `hb projects`.
#[derive(Args, Debug, Default)]
pub struct ProjectsArgs {
    /// Sort key: name, headcount or hours.
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,

    /// Sort direction: asc or desc.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<String>,
}

/// Execute `hb projects`.
///
/// # Errors
///
/// Returns an error if the database is missing or the query fails.
pub fn run_projects(args: &ProjectsArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let conn = ctx.open_existing()?;
    let request = ProjectReportRequest::from_raw(args.sort.as_deref(), args.dir.as_deref());
    let rows =
        query::list_projects(&conn, &ctx.access, &request).map_err(|e| fail(ctx.output, e))?;

    render_mode(
        ctx.output,
        &rows,
        |rows, w| {
            for r in rows {
                write_tsv_row(w, &cells(r))?;
            }
            Ok(())
        },
        |rows, w| render_projects_pretty(rows, w),
    )
}

fn cells(r: &ProjectReportRow) -> Vec<String> {
    vec![
        r.project_id.to_string(),
        r.project_name.clone(),
        r.department_name.clone(),
        r.headcount.to_string(),
        format_hours(r.total_hours),
    ]
}

fn render_projects_pretty(rows: &[ProjectReportRow], w: &mut dyn Write) -> std::io::Result<()> {
    if rows.is_empty() {
        return writeln!(w, "No projects.");
    }
    let table: Vec<Vec<String>> = rows.iter().map(cells).collect();
    write_table(
        w,
        &["ID", "Project", "Department", "Headcount", "Hours"],
        &[true, false, false, true, true],
        &table,
    )
}
