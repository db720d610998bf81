//! `hb departments` — list departments for use with `--dept`.

use std::io::Write;

use clap::Args;
use hourbook_core::db::query::{self, Department};

use super::CommandContext;
use crate::output::{fail, render_mode, write_table, write_tsv_row};

/// Arguments for `hb departments`.
#[derive(Args, Debug, Default)]
pub struct DepartmentsArgs {}

/// Execute `hb departments`.
///
/// # Errors
///
/// Returns an error if the database is missing or the query fails.
pub fn run_departments(_args: &DepartmentsArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let conn = ctx.open_existing()?;
    let departments =
        query::list_departments(&conn, &ctx.access).map_err(|e| fail(ctx.output, e))?;

    render_mode(
        ctx.output,
        &departments,
        |rows, w| {
            for d in rows {
                write_tsv_row(w, &[d.dnumber.to_string(), d.dname.clone()])?;
            }
            Ok(())
        },
        |rows, w| render_departments_pretty(rows, w),
    )
}

fn render_departments_pretty(rows: &[Department], w: &mut dyn Write) -> std::io::Result<()> {
    if rows.is_empty() {
        return writeln!(w, "No departments.");
    }
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|d| vec![d.dnumber.to_string(), d.dname.clone()])
        .collect();
    write_table(w, &["ID", "Department"], &[true, false], &cells)
}
