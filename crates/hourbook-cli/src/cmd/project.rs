//! `hb project <ID>` — staffing detail for one project.

use std::io::Write;

use clap::Args;
use hourbook_core::db::query::{self, ProjectDetail};

use super::CommandContext;
use crate::output::{
    fail, format_hours, pretty_kv, pretty_rule, pretty_section, render_mode, write_tsv_row,
};

/// Arguments for `hb project`.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project number.
    pub id: i64,

    /// Also list every employee that can be assigned.
    #[arg(long)]
    pub with_employees: bool,
}

/// Execute `hb project <ID>`.
///
/// # Errors
///
/// Returns an error if the database is missing, the project does not exist,
/// or the query fails.
pub fn run_project(args: &ProjectArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let conn = ctx.open_existing()?;
    let detail =
        query::get_project_detail(&conn, &ctx.access, args.id).map_err(|e| fail(ctx.output, e))?;

    let with_employees = args.with_employees;
    render_mode(
        ctx.output,
        &detail,
        |d, w| render_project_text(d, with_employees, w),
        |d, w| render_project_pretty(d, with_employees, w),
    )
}

fn render_project_text(
    detail: &ProjectDetail,
    with_employees: bool,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let p = &detail.project;
    write_tsv_row(w, &[p.pnumber.to_string(), p.pname.clone(), p.dname.clone()])?;
    for a in &detail.assignments {
        write_tsv_row(
            w,
            &[
                a.ssn.clone(),
                a.fname.clone(),
                a.lname.clone(),
                format_hours(a.hours),
            ],
        )?;
    }
    if with_employees {
        writeln!(w)?;
        for e in &detail.employees {
            write_tsv_row(w, &[e.ssn.clone(), e.fname.clone(), e.lname.clone()])?;
        }
    }
    Ok(())
}

fn render_project_pretty(
    detail: &ProjectDetail,
    with_employees: bool,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let p = &detail.project;
    pretty_section(w, &format!("Project {} · {}", p.pnumber, p.pname))?;
    pretty_kv(w, "department", &p.dname)?;
    let total: f64 = detail.assignments.iter().map(|a| a.hours).sum();
    pretty_kv(w, "headcount", detail.assignments.len().to_string())?;
    pretty_kv(w, "hours", format_hours(total))?;

    writeln!(w)?;
    pretty_section(w, "Assignments")?;
    if detail.assignments.is_empty() {
        writeln!(w, "(nobody has logged hours yet)")?;
    }
    for a in &detail.assignments {
        writeln!(
            w,
            "{:<11} {:<24} {:>8}",
            a.ssn,
            format!("{} {}", a.fname, a.lname),
            format_hours(a.hours)
        )?;
    }

    if with_employees {
        writeln!(w)?;
        pretty_section(w, "Employees")?;
        for e in &detail.employees {
            writeln!(w, "{:<11} {} {}", e.ssn, e.fname, e.lname)?;
        }
    }
    pretty_rule(w)
}
