//! `hb log-hours` — add hours to an employee's assignment on a project.


use clap::Args;
use hourbook_core::db::assign::{self, HoursEntry};
use serde::Serialize;

use super::CommandContext;
use crate::output::{fail, format_hours, render};

/// Arguments for `hb log-hours`.
///
/// All three values are taken as text and validated by the core so the
/// error names the offending field.
#[derive(Args, Debug)]
pub struct LogHoursArgs {
    /// Employee SSN.
    pub ssn: String,

    /// Project number.
    pub project: String,

    /// Hours to add (non-negative, fractions allowed).
    #[arg(allow_hyphen_values = true)]
    pub hours: String,
}

#[derive(Debug, Serialize)]
struct LoggedHours {
    employee_id: String,
    project_id: i64,
    added: f64,
    total: f64,
}

/// Execute `hb log-hours`.
///
/// # Errors
///
/// Returns an error on invalid input, an unknown employee or project, or a
/// store failure. Nothing is written in any of those cases.
pub fn run_log_hours(args: &LogHoursArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let entry = HoursEntry::from_raw(&args.ssn, &args.project, &args.hours)
        .map_err(|e| fail(ctx.output, e))?;

    let mut conn = ctx.open_existing()?;
    let total =
        assign::upsert_hours(&mut conn, &ctx.access, &entry).map_err(|e| fail(ctx.output, e))?;

    let logged = LoggedHours {
        employee_id: entry.employee_id().to_string(),
        project_id: entry.project_id(),
        added: entry.hours(),
        total,
    };
    render(ctx.output, &logged, |l, w| {
        writeln!(
            w,
            "✓ {} on project {}: +{} h, total {} h",
            l.employee_id,
            l.project_id,
            format_hours(l.added),
            format_hours(l.total)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: LogHoursArgs,
    }

    #[test]
    fn negative_hours_reach_validation_instead_of_clap() {
        let w = Wrapper::try_parse_from(["test", "123456789", "1", "-4"])
            .expect("negative value should parse as text");
        assert_eq!(w.args.hours, "-4");
    }
}
