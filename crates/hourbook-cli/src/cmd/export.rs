//! `hb export` — employee roster as CSV.

use anyhow::Result;
use clap::Args;
use hourbook_core::HourbookError;
use hourbook_core::export::export_employees_csv;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use super::CommandContext;
use super::employees::EmployeeFilterArgs;
use crate::output::fail;

/// Arguments for `hb export`.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: EmployeeFilterArgs,

    /// Output CSV path (defaults to stdout).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute `hb export`. The CSV always goes to `--output` or stdout,
/// regardless of the output mode; the mode only affects error rendering.
///
/// An `--output` file is only replaced once the whole CSV has been built,
/// so a failed export leaves the previous file intact.
///
/// # Errors
///
/// Returns an error if the database is missing, the query fails, or the
/// output cannot be written.
pub fn run_export(args: &ExportArgs, ctx: &CommandContext) -> Result<()> {
    let conn = ctx.open_existing()?;
    let request = args.filter.to_request();

    let Some(path) = args.output.as_ref() else {
        let stdout = BufWriter::new(io::stdout().lock());
        return export_employees_csv(&conn, &ctx.access, &request, stdout)
            .map(|_| ())
            .map_err(|e| fail(ctx.output, e));
    };

    let mut csv = Vec::new();
    let rows = export_employees_csv(&conn, &ctx.access, &request, &mut csv)
        .map_err(|e| fail(ctx.output, e))?;
    std::fs::write(path, &csv).map_err(|e| fail(ctx.output, HourbookError::from(e)))?;

    eprintln!("exported {rows} employee(s) to {}", path.display());
    Ok(())
}
