//! `hb init` — create the database file and schema.


use anyhow::Context as _;
use clap::Args;
use hourbook_core::db;
use serde::Serialize;

use super::CommandContext;
use crate::output::render;

/// Arguments for `hb init`.
#[derive(Args, Debug, Default)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
struct InitReport {
    path: String,
    created: bool,
}

/// Execute `hb init`. Safe to run against an existing database: the schema
/// is applied with `IF NOT EXISTS` and rows are left alone.
///
/// # Errors
///
/// Returns an error if the file cannot be created or the schema cannot be
/// applied.
pub fn run_init(_args: &InitArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let created = !ctx.db_path.exists();
    db::open_store(&ctx.db_path, ctx.busy_timeout)
        .with_context(|| format!("failed to initialize {}", ctx.db_path.display()))?;

    tracing::info!(path = %ctx.db_path.display(), created, "database initialized");

    let report = InitReport {
        path: ctx.db_path.display().to_string(),
        created,
    };
    render(ctx.output, &report, |r, w| {
        if r.created {
            writeln!(w, "✓ created {}", r.path)
        } else {
            writeln!(w, "✓ {} already initialized", r.path)
        }
    })
}
