pub mod completions;
pub mod departments;
pub mod employees;
pub mod export;
pub mod init;
pub mod log_hours;
pub mod project;
pub mod projects;

use std::path::PathBuf;
use std::time::Duration;

use hourbook_core::{AccessContext, ErrorCode, db};
use rusqlite::Connection;

use crate::output::{CliError, OutputMode, render_error};

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
    pub output: OutputMode,
    pub access: AccessContext,
}

impl CommandContext {
    /// Open the configured database, which must already exist.
    ///
    /// A missing file, or one that is not an hourbook database, is reported
    /// in the active output mode with a pointer at `hb init`. The file is
    /// never created or altered here.
    pub fn open_existing(&self) -> anyhow::Result<Connection> {
        if let Some(conn) = db::try_open_store(&self.db_path, self.busy_timeout)? {
            return Ok(conn);
        }

        let code = ErrorCode::StoreMissing;
        render_error(
            self.output,
            &CliError::with_details(
                format!("{}: {}", code.message(), self.db_path.display()),
                code.hint().unwrap_or_default(),
                code.code(),
            ),
        )?;
        anyhow::bail!("database not found: {}", self.db_path.display());
    }
}
