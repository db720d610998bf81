use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::db::DEFAULT_BUSY_TIMEOUT;

/// File name of the per-directory config.
pub const PROJECT_CONFIG_FILE: &str = "hourbook.toml";

/// Database file used when nothing else is configured.
pub const DEFAULT_DATABASE_FILE: &str = "hourbook.sqlite3";

/// Environment variable that overrides the configured database path.
pub const DATABASE_ENV: &str = "HOURBOOK_DB";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub database_path: PathBuf,
    pub busy_timeout: Duration,
    pub resolved_output: String,
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("hourbook/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge flags, environment, project and user config.
///
/// Database path precedence: `cli_db` > `HOURBOOK_DB` > project config >
/// user config > `./hourbook.sqlite3`. Relative paths from the project
/// config resolve against `project_root`.
pub fn resolve_config(
    project_root: &Path,
    cli_db: Option<&Path>,
    cli_json: bool,
) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_db = env::var_os(DATABASE_ENV).map(PathBuf::from);
    let database_path = resolve_database_path(project_root, cli_db, env_db, &project, &user);
    let busy_timeout = resolve_busy_timeout(&project, &user);

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format)?;

    Ok(EffectiveConfig {
        project,
        user,
        database_path,
        busy_timeout,
        resolved_output,
    })
}

fn resolve_database_path(
    project_root: &Path,
    cli_db: Option<&Path>,
    env_db: Option<PathBuf>,
    project: &ProjectConfig,
    user: &UserConfig,
) -> PathBuf {
    if let Some(path) = cli_db {
        return path.to_path_buf();
    }
    if let Some(path) = env_db.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }
    if let Some(path) = project.database.path.as_ref() {
        return project_root.join(path);
    }
    if let Some(path) = user.database.path.as_ref() {
        return path.clone();
    }
    project_root.join(DEFAULT_DATABASE_FILE)
}

fn resolve_busy_timeout(project: &ProjectConfig, user: &UserConfig) -> Duration {
    project
        .database
        .busy_timeout_ms
        .or(user.database.busy_timeout_ms)
        .map_or(DEFAULT_BUSY_TIMEOUT, Duration::from_millis)
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> Result<String> {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return Ok("json".to_string());
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return Ok(mode.to_string());
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return Ok(mode.to_string());
    }

    if std::io::stdout().is_terminal() {
        Ok("pretty".to_string())
    } else {
        Ok("text".to_string())
    }
}
