#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use hourbook_core::{AccessContext, ErrorCode, config};
use output::{CliError, OutputMode, early_output_mode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::CommandContext;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "hb: staffing and hours reports",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and FORMAT).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Database file (overrides HOURBOOK_DB and config).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Name recorded as the caller of each operation (defaults to
    /// HOURBOOK_USER, then USER).
    #[arg(long, global = true, value_name = "NAME")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Build the per-invocation access context.
    fn access(&self) -> AccessContext {
        let user = self
            .user
            .clone()
            .or_else(|| env::var("HOURBOOK_USER").ok())
            .or_else(|| env::var("USER").ok())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "anonymous".to_string());
        AccessContext::authorized(user)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create the database",
        long_about = "Create the database file and schema. Existing data is left untouched.",
        after_help = "EXAMPLES:\n    # Create ./hourbook.sqlite3\n    hb init\n\n    # Create a database elsewhere\n    hb --db /srv/company.sqlite3 init"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Reports",
        about = "List departments",
        long_about = "List department numbers and names, for use with `--dept`.",
        after_help = "EXAMPLES:\n    # List departments\n    hb departments\n\n    # Emit machine-readable output\n    hb departments --json"
    )]
    Departments(cmd::departments::DepartmentsArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Employee roster with hours",
        long_about = "List employees with department, dependent count, project count and total hours.",
        after_help = "EXAMPLES:\n    # Everyone, by last name\n    hb employees\n\n    # Name contains \"an\", in department 5, most hours first\n    hb employees --search an --dept 5 --sort hours --dir desc\n\n    # Emit machine-readable output\n    hb employees --json"
    )]
    Employees(cmd::employees::EmployeesArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Project roster with hours",
        long_about = "List projects with department, headcount and total hours.",
        after_help = "EXAMPLES:\n    # By name\n    hb projects\n\n    # Busiest first\n    hb projects --sort hours --dir desc"
    )]
    Projects(cmd::projects::ProjectsArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Show one project",
        long_about = "Show a project with every assigned employee and their accumulated hours.",
        after_help = "EXAMPLES:\n    # Show project 10\n    hb project 10\n\n    # Include the employees that can be assigned\n    hb project 10 --with-employees"
    )]
    Project(cmd::project::ProjectArgs),

    #[command(
        next_help_heading = "Hours",
        about = "Add hours to an assignment",
        long_about = "Add hours to an employee's total on a project, creating the assignment on first use.",
        after_help = "EXAMPLES:\n    # Add 7.5 hours for 123456789 on project 1\n    hb log-hours 123456789 1 7.5\n\n    # Emit machine-readable output\n    hb log-hours 123456789 1 7.5 --json"
    )]
    LogHours(cmd::log_hours::LogHoursArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Export the employee roster as CSV",
        long_about = "Write the employee roster as CSV, using the same filters and sort as `hb employees`.",
        after_help = "EXAMPLES:\n    # To stdout\n    hb export\n\n    # Filtered, to a file\n    hb export --dept 4 --sort hours --dir desc --output admin.csv"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    hb completions bash\n\n    # Generate zsh completions\n    hb completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("HOURBOOK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "hourbook=debug,info"
        } else {
            "hourbook=info,warn"
        })
    });

    let format = env::var("HOURBOOK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let effective = match config::resolve_config(&project_root, cli.db.as_deref(), cli.json) {
        Ok(effective) => effective,
        Err(err) => {
            let code = ErrorCode::ConfigParseError;
            render_error(
                early_output_mode(cli.format, cli.json),
                &CliError::with_details(
                    format!("{err:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(err);
        }
    };

    let ctx = CommandContext {
        output: resolve_output_mode(cli.format, &effective.resolved_output),
        db_path: effective.database_path,
        busy_timeout: effective.busy_timeout,
        access: cli.access(),
    };

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(
        db = %ctx.db_path.display(),
        user = %ctx.access,
        output = ?ctx.output,
        "resolved invocation"
    );

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, &ctx),
        Commands::Departments(ref args) => cmd::departments::run_departments(args, &ctx),
        Commands::Employees(ref args) => cmd::employees::run_employees(args, &ctx),
        Commands::Projects(ref args) => cmd::projects::run_projects(args, &ctx),
        Commands::Project(ref args) => cmd::project::run_project(args, &ctx),
        Commands::LogHours(ref args) => cmd::log_hours::run_log_hours(args, &ctx),
        Commands::Export(ref args) => cmd::export::run_export(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}
