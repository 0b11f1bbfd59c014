//! rich-reporter - demo session for the rich-reporter library.
//!
//! Replays a fixed session (styled status lines, leveled records, a summary
//! titled "Demo Run Summary") and exits 1 when the summary holds any ERROR or
//! CRITICAL records.

#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rich_reporter::{Level, LevelCounts, Reporter, ReporterConfig, ReporterResult, get_reporter};

/// Exit code for configuration problems.
const CONFIG_ERROR: u8 = 2;

/// Styled leveled logging with per-level statistics - demo session.
#[derive(Parser, Debug)]
#[command(name = "rich-reporter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Minimum level to admit (debug, info, warning, error, critical).
    /// Defaults to debug unless the config file or RICH_REPORTER_LEVEL sets it.
    #[arg(long, short = 'l')]
    level: Option<Level>,

    /// Also append plain records to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Disable styling.
    #[arg(long)]
    plain: bool,

    /// Print the final counts as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Run the scoped-reporter demo afterwards.
    #[arg(long)]
    with_context: bool,

    /// Read options from a TOML file instead of the environment.
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Config file (or environment), then flags on top.
    fn resolve_config(&self) -> ReporterResult<ReporterConfig> {
        let (mut config, level_configured) = match &self.config {
            Some(path) => (ReporterConfig::from_file(path)?, true),
            None => (
                ReporterConfig::from_env(),
                std::env::var_os("RICH_REPORTER_LEVEL").is_some(),
            ),
        };
        config.min_level = match self.level {
            Some(level) => level,
            None if level_configured => config.min_level,
            None => Level::Debug,
        };
        if let Some(path) = &self.log_file {
            config = config.persist_to(path);
        }
        if self.plain {
            config = config.plain_mode();
        }
        Ok(config)
    }
}

fn run_demo(reporter: &Reporter) -> LevelCounts {
    reporter.display("");
    reporter.display("[bold blue]═══════════════════════════════════════════════════════[/bold blue]");
    reporter.display("[bold blue]   Rich Reporter Demo - Logging & Reporting Utility   [/bold blue]");
    reporter.display("[bold blue]═══════════════════════════════════════════════════════[/bold blue]");
    reporter.display("");

    reporter.display("[bold green]✓[/bold green] [dim]Starting demo application...[/dim]");

    reporter.debug("Debug message: Detailed diagnostic information");
    reporter.info("Info message: Application started successfully");
    reporter.warning("Warning message: Using deprecated configuration option");
    reporter.info("Info message: Processing batch 1 of 3");
    reporter.info("Info message: Processing batch 2 of 3");
    reporter.warning("Warning message: Retrying failed connection");
    reporter.error("Error message: Failed to connect to external service");
    reporter.info("Info message: Processing batch 3 of 3");

    reporter.display("");
    reporter.display("[yellow]⚠[/yellow]  [dim]Some operations completed with warnings[/dim]");
    reporter.display("[red]✗[/red] [dim]Some operations failed[/dim]");
    reporter.display("");

    reporter.debug("Debug message: Cache hit ratio: 85%");
    reporter.info("Info message: All batches processed");
    reporter.error("Error message: 2 items could not be processed");

    reporter.display("[bold]Generating summary report...[/bold]");
    reporter.display("");

    let counts = reporter.summarize("Demo Run Summary");

    reporter.display("");
    if counts.has_errors() {
        reporter.display("[red]Demo completed with errors[/red]");
    } else if counts.has_warnings() {
        reporter.display("[yellow]Demo completed with warnings[/yellow]");
    } else {
        reporter.display("[green]Demo completed successfully[/green]");
    }
    counts
}

fn run_scoped_demo(config: &ReporterConfig) -> ReporterResult<()> {
    let config = ReporterConfig {
        min_level: Level::Info,
        enable_persistence: false,
        persistence_path: None,
        ..config.clone()
    };
    let reporter = get_reporter("context_demo", &config)?;

    reporter.display("");
    reporter.rule("Scoped Reporter Demo");
    reporter.display("");

    {
        let scoped = reporter.scoped();
        scoped.display("[bold]Running with a scoped reporter...[/bold]");
        scoped.info("The guard prints the summary when it goes out of scope");
        scoped.warning("This is a test warning");
        scoped.info("Operation completed");
    }

    reporter.display("");
    reporter.display("[dim]Scoped reporter demo completed[/dim]");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("rich-reporter: {e}");
            return ExitCode::from(CONFIG_ERROR);
        }
    };
    let reporter = match get_reporter("demo", &config) {
        Ok(reporter) => reporter,
        Err(e) => {
            eprintln!("rich-reporter: {e}");
            return ExitCode::from(CONFIG_ERROR);
        }
    };

    let counts = run_demo(&reporter);
    reporter.flush();

    if cli.with_context {
        if let Err(e) = run_scoped_demo(&config) {
            eprintln!("rich-reporter: {e}");
            return ExitCode::from(CONFIG_ERROR);
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&counts) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("rich-reporter: cannot encode counts: {e}"),
        }
    }

    if counts.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
