// crates/conformance-cli/src/main.rs
// ============================================================================
// Module: Resource Conformance CLI Entry Point
// Description: Command dispatcher for conformance runs and config checks.
// Purpose: Run the step library against a configured server and report.
// Dependencies: clap, conformance-{config,core,providers}, thiserror, tracing
// ============================================================================

//! ## Overview
//! `conformance run` loads `conformance.toml`, builds the HTTP transport,
//! payload generator, and resource catalog, runs the sequencer, and writes a
//! JSON or Markdown report. Exit codes: `0` when no step failed or errored,
//! `1` when any did, `2` when the harness itself could not run or finish.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use conformance_cli::report::render_json;
use conformance_cli::report::render_markdown;
use conformance_cli::telemetry::init_tracing;
use conformance_config::ConformanceConfig;
use conformance_config::ReportFormat;
use conformance_core::CancellationToken;
use conformance_core::ConformanceReport;
use conformance_core::LogObserver;
use conformance_core::OutcomeCounts;
use conformance_core::ResourceCatalog;
use conformance_core::ResourceType;
use conformance_core::STEP_LIBRARY;
use conformance_core::Sequencer;
use conformance_core::SequencerConfig;
use conformance_providers::HttpTransport;
use conformance_providers::HttpTransportConfig;
use conformance_providers::OperationOutcomeParser;
use conformance_providers::StaticCatalog;
use conformance_providers::TemplateGenerator;
use thiserror::Error;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Exit code when any step failed or errored.
const EXIT_NONCONFORMANT: u8 = 1;
/// Exit code when the harness could not run or finish.
const EXIT_HARNESS: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "conformance", version, disable_help_subcommand = true)]
struct Cli {
    /// Emit diagnostic logs as JSON (filter via `CONFORMANCE_LOG`).
    #[arg(long, global = true)]
    log_json: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the conformance steps against the configured server.
    Run(RunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Step library utilities.
    Steps {
        /// Selected steps subcommand.
        #[command(subcommand)]
        command: StepsCommand,
    },
}

/// Arguments for `conformance run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Config file path (defaults to `CONFORMANCE_CONFIG` or ./conformance.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Restrict the run to these resource types (repeatable).
    #[arg(long = "resource-type", value_name = "TYPE")]
    resource_types: Vec<String>,
    /// Report format (overrides `report.format`).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Report destination (overrides `report.output`; stdout when unset).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Write JSON-lines progress events to this file.
    #[arg(long, value_name = "PATH")]
    events: Option<PathBuf>,
    /// Resource types run concurrently (overrides `run.parallelism`).
    #[arg(long)]
    parallelism: Option<usize>,
    /// Cancel remaining steps after this many milliseconds.
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file and exit.
    Validate(ConfigValidateCommand),
}

/// Arguments for `conformance config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to `CONFORMANCE_CONFIG` or ./conformance.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Steps subcommands.
#[derive(Subcommand, Debug)]
enum StepsCommand {
    /// List the steps in execution order.
    List,
}

/// Report format argument.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    /// Machine-readable JSON.
    Json,
    /// Markdown tables.
    Markdown,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Markdown => Self::Markdown,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Harness-level failure; always exits with [`EXIT_HARNESS`].
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(command: Commands) -> CliResult<ExitCode> {
    match command {
        Commands::Run(command) => command_run(&command),
        Commands::Config {
            command: ConfigCommand::Validate(command),
        } => command_config_validate(&command),
        Commands::Steps {
            command: StepsCommand::List,
        } => command_steps_list(),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes a conformance run.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = ConformanceConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let catalog = StaticCatalog::new(config.catalog_entries())
        .map_err(|err| CliError::new(format!("invalid resource catalog: {err}")))?;
    let resource_types = select_resource_types(&catalog, &command.resource_types)?;
    let generator = build_generator(&config)?;
    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: config.server.base_url.clone(),
        timeout_ms: config.server.timeout_ms,
        max_response_bytes: config.server.max_response_bytes,
        user_agent: config.server.user_agent.clone(),
    })
    .map_err(|err| CliError::new(err.to_string()))?;

    let parallelism = command.parallelism.unwrap_or(config.run.parallelism);
    let mut sequencer = Sequencer::new(
        transport,
        generator,
        OperationOutcomeParser,
        SequencerConfig {
            parallelism,
        },
    )
    .map_err(|err| CliError::new(err.to_string()))?;
    let mut events = None;
    if let Some(path) = &command.events {
        let file = File::create(path).map_err(|err| {
            CliError::new(format!("failed to create events file {}: {err}", path.display()))
        })?;
        let observer = Arc::new(LogObserver::new(file));
        sequencer = sequencer.with_observer(Arc::clone(&observer));
        events = Some(observer);
    }

    let deadline = command.deadline_ms.or(config.run.deadline_ms).map(Duration::from_millis);
    let guard = deadline.map(|limit| DeadlineGuard::start(limit, sequencer.cancellation_token()));
    info!(
        base_url = %config.server.base_url,
        resource_types = resource_types.len(),
        parallelism,
        "conformance run started"
    );
    let report = sequencer.run_types(&resource_types);
    drop(guard);

    if let Some(observer) = &events {
        let dropped = observer.write_failures();
        if dropped > 0 {
            warn!(dropped, "some progress events could not be written");
            let _ = write_stderr_line(&format!("warning: {dropped} progress events not written"));
        }
    }

    let counts = OutcomeCounts::for_report(&report);
    info!(
        passed = counts.passed,
        failed = counts.failed,
        errored = counts.errored,
        skipped = counts.skipped,
        cancelled = report.cancelled,
        "conformance run finished"
    );

    let format = command.format.map_or(config.report.format, ReportFormat::from);
    let rendered = render_report(&report, format)?;
    match command.output.as_ref().or(config.report.output.as_ref()) {
        Some(path) => fs::write(path, rendered.as_bytes()).map_err(|err| {
            CliError::new(format!("failed to write report {}: {err}", path.display()))
        })?,
        None => write_stdout_line(rendered.trim_end())
            .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))?,
    }
    Ok(exit_code_for(&report))
}

/// Returns the root types to run, restricted to the requested names.
fn select_resource_types(
    catalog: &StaticCatalog,
    requested: &[String],
) -> CliResult<Vec<ResourceType>> {
    let available = catalog.resource_types();
    if requested.is_empty() {
        return Ok(available);
    }
    let requested: Vec<ResourceType> = requested.iter().map(ResourceType::new).collect();
    if let Some(unknown) = requested.iter().find(|rt| !available.contains(rt)) {
        return Err(CliError::new(format!("resource type not configured as root: {unknown}")));
    }
    Ok(catalog.restricted_to(&requested))
}

/// Builds the payload generator from configured templates.
fn build_generator(config: &ConformanceConfig) -> CliResult<TemplateGenerator> {
    let mut generator = TemplateGenerator::new();
    for entry in &config.resource_types {
        if let Some(template) = &entry.template {
            generator = generator
                .with_template(ResourceType::new(entry.name.as_str()), template.clone())
                .map_err(|err| CliError::new(err.to_string()))?;
        }
    }
    Ok(generator)
}

/// Renders the report in the selected format.
fn render_report(report: &ConformanceReport, format: ReportFormat) -> CliResult<String> {
    match format {
        ReportFormat::Json => render_json(report)
            .map_err(|err| CliError::new(format!("failed to render report: {err}"))),
        ReportFormat::Markdown => Ok(render_markdown(report)),
    }
}

/// Maps a finished report to the process exit code.
fn exit_code_for(report: &ConformanceReport) -> ExitCode {
    if report.cancelled {
        warn!("run cancelled before every step completed");
        return ExitCode::from(EXIT_HARNESS);
    }
    if OutcomeCounts::for_report(report).is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NONCONFORMANT)
    }
}

/// Cancels a run when its deadline passes; dropping the guard disarms it.
struct DeadlineGuard {
    /// Dropped to wake the timer thread early.
    _disarm: Sender<()>,
}

impl DeadlineGuard {
    /// Starts the timer thread.
    fn start(limit: Duration, token: CancellationToken) -> Self {
        let (disarm, armed) = mpsc::channel::<()>();
        thread::spawn(move || {
            if armed.recv_timeout(limit) == Err(RecvTimeoutError::Timeout) {
                warn!(deadline_ms = limit.as_millis(), "run deadline reached, cancelling");
                token.cancel();
            }
        });
        Self {
            _disarm: disarm,
        }
    }
}

// ============================================================================
// SECTION: Config and Steps Commands
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = ConformanceConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let roots = config.resource_types.iter().filter(|entry| entry.root).count();
    write_stdout_line(&format!(
        "config ok: {} resource types ({roots} tested) against {}",
        config.resource_types.len(),
        config.server.base_url
    ))
    .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Lists the step library.
fn command_steps_list() -> CliResult<ExitCode> {
    let generic = ResourceType::new("<type>");
    for step in &STEP_LIBRARY {
        write_stdout_line(&format!("{}\t{}", step.id, step.title_for(&generic)))
            .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns the harness exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_HARNESS)
}
