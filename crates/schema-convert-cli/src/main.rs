//! schema-convert CLI - MSSQL to PostgreSQL schema conversion.

use clap::{Parser, Subcommand};
use schema_convert::{Config, ConvertError, Orchestrator, SyncReport, TableStatus};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "schema-convert")]
#[command(about = "Recreate MSSQL table schemas in PostgreSQL")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tables, constraints, and indexes in the target
    Run {
        /// Override source schema
        #[arg(long)]
        source_schema: Option<String>,

        /// Override target schema
        #[arg(long)]
        target_schema: Option<String>,

        /// Override number of workers
        #[arg(long)]
        workers: Option<usize>,

        /// Dry run: print the planned DDL without executing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Test database connections
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", error_message(&e));
            ExitCode::from(e.exit_code())
        }
    }
}

/// Detailed error text, with a hint when a database could not be reached.
fn error_message(e: &ConvertError) -> String {
    let mut message = e.format_detailed();
    if e.is_connection_error() {
        message.push_str("\nCheck the connection settings in the config file.");
    }
    message
}

async fn run() -> Result<ExitCode, ConvertError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run {
            source_schema,
            target_schema,
            workers,
            dry_run,
        } => {
            // Apply overrides
            if let Some(schema) = source_schema {
                config.source.schema = schema;
            }
            if let Some(schema) = target_schema {
                config.target.schema = Some(schema);
            }
            if let Some(w) = workers {
                config.migration.workers = Some(w);
            }
            config.validate()?;
            let config = config.with_auto_tuning();

            let cancel_token = setup_signal_handler();

            let orchestrator = Orchestrator::new(config).await?.with_dry_run(dry_run);
            let report = orchestrator.run(cancel_token).await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                print_report(&report);
            }

            if report.status == "cancelled" {
                return Ok(ExitCode::from(ConvertError::Cancelled.exit_code()));
            }
            if report.tables_failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::HealthCheck => {
            let orchestrator = Orchestrator::new(config).await?;
            let result = orchestrator.health_check().await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source (MSSQL): {} ({}ms)",
                    if result.source_connected { "OK" } else { "FAILED" },
                    result.source_latency_ms
                );
                if let Some(ref err) = result.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  Target (PostgreSQL): {} ({}ms)",
                    if result.target_connected { "OK" } else { "FAILED" },
                    result.target_latency_ms
                );
                if let Some(ref err) = result.target_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "\n  Overall: {}",
                    if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !result.healthy {
                return Err(ConvertError::pool("health check failed", "health-check"));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &SyncReport) {
    if report.dry_run {
        for table in &report.tables {
            if table.status != TableStatus::Planned {
                continue;
            }
            println!("-- {}", table.table);
            for sql in &table.statements {
                println!("{}", sql);
            }
            println!();
        }
    }

    let status_msg = match (report.dry_run, report.status.as_str()) {
        (_, "cancelled") => "Schema conversion cancelled.",
        (true, _) => "Dry run completed!",
        (false, "completed") => "Schema conversion completed!",
        (false, _) => "Schema conversion completed with errors.",
    };
    println!("\n{}", status_msg);
    println!("  Run ID: {}", report.run_id);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Completed: {}", report.completed_at.to_rfc3339());
    println!("  Duration: {:.2}s", report.duration_seconds);
    println!(
        "  Tables: {} total, {} created, {} planned, {} skipped, {} failed, {} cancelled",
        report.tables_total,
        report.tables_created,
        report.tables_planned,
        report.tables_skipped,
        report.tables_failed,
        report.tables_cancelled
    );
    if report.statement_failures > 0 {
        println!("  Failed statements: {}", report.statement_failures);
        for table in &report.tables {
            for failure in &table.failures {
                println!("    {}: {}", table.table, failure.error);
            }
        }
    }
    if !report.failed_tables.is_empty() {
        println!("  Failed tables: {:?}", report.failed_tables);
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Setup signal handlers for graceful shutdown.
/// Handles both SIGINT (Ctrl-C) and SIGTERM.
/// Returns a CancellationToken that will be cancelled when a signal is received.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    for (kind, name) in [
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::terminate(), "SIGTERM"),
    ] {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            let mut stream = match signal(kind) {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Failed to install {} handler: {}", name, e);
                    return;
                }
            };
            stream.recv().await;
            eprintln!(
                "\nReceived {}. Finishing running tables, not starting new ones...",
                name
            );
            token.cancel();
        });
    }

    cancel_token
}

/// Setup signal handler for Windows (only Ctrl-C)
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            return;
        }
        eprintln!("\nReceived Ctrl-C. Finishing running tables, not starting new ones...");
        token.cancel();
    });

    cancel_token
}
