//! billard-migrate CLI - copies the billard ranking database between
//! PostgreSQL instances.

mod serve;

use billard_migrate::{Config, MigrateError, Orchestrator};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "billard-migrate")]
#[command(about = "Cross-database migration for the billard ranking backend")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

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
    /// Run the migration once and print the report
    Run {
        /// Output the wire JSON report to stdout
        #[arg(long)]
        output_json: bool,
    },

    /// Test connectivity to both databases
    HealthCheck,

    /// Serve the HTTP trigger endpoint (GET /api/migrate-data)
    Serve {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(MigrateError::Config)?;

    // Credentials may come from a local .env file
    dotenvy::dotenv().ok();

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let cancel = setup_signal_handler();

    match cli.command {
        Commands::Run { output_json } => {
            let orchestrator = Orchestrator::new(config)?;
            let report = orchestrator.run(cancel).await;

            if output_json {
                println!("{}", report.to_json()?);
            } else {
                for line in report.result_lines() {
                    println!("{}", line);
                }
                println!();
                if report.success {
                    println!("Migration completed in {:.2}s", report.duration_seconds());
                } else {
                    println!(
                        "Migration failed: {}",
                        report.fatal_error.as_deref().unwrap_or("unknown error")
                    );
                }
            }

            if !report.success {
                return Err(MigrateError::Config(
                    report
                        .fatal_error
                        .unwrap_or_else(|| "migration failed".to_string()),
                ));
            }
        }

        Commands::HealthCheck => {
            let orchestrator = Orchestrator::new(config)?;
            let result = orchestrator.health_check().await;
            orchestrator.close();

            println!("Health Check Results:");
            println!(
                "  Source: {} ({}ms)",
                if result.source_connected { "OK" } else { "FAILED" },
                result.source_latency_ms
            );
            if let Some(ref err) = result.source_error {
                println!("    Error: {}", err);
            }
            println!(
                "  Target: {} ({}ms)",
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

            if !result.healthy {
                return Err(MigrateError::Config("Health check failed".to_string()));
            }
        }

        Commands::Serve { bind, port } => {
            serve::run_server(config, &bind, port, cancel).await?;
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Setup signal handlers for graceful shutdown.
/// Returns a CancellationToken that is cancelled on SIGINT or SIGTERM.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    let token_int = cancel_token.clone();
    let token_term = cancel_token.clone();

    tokio::spawn(async move {
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        sigint.recv().await;
        eprintln!("\nReceived SIGINT. Finishing current row and shutting down...");
        token_int.cancel();
    });

    tokio::spawn(async move {
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        sigterm.recv().await;
        eprintln!("\nReceived SIGTERM. Finishing current row and shutting down...");
        token_term.cancel();
    });

    cancel_token
}

/// Setup signal handler for Windows (only Ctrl-C).
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup Ctrl-C handler");
        eprintln!("\nReceived Ctrl-C. Finishing current row and shutting down...");
        token.cancel();
    });

    cancel_token
}
