// Docudump - DocuShare collection exporter
// Copyright (c) 2025 Docudump Contributors
// Licensed under the MIT License

use clap::{CommandFactory, Parser};
use docudump::cli::{Cli, Commands};
use docudump::config::{resolve_config, DumpConfig, LoggingConfig, DEFAULT_CONFIG_FILE};
use docudump::domain::Result;
use docudump::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let cli_log_level = cli.log_level.clone();

    let Some(command) = cli.into_command() else {
        let _ = Cli::command().print_help();
        process::exit(2);
    };

    // init does not need a configuration
    let loaded = match command {
        Commands::Init(_) => Ok(DumpConfig::default()),
        _ => resolve_config(config_path.as_deref()),
    };

    let log_level = cli_log_level
        .or_else(|| loaded.as_ref().ok().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(e.exit_code());
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Docudump - DocuShare collection exporter"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown().await;
        eprintln!("\n⚠️  Shutdown signal received, finishing downloads in progress...");
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match execute_command(command, config_path.as_deref(), loaded, shutdown_rx).await
    {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors, flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Resolves on SIGINT, or SIGTERM on Unix
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    }
                }
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for Ctrl+C only");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            // Never resolve; without a listener there is nothing to wait for
            std::future::pending::<()>().await;
        }
    }
}

/// Execute the CLI command
async fn execute_command(
    command: Commands,
    config_path: Option<&str>,
    loaded: Result<DumpConfig>,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    match command {
        Commands::Init(args) => args.execute().await,
        Commands::ValidateConfig(args) => {
            args.execute(config_path.unwrap_or(DEFAULT_CONFIG_FILE), loaded)
                .await
        }
        Commands::Export(args) => match loaded {
            Ok(config) => args.execute(config, shutdown_signal).await,
            Err(e) => Ok(config_failure(&e)),
        },
        Commands::Tree(args) => match loaded {
            Ok(config) => args.execute(config).await,
            Err(e) => Ok(config_failure(&e)),
        },
    }
}

fn config_failure(error: &docudump::domain::DumpError) -> i32 {
    tracing::error!(error = %error, "Failed to load configuration");
    eprintln!("❌ {error}");
    error.exit_code()
}
