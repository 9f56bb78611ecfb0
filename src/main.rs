#![forbid(unsafe_code)]

//! `gap-mcp` — MCP server binary for the GAP computer algebra system.
//!
//! Bootstraps configuration and serves the GAP tool surface over stdio
//! until the client disconnects or a shutdown signal arrives. The GAP
//! process itself is started lazily by the first tool call.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use gap_mcp::config::ServerConfig;
use gap_mcp::mcp::handler::AppState;
use gap_mcp::mcp::transport;
use gap_mcp::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "gap-mcp", about = "MCP server for the GAP computer algebra system", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the GAP executable (auto-detected when omitted).
    #[arg(long)]
    gap_executable: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("gap-mcp server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(ref path) => ServerConfig::load_from_path(path)?,
        None => ServerConfig::default(),
    };

    // CLI override outranks the config file; the environment variable is
    // consulted later, during executable resolution.
    if let Some(exe) = args.gap_executable {
        config.gap_executable = Some(exe);
    }

    let config = Arc::new(config);
    info!("configuration loaded");

    let state = Arc::new(AppState::new(Arc::clone(&config)));

    // ── Serve stdio until disconnect or signal ──────────
    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_ct.cancel();
    });

    transport::serve_stdio(Arc::clone(&state), ct).await?;

    // ── Graceful shutdown ───────────────────────────────
    if let Some(runner) = state.runner.initialized() {
        runner.close().await;
    }

    info!("gap-mcp shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Stdout carries the MCP protocol stream; diagnostics go to stderr.
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
