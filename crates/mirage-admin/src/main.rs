// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mirage Admin - REST API, live stats stream and Web UI
//!
//! # Usage
//!
//! ```bash
//! # Start admin interface on default port 8888
//! mirage-admin --destination api.example.com
//!
//! # Start in capture mode with a custom database
//! mirage-admin --mode capture --db /var/lib/mirage/requests.db
//!
//! # Using configuration file
//! mirage-admin --config mirage.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mirage_admin::{build_router, AdminConfig, AppState, Mode};
use mirage_store::{MemoryStore, RecordStore, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Mirage admin interface
#[derive(Parser, Debug)]
#[command(name = "mirage-admin")]
#[command(about = "Mirage admin interface - records, live stats and proxy mode")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Admin HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Destination host of the proxied service
    #[arg(short, long)]
    destination: Option<String>,

    /// Initial mode (virtualize, capture, modify, synthesize)
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Database path (SQLite file)
    #[arg(long)]
    db: Option<String>,

    /// Keep records in memory only
    #[arg(long)]
    in_memory: bool,

    /// Bucket holding captured requests
    #[arg(long)]
    bucket: Option<String>,

    /// Live stats push period in milliseconds
    #[arg(long)]
    stats_interval_ms: Option<u64>,

    /// Largest accepted encoded record in bytes
    #[arg(long)]
    max_record_bytes: Option<u64>,

    /// Disable Web UI (API only)
    #[arg(long)]
    api_only: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Verbose logging (debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "mirage.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
        };
    }

    let config = build_config(&args)?;

    // Setup logging
    let filter = env_filter(std::env::var("RUST_LOG").ok().as_deref(), config.log_filter());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let store: Arc<dyn RecordStore> = if config.in_memory {
        warn!("Using in-memory record store, records are lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            SqliteStore::new(&config.db_path)
                .with_context(|| format!("Failed to open record store at {}", config.db_path))?,
        )
    };

    let state = Arc::new(AppState::new(&config, store));
    let app = build_router(state, config.api_only);

    let addr = config.addr();
    info!("Mirage Admin v{}", env!("CARGO_PKG_VERSION"));
    info!(admin_addr = %addr, "Admin interface is starting...");
    info!("Destination: {}", config.destination);
    info!("Mode: {}", config.mode);
    if !config.in_memory {
        info!("Database: {}", config.db_path);
    }
    if !config.api_only {
        info!("Web UI: http://{}/", addr);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Admin interface stopped");
    Ok(())
}

/// File (if any) first, then explicit command-line flags.
fn build_config(args: &Args) -> Result<AdminConfig> {
    let mut config = match args.config {
        Some(ref path) => AdminConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => AdminConfig::default(),
    };

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ref bind) = args.bind {
        config.bind = bind.clone();
    }
    if let Some(ref destination) = args.destination {
        config.destination = destination.clone();
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(ref db) = args.db {
        config.db_path = db.clone();
    }
    if args.in_memory {
        config.in_memory = true;
    }
    if let Some(ref bucket) = args.bucket {
        config.bucket = bucket.clone();
    }
    if let Some(ms) = args.stats_interval_ms {
        config.stats_interval_ms = ms;
    }
    if let Some(bytes) = args.max_record_bytes {
        config.max_record_bytes = bytes;
    }
    if args.api_only {
        config.api_only = true;
    }
    if let Some(ref level) = args.log_level {
        config.log_level = level.clone();
    }
    if args.verbose {
        config.verbose = true;
    }

    config.validate()?;
    Ok(config)
}

fn cmd_gen_config(output: PathBuf) -> Result<()> {
    let config = AdminConfig {
        destination: "api.example.com".into(),
        mode: Mode::Capture,
        db_path: "mirage.db".into(),
        ..Default::default()
    };

    let toml_str = toml::to_string_pretty(&config)?;
    let content = format!(
        r#"# Mirage Admin Configuration
# Generated by mirage-admin gen-config

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<()> {
    match AdminConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("Listen: {}", config.addr());
            println!("Destination: {}", config.destination);
            println!("Mode: {}", config.mode);
            if config.in_memory {
                println!("Store: in-memory");
            } else {
                println!("Store: {} (bucket {})", config.db_path, config.bucket);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

/// `RUST_LOG` wins over the configured level when it parses.
fn env_filter(rust_log: Option<&str>, configured: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
