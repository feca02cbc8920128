// ABOUTME: Phasewise API server entry point
// ABOUTME: Loads configuration, prepares the database, and serves HTTP until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Phasewise Server Binary
//!
//! Starts the HTTP API backed by `SQLite` and the configured plan generator.

use anyhow::{Context, Result};
use clap::Parser;
use phasewise_server::{
    clock::SystemClock,
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    logging,
    plan_source::HttpPlanSource,
    resources::ServerResources,
    server::PhasewiseServer,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "phasewise-server")]
#[command(about = "Phasewise API - subscription-gated workout phase progression")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&url).context("Invalid --database-url")?;
    }

    logging::init_from_env()?;
    info!("Starting Phasewise API");
    info!("{}", config.summary());

    if let DatabaseUrl::SQLite { path } = &config.database.url {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let database = Database::new(&config.database.url.to_connection_string()).await?;
    info!("Database initialized");

    let plan_source = HttpPlanSource::new(config.plan_source.clone())
        .context("Failed to build plan generator client")?;

    let resources = Arc::new(ServerResources::new(
        Arc::new(config),
        database,
        Arc::new(plan_source),
        Arc::new(SystemClock),
    ));

    if let Err(e) = PhasewiseServer::new(resources).run().await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
