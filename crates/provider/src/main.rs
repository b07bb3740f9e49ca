// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! terraform-provider-podman: plugin process plus offline helpers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tfpod_adapters::PodmanConnector;
use tfpod_provider::{commands, dispatch, env, load_file, ExitError, Provider, ResourceRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "terraform-provider-podman", version, about = "Terraform provider for Podman containers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the plugin protocol on stdin/stdout (default)
    Serve,
    /// Print the provider and resource schemas as JSON
    Schema,
    /// Validate the provider and resource blocks of a .tf file
    Validate { file: PathBuf },
    /// Print the container specification each resource would be created with
    Plan { file: PathBuf },
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            eprintln!("{exit}");
            std::process::exit(exit.code);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_new(env::log_filter())
        .unwrap_or_else(|_| EnvFilter::new(env::DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let socket = env::socket_path()?;
            tracing::info!(socket = %socket.display(), "serving podman provider");
            let provider = Provider::new(ResourceRegistry::podman(PodmanConnector::new(socket)), env::timeouts());
            dispatch::serve(Arc::new(provider), tokio::io::stdin(), tokio::io::stdout()).await?;
            Ok(())
        }
        Command::Schema => {
            let body = offline_provider().schema();
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Command::Validate { file } => {
            let tf = load_file(&file)?;
            let findings = commands::validate(offline_provider().resources(), &tf);
            for finding in &findings {
                println!("{finding}");
            }
            let errors = findings.iter().filter(|f| f.diagnostic.is_error()).count();
            if errors > 0 {
                return Err(ExitError::findings(errors).into());
            }
            println!("{}: ok", file.display());
            Ok(())
        }
        Command::Plan { file } => {
            let tf = load_file(&file)?;
            match commands::plan(offline_provider().resources(), &tf) {
                Ok(specs) => {
                    let json = serde_json::to_string_pretty(&specs).context("encoding container specifications")?;
                    println!("{json}");
                    Ok(())
                }
                Err(findings) => {
                    for finding in &findings {
                        println!("{finding}");
                    }
                    let errors = findings.iter().filter(|f| f.diagnostic.is_error()).count();
                    Err(ExitError::findings(errors.max(1)).into())
                }
            }
        }
    }
}

/// Offline commands never connect, so a missing socket is not an error.
fn offline_provider() -> Provider {
    let socket = env::socket_path().unwrap_or_default();
    Provider::new(ResourceRegistry::podman(PodmanConnector::new(socket)), env::timeouts())
}
