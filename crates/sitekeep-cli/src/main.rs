//! sitekeep CLI
//!
//! Operator commands for maintaining the CMS store. Stop the CMS server
//! before running any command that writes.

use clap::{Parser, Subcommand};
use sitekeep_core::logging_facility::{init, Profile};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod output;

#[derive(Debug, Parser)]
#[command(name = "sitekeep")]
#[command(about = "sitekeep - CMS store maintenance (restore, reconcile, provision)", long_about = None)]
struct Cli {
    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Maintenance config (TOML); built-in defaults when omitted
    #[arg(long, global = true, env = "SITEKEEP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create an empty store with the CMS tables and default roles
    Init(commands::init::InitArgs),
    /// Replace the store with the contents of a SQL dump
    Restore(commands::restore::RestoreArgs),
    /// Collapse singleton tables to one canonical row each
    Reconcile(commands::reconcile::ReconcileArgs),
    /// Ensure roles hold their configured grants
    Provision(commands::provision::ProvisionArgs),
    /// Show the state of every singleton table
    Status(commands::status::StatusArgs),
    /// Restore (optional), reconcile, then provision
    Maintain(commands::maintain::MaintainArgs),
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let ctx = commands::Context {
        json: cli.json,
        config_path: cli.config,
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(&ctx, args),
        Commands::Restore(args) => commands::restore::execute(&ctx, args),
        Commands::Reconcile(args) => commands::reconcile::execute(&ctx, args),
        Commands::Provision(args) => commands::provision::execute(&ctx, args),
        Commands::Status(args) => commands::status::execute(&ctx, args),
        Commands::Maintain(args) => commands::maintain::execute(&ctx, args),
    };

    match result {
        Ok(commands::Outcome::Clean) => ExitCode::SUCCESS,
        Ok(commands::Outcome::NeedsAttention) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
