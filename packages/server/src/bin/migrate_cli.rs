//! CLI for schema migrations
//!
//! Runs or lists the embedded sqlx migrations. Outputs one JSON object per
//! invocation so scripts can parse the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use errand_core::config::Config;
use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashSet;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Parser)]
#[command(name = "migrate_cli")]
#[command(about = "Schema migration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Run,

    /// List migrations and whether each has been applied
    List,
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    migrations: Option<Vec<MigrationInfo>>,
}

#[derive(Serialize)]
struct MigrationInfo {
    version: i64,
    description: String,
    applied: bool,
}

fn output(resp: &Response) -> Result<()> {
    println!("{}", serde_json::to_string(resp)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => cmd_run().await,
        Commands::List => cmd_list().await,
    };

    if let Err(e) = &result {
        output(&Response {
            success: false,
            message: Some(format!("{:#}", e)),
            migrations: None,
        })?;
    }
    result
}

async fn get_pool() -> Result<sqlx::PgPool> {
    let config = Config::from_env()?;
    PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_run() -> Result<()> {
    let pool = get_pool().await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    output(&Response {
        success: true,
        message: Some(format!("{} migrations up to date", MIGRATOR.iter().count())),
        migrations: None,
    })
}

async fn cmd_list() -> Result<()> {
    let pool = get_pool().await?;

    // The bookkeeping table does not exist before the first run.
    let applied: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(&pool)
            .await
            .unwrap_or_default()
            .into_iter()
            .collect();

    let migrations = MIGRATOR
        .iter()
        .map(|m| MigrationInfo {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect();

    output(&Response {
        success: true,
        message: None,
        migrations: Some(migrations),
    })
}
