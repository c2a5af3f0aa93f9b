//! CLI command definitions and dispatch.

pub mod directory;
pub mod migrate;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use docwiki_core::error::AppError;

/// DocWiki — document wiki directory administration
#[derive(Debug, Parser)]
#[command(name = "docwiki", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (merged over config/default.toml)
    #[arg(short, long, default_value = "default")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Directory tree management
    Dir(directory::DirectoryArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Dir(args) => directory::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for the given environment
pub fn load_config(env: &str) -> Result<docwiki_core::config::AppConfig, AppError> {
    docwiki_core::config::AppConfig::load(env)
}

/// Helper: create database pool from config
pub async fn create_db_pool(
    config: &docwiki_core::config::AppConfig,
) -> Result<sqlx::PgPool, AppError> {
    let pool = docwiki_database::connection::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}
