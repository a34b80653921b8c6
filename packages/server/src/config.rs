use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::kernel::notification_queue::DEFAULT_QUEUE_CAPACITY;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub db_max_connections: u32,
    pub notification_queue_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            notification_queue_capacity: env::var("NOTIFICATION_QUEUE_CAPACITY")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_QUEUE_CAPACITY))
                .context("NOTIFICATION_QUEUE_CAPACITY must be a valid number")?,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
