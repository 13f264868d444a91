use anyhow::{Context, Result};

use crate::models::candidate::SeniorityThresholds;
use crate::search::executor::PageLimits;
use crate::similarity::engine::FeatureWeights;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Upper bound on candidate-store connections held by the pool.
    pub db_max_connections: u32,
    pub redis_url: String,
    pub oracle_api_key: String,
    /// Timeout for a single oracle HTTP call, in seconds. A slow oracle
    /// degrades to the keyword fallback instead of hanging the request.
    pub oracle_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    pub feature_weights: FeatureWeights,
    pub seniority_thresholds: SeniorityThresholds,
    pub page_limits: PageLimits,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a number")?,
            redis_url: require_env("REDIS_URL")?,
            oracle_api_key: require_env("ORACLE_API_KEY")?,
            oracle_timeout_secs: std::env::var("ORACLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse::<u64>()
                .context("ORACLE_TIMEOUT_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            feature_weights: FeatureWeights::default(),
            seniority_thresholds: SeniorityThresholds::default(),
            page_limits: PageLimits::default(),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
