//! Configuration loading from environment.

use std::env;
use std::time::Duration;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub rate_provider_url: String,
    pub rate_cache_ttl: Duration,
    pub rate_cache_sweep_interval: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let token_ttl = duration_secs("TOKEN_TTL_SECS", 86_400)?;

        let rate_provider_url = env::var("RATE_PROVIDER_URL")
            .map_err(|_| anyhow::anyhow!("RATE_PROVIDER_URL environment variable is required"))?;

        let rate_cache_ttl = duration_secs("RATE_CACHE_TTL_SECS", 300)?;
        let rate_cache_sweep_interval = duration_secs("RATE_CACHE_SWEEP_SECS", 600)?;

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            token_ttl,
            rate_provider_url,
            rate_cache_ttl,
            rate_cache_sweep_interval,
        })
    }
}

fn duration_secs(var: &str, default: u64) -> anyhow::Result<Duration> {
    let secs = match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{var} must be a whole number of seconds"))?,
        Err(_) => default,
    };
    Ok(Duration::from_secs(secs))
}
