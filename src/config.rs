use std::env;

use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://football.esportsbattle.com";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_RETENTION_DAYS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be a positive integer")]
    InvalidNumber(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_base_url: String,
    pub db_path: String,
    pub poll_interval_secs: u64,
    pub retention_days: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let upstream_base_url =
            env::var("UPSTREAM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let db_path = env::var("DB_PATH").unwrap_or_else(|_| "./battletrack.db3".into());

        let poll_interval_secs =
            parse_positive("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        let retention_days = parse_positive("RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?;

        Ok(Self {
            upstream_base_url,
            db_path,
            poll_interval_secs,
            retention_days,
        })
    }
}

fn parse_positive(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidNumber(name)),
        },
    }
}
