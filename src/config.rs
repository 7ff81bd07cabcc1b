use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_VACANCY_URL: &str = "https://statejobs.ny.gov/employees/vacancyTable.cfm?searchResults=Yes&Keywords=&title=&JurisClassID=&AgID=&isnyhelp=&minDate=&maxDate=&employmentType=&gradeCompareType=GT&grade=&SalMin=";
pub const DEFAULT_DETAIL_URL: &str = "https://statejobs.ny.gov/employees/vacancyDetailsPrint.cfm";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JOBS_HTTP_TIMEOUT_SECS must be a positive number of seconds, got '{0}'")]
    InvalidTimeout(String),
}

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub vacancy_url: String,
    pub detail_url: String,
    pub http_timeout: Duration,
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_raw = env::var("JOBS_HTTP_TIMEOUT_SECS").ok();
        let http_timeout = match timeout_raw {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
            vacancy_url: env_or("JOBS_VACANCY_URL", DEFAULT_VACANCY_URL),
            detail_url: env_or("JOBS_DETAIL_URL", DEFAULT_DETAIL_URL),
            http_timeout,
            data_dir: PathBuf::from(env_or("JOBS_DATA_DIR", ".")),
            log_level: env_or("JOBS_LOG_LEVEL", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
