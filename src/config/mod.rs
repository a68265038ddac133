use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";
const DEFAULT_ALLOWED_ORIGINS: &str = "https://seanyang.me,https://www.seanyang.me";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub service_name: String,
    // 0 or negative means unlimited
    pub cat_hourly_limit: i64,
    pub poke_hourly_limit: i64,
    pub cat_store_file: PathBuf,
    pub rate_limit_store_file: PathBuf,
    pub pushover_api_token: Option<String>,
    pub pushover_user_key: Option<String>,
    pub pushover_api_url: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset or blank keys take
    /// their defaults; set keys that fail to parse are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse(&get, "SERVER_PORT", 5000)?,
            service_name: get("SERVICE_NAME").unwrap_or_else(|| "api.seanyang.me".into()),
            cat_hourly_limit: parse(&get, "CAT_HOURLY_LIMIT", 100)?,
            poke_hourly_limit: parse(&get, "POKE_HOURLY_LIMIT", 60)?,
            cat_store_file: get("CAT_STORE_FILE")
                .unwrap_or_else(|| "data/.cat_clicks.json".into())
                .into(),
            rate_limit_store_file: get("RATE_LIMIT_STORE_FILE")
                .unwrap_or_else(|| "data/.rate_limits.json".into())
                .into(),
            pushover_api_token: get("PUSHOVER_API_TOKEN"),
            pushover_user_key: get("PUSHOVER_USER_KEY"),
            pushover_api_url: get("PUSHOVER_API_URL")
                .unwrap_or_else(|| DEFAULT_PUSHOVER_API_URL.into()),
            allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.into())
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
