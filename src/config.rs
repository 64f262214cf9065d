use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }

    /// Stage and prod ship logs to a collector, so they log JSON lines.
    #[must_use]
    pub fn wants_json_logs(self) -> bool {
        matches!(self, Self::Stage | Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub db_pool_max: u32,
    pub db_connect_timeout_seconds: u64,
    pub db_acquire_timeout_seconds: u64,

    // API settings
    pub api_host: String,
    pub api_port: u16,
    pub request_timeout_seconds: u64,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_read_per_second: u64,
    pub rate_limit_read_burst: u32,
    pub rate_limit_write_per_second: u64,
    pub rate_limit_write_burst: u32,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Configuration with every optional setting at its default.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            db_pool_max: 10,
            db_connect_timeout_seconds: 5,
            db_acquire_timeout_seconds: 5,
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            request_timeout_seconds: 30,
            disable_rate_limiting: false,
            rate_limit_read_per_second: 10,
            rate_limit_read_burst: 100,
            rate_limit_write_per_second: 5,
            rate_limit_write_burst: 50,
            deployment: Deployment::Local,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `DATABASE_URL` is not set and
    /// `ConfigError::Invalid` if a numeric or boolean setting does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let defaults = Self::new(database_url);

        Ok(Self {
            // Database
            db_pool_max: env_or("DB_POOL_MAX", defaults.db_pool_max)?,
            db_connect_timeout_seconds: env_or(
                "DB_CONNECT_TIMEOUT_SECONDS",
                defaults.db_connect_timeout_seconds,
            )?,
            db_acquire_timeout_seconds: env_or(
                "DB_ACQUIRE_TIMEOUT_SECONDS",
                defaults.db_acquire_timeout_seconds,
            )?,

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| defaults.api_host.clone()),
            api_port: env_or("API_PORT", defaults.api_port)?,
            request_timeout_seconds: env_or(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )?,

            // Rate limiting
            disable_rate_limiting: env_or("DISABLE_RATE_LIMITING", defaults.disable_rate_limiting)?,
            rate_limit_read_per_second: env_or(
                "RATE_LIMIT_READ_PER_SECOND",
                defaults.rate_limit_read_per_second,
            )?,
            rate_limit_read_burst: env_or("RATE_LIMIT_READ_BURST", defaults.rate_limit_read_burst)?,
            rate_limit_write_per_second: env_or(
                "RATE_LIMIT_WRITE_PER_SECOND",
                defaults.rate_limit_write_per_second,
            )?,
            rate_limit_write_burst: env_or(
                "RATE_LIMIT_WRITE_BURST",
                defaults.rate_limit_write_burst,
            )?,

            // Application metadata
            deployment: Deployment::from_name(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),

            ..defaults
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => parse_setting(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_setting<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_expectations() {
        let cfg = Config::new("sqlite::memory:");
        assert_eq!(cfg.api_port, 8000);
        assert_eq!(cfg.bind_address(), "0.0.0.0:8000");
        assert!(!cfg.disable_rate_limiting);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn parse_setting_accepts_padded_numbers() {
        let port: u16 = parse_setting("API_PORT", " 9000 ").unwrap();
        assert_eq!(port, 9000);
        let flag: bool = parse_setting("DISABLE_RATE_LIMITING", "true").unwrap();
        assert!(flag);
    }

    #[test]
    fn parse_setting_rejects_garbage() {
        let err = parse_setting::<u16>("API_PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn deployment_names() {
        assert_eq!(Deployment::from_name("Production"), Deployment::Prod);
        assert_eq!(Deployment::from_name("staging"), Deployment::Stage);
        assert_eq!(Deployment::from_name("whatever"), Deployment::Local);
        assert!(Deployment::Prod.wants_json_logs());
        assert!(!Deployment::Dev.wants_json_logs());
    }
}
