use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub service_name: String,
    pub otel_exporter_endpoint: Option<String>,
    pub metrics_port: u16,
    /// Language used when neither the user nor the `Language` setting has one
    pub default_language: String,
    pub business_hour_tick: Duration,
    pub activity_monitor_interval: Duration,
    /// Connected agents without activity for this long are considered idle
    pub agent_idle_timeout: Duration,
    pub routing_retry_interval: Duration,
    pub routing_method: String,
    pub enable_business_hours: bool,
    pub disable_activity_monitor: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            service_name: string("SERVICE_NAME", "omnidesk"),
            otel_exporter_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT"),
            metrics_port: parse(&lookup, "METRICS_PORT", 9000)?,
            default_language: string("DEFAULT_LANGUAGE", "en"),
            business_hour_tick: seconds(&lookup, "BUSINESS_HOUR_TICK_SECONDS", 60)?,
            activity_monitor_interval: seconds(&lookup, "ACTIVITY_MONITOR_INTERVAL_SECONDS", 60)?,
            agent_idle_timeout: seconds(&lookup, "AGENT_IDLE_TIMEOUT_SECONDS", 300)?,
            routing_retry_interval: seconds(&lookup, "ROUTING_RETRY_SECONDS", 5)?,
            routing_method: string("LIVECHAT_ROUTING_METHOD", "Auto_Selection"),
            enable_business_hours: parse(&lookup, "LIVECHAT_ENABLE_BUSINESS_HOURS", false)?,
            disable_activity_monitor: parse(&lookup, "LIVECHAT_DISABLE_ACTIVITY_MONITOR", false)?,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn seconds<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse(lookup, key, default)?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: "0".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
