//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use postline_core::TimelineConfig;

#[cfg(feature = "postgres")]
use postline_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use postline_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub timeline: TimelineConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: env::var("REDIS_URL").ok().map(|_| RedisConfig::from_env()),
            timeline: timeline_from_env(),
        }
    }
}

/// Timeline tuning from `TIMELINE_*` variables, defaulting field by field.
///
/// `TIMELINE_CALL_TIMEOUT_MS=0` disables the per-call deadline.
fn timeline_from_env() -> TimelineConfig {
    let defaults = TimelineConfig::default();

    let cache_ttl = parse_var::<u64>("TIMELINE_CACHE_TTL_SECS")
        .map(Duration::from_secs)
        .unwrap_or(defaults.cache_ttl);
    let max_limit = parse_var::<usize>("TIMELINE_MAX_LIMIT")
        .filter(|max| *max > 0)
        .unwrap_or(defaults.max_limit);
    let default_limit = parse_var::<usize>("TIMELINE_DEFAULT_LIMIT")
        .unwrap_or(defaults.default_limit)
        .min(max_limit);
    let call_timeout = match parse_var::<u64>("TIMELINE_CALL_TIMEOUT_MS") {
        Some(0) => None,
        Some(ms) => Some(Duration::from_millis(ms)),
        None => defaults.call_timeout,
    };

    TimelineConfig {
        cache_ttl,
        default_limit,
        max_limit,
        call_timeout,
        ..defaults
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}
