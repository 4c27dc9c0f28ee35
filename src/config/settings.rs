//! Runtime settings read from the environment (`.env` is honoured via dotenvy).

use std::str::FromStr;

pub const DEFAULT_SCHEMA: &str = "hbnb";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// PostgreSQL URL. Without one, entities live in memory for the life of the process.
    pub database_url: Option<String>,
    pub schema: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: None,
            schema: DEFAULT_SCHEMA.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Settings {
            database_url: non_empty("DATABASE_URL"),
            schema: non_empty("HBNB_SCHEMA").unwrap_or(defaults.schema),
            bind_addr: non_empty("HBNB_BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse_or(
                "HBNB_MAX_CONNECTIONS",
                non_empty("HBNB_MAX_CONNECTIONS"),
                defaults.max_connections,
            ),
            body_limit: parse_or("HBNB_BODY_LIMIT", non_empty("HBNB_BODY_LIMIT"), defaults.body_limit),
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            tracing::warn!("{}: invalid value '{}', using {}", key, s, default);
            default
        }),
    }
}
