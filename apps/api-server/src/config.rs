//! Application configuration loaded from environment variables.

use std::env;

use agora_infra::JwtConfig;
use agora_infra::database::{DatabaseConfig, SecondaryDbConfig};

/// Route groups mounted by this process, selected with `SERVICES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledServices {
    pub comments: bool,
    pub posts: bool,
    pub likes: bool,
}

impl Default for EnabledServices {
    fn default() -> Self {
        Self {
            comments: true,
            posts: true,
            likes: true,
        }
    }
}

impl EnabledServices {
    /// Parse a comma separated list such as `comments,likes`.
    /// Unknown names are logged and skipped; an empty list enables everything.
    pub fn parse(raw: &str) -> Self {
        let mut enabled = Self {
            comments: false,
            posts: false,
            likes: false,
        };
        let mut any = false;

        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.to_lowercase().as_str() {
                "comments" => enabled.comments = true,
                "posts" => enabled.posts = true,
                "likes" => enabled.likes = true,
                other => {
                    tracing::warn!(service = other, "Unknown service in SERVICES, ignoring");
                    continue;
                }
            }
            any = true;
        }

        if any { enabled } else { Self::default() }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub services: EnabledServices,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|main_url| DatabaseConfig {
            main_url,
            main_max_connections: env_parse("DB_MAX_CONNECTIONS", 100),
            main_min_connections: env_parse("DB_MIN_CONNECTIONS", 10),
            secondary_databases: Self::parse_secondary_databases(),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("PORT", 8080),
            services: env::var("SERVICES")
                .map(|raw| EnabledServices::parse(&raw))
                .unwrap_or_default(),
            database,
            jwt: JwtConfig::from_env(),
        }
    }

    /// Format: SECONDARY_DB_<NAME>=<URL>,<MAX_CONNECTIONS>
    /// Example: SECONDARY_DB_USERS=postgres://...,10
    fn parse_secondary_databases() -> Vec<SecondaryDbConfig> {
        env::vars()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix("SECONDARY_DB_")?;
                SecondaryDbConfig::parse(name, &value)
            })
            .collect()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
