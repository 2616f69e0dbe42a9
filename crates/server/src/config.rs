use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;

const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub server_bind: String,
    pub database_url: String,
    pub environment: Environment,
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:3000".into(),
            database_url: storage::DEFAULT_DATABASE_URL.into(),
            environment: Environment::Development,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Optional keys of `server.toml`.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    environment: Option<String>,
    max_body_bytes: Option<usize>,
}

pub fn load_settings() -> ServerSettings {
    load_settings_from(Path::new("server.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then environment variables. Later
/// sources win; within a group the `APP__` form wins over the plain one.
pub(crate) fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ServerSettings {
    let mut settings = ServerSettings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(env) = file_cfg.environment.as_deref().and_then(Environment::parse) {
                    settings.environment = env;
                }
                if let Some(v) = file_cfg.max_body_bytes {
                    settings.max_body_bytes = v;
                }
            }
            Err(error) => {
                warn!(path = %config_path.display(), %error, "ignoring unreadable config file")
            }
        }
    }

    if let Some(port) = env("PORT").and_then(|v| v.trim().parse::<u16>().ok()) {
        settings.server_bind = format!("0.0.0.0:{port}");
    }
    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(dir) = env("DB_PATH").filter(|v| !v.trim().is_empty()) {
        let dir = dir.trim().trim_end_matches(['/', '\\']);
        settings.database_url = format!("sqlite://{dir}/database.sqlite");
    }
    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("NODE_ENV").as_deref().and_then(Environment::parse) {
        settings.environment = v;
    }
    if let Some(v) = env("APP__ENV").as_deref().and_then(Environment::parse) {
        settings.environment = v;
    }

    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        match v.trim().parse::<usize>() {
            Ok(parsed) if parsed > 0 => settings.max_body_bytes = parsed,
            _ => warn!(value = %v, "APP__MAX_BODY_BYTES must be a positive integer"),
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
