use std::{env, path::Path};

use anyhow::{bail, Context};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use shared::pagination::DEFAULT_PAGE_SIZE;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
    pub page_size: u32,
    pub default_locale: String,
    pub locales: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/directory.db".into(),
            page_size: DEFAULT_PAGE_SIZE,
            default_locale: "en".into(),
            locales: ["en", "cn", "tw", "de", "es", "fr", "jp", "pt", "ru"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_body_bytes: 16 * 1024,
        }
    }
}

/// Defaults, then `server.toml`, then `APP__*` variables. The bare
/// `SERVER_BIND` and `DATABASE_URL` variables apply when their `APP__`
/// counterparts are unset.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = build_settings(
        Path::new(SETTINGS_FILE),
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("locales"),
    )?;

    if env::var("APP__BIND_ADDR").is_err() {
        if let Ok(v) = env::var("SERVER_BIND") {
            settings.bind_addr = v;
        }
    }
    if env::var("APP__DATABASE_URL").is_err() {
        if let Ok(v) = env::var("DATABASE_URL") {
            settings.database_url = v;
        }
    }

    Ok(settings)
}

fn build_settings(file: &Path, environment: Environment) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let mut settings: Settings = Config::builder()
        .set_default("bind_addr", defaults.bind_addr)?
        .set_default("database_url", defaults.database_url)?
        .set_default("page_size", i64::from(defaults.page_size))?
        .set_default("default_locale", defaults.default_locale)?
        .set_default("locales", defaults.locales)?
        .set_default("max_body_bytes", defaults.max_body_bytes as i64)?
        .add_source(File::from(file).format(FileFormat::Toml).required(false))
        .add_source(environment)
        .build()
        .with_context(|| format!("failed to read settings from '{}'", file.display()))?
        .try_deserialize()
        .context("invalid settings")?;

    if settings.page_size == 0 {
        bail!("page_size must be at least 1");
    }
    settings.locales.retain(|l| !l.trim().is_empty());
    if !settings.locales.contains(&settings.default_locale) {
        settings.locales.push(settings.default_locale.clone());
    }
    Ok(settings)
}

/// Accepts plain file paths as well as `sqlite:` URLs. The storage layer
/// creates the parent directory when it opens the pool.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
