use crate::events::AppEvent;
use crate::sys::watch::FileWatch;
use async_channel::Sender;
use directories::ProjectDirs;
use orrery::DialConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON file with the ages to show. Falls back to the data directory, then the built-in
    /// catalog.
    pub catalog: Option<PathBuf>,
    pub dial: DialConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid dial settings: {0}")]
    Invalid(#[from] orrery::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("org", "aeon", "aeon").ok_or(ConfigError::ConfigDirNotFound)
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Layers the config file (if any) under `AEON_*` environment variables, e.g.
/// `AEON_DIAL__ORBIT__FAST_MULTIPLIER=2.5`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("AEON")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = s.try_deserialize()?;
    config.dial.validate()?;
    Ok(config)
}

pub fn load_or_default() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

fn watch_config() -> Result<FileWatch, ConfigError> {
    let config_path = get_config_path()?;
    Ok(FileWatch::new(&config_path)?)
}

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let watch = match watch_config() {
        Ok(w) => w,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };

    while watch.changed().await {
        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}
