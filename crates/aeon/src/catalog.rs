use crate::config::{AppConfig, project_dirs};
use crate::events::AppEvent;
use crate::sys::watch::FileWatch;
use async_channel::Sender;
use orrery::Category;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CATALOG: &str = include_str!("default_catalog.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configured catalog file, else `catalog.json` in the data directory.
pub fn catalog_path(config: &AppConfig) -> Option<PathBuf> {
    config.catalog.clone().or_else(|| {
        project_dirs()
            .ok()
            .map(|dirs| dirs.data_dir().join("catalog.json"))
    })
}

pub fn parse_catalog(json: &str) -> Result<Vec<Category>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_catalog(path: &Path) -> Result<Vec<Category>, CatalogError> {
    parse_catalog(&fs_err::read_to_string(path)?)
}

pub fn default_catalog() -> Vec<Category> {
    parse_catalog(DEFAULT_CATALOG).unwrap_or_else(|e| {
        log::error!("Built-in catalog is broken: {}", e);
        Vec::new()
    })
}

/// Catalog from `path` when it exists, otherwise the built-in nine ages. A file that exists
/// but fails to load yields `None`, so the caller keeps whatever it shows now.
pub fn load_or_default(path: Option<&Path>) -> Option<Vec<Category>> {
    match path {
        Some(path) if path.exists() => match load_catalog(path) {
            Ok(ages) => {
                log::info!("Loaded {} ages from {}", ages.len(), path.display());
                Some(ages)
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                None
            }
        },
        _ => Some(default_catalog()),
    }
}

/// First catalog sent to the dial. Nothing is showing yet, so a broken file yields an empty
/// catalog rather than leaving the loading placeholder up.
pub fn initial_catalog(path: Option<&Path>) -> Vec<Category> {
    load_or_default(path).unwrap_or_default()
}

/// Sends the catalog once, then again every time the file changes.
pub async fn run_catalog_service(path: Option<PathBuf>, tx: Sender<AppEvent>) {
    let ages = initial_catalog(path.as_deref());
    if tx.send(AppEvent::CatalogLoaded(ages)).await.is_err() {
        return;
    }

    let Some(path) = path else {
        return;
    };
    let watch = match FileWatch::new(&path) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to watch {}: {}", path.display(), e);
            return;
        }
    };

    while watch.changed().await {
        if let Some(ages) = load_or_default(Some(&path))
            && tx.send(AppEvent::CatalogLoaded(ages)).await.is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery::CategoryId;

    #[test]
    fn test_builtin_catalog_has_nine_ages() {
        let ages = default_catalog();
        assert_eq!(ages.len(), 9);
        assert_eq!(ages[0].id, CategoryId::from("first-age"));
        assert_eq!(ages[2].label(), "Rise of Humanity");
        assert_eq!(ages[8].subtitle(), "6000 – ∞");
    }

    #[test]
    fn test_malformed_catalog_is_an_error() {
        assert!(matches!(
            parse_catalog(r#"[{"age_number": 1}]"#),
            Err(CatalogError::Parse(_))
        ));
        assert!(parse_catalog("[]").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let path = std::env::temp_dir().join("aeon-catalog-that-does-not-exist.json");
        assert_eq!(load_or_default(Some(&path)).map(|a| a.len()), Some(9));
        assert_eq!(load_or_default(None).map(|a| a.len()), Some(9));
        assert_eq!(initial_catalog(Some(&path)).len(), 9);
    }

    #[test]
    fn test_broken_file_keeps_current_catalog() {
        let path = std::env::temp_dir().join(format!("aeon-broken-{}.json", std::process::id()));
        fs_err::write(&path, "{ not json").unwrap();
        assert!(load_or_default(Some(&path)).is_none());
        assert!(initial_catalog(Some(&path)).is_empty());

        fs_err::write(&path, r#"[{"id": "x", "age_number": 4, "title": "Solo"}]"#).unwrap();
        let ages = load_or_default(Some(&path)).unwrap();
        assert_eq!(ages[0].label(), "Solo");
        fs_err::remove_file(&path).unwrap();
    }
}
