use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::query::DEFAULT_POPULAR_LIMIT;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Contents of `quotebook.toml`. Every field is optional; CLI flags win over the file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct QuotebookConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub popular_limit: Option<usize>,
}

impl QuotebookConfig {
    /// The config `init` writes
    pub fn starter() -> Self {
        Self {
            database: Some(default_database_path().display().to_string()),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            popular_limit: Some(DEFAULT_POPULAR_LIMIT),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn popular_limit(&self) -> usize {
        self.popular_limit.filter(|l| *l > 0).unwrap_or(DEFAULT_POPULAR_LIMIT)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("quotebook.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("quotebook.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<QuotebookConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: QuotebookConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &QuotebookConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("nope.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotebook.toml");

        let config = QuotebookConfig {
            database: Some("data/quotes.db".to_string()),
            port: Some(9000),
            ..Default::default()
        };
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.port(), 9000);
        assert_eq!(loaded.host(), DEFAULT_HOST);
        assert_eq!(loaded.popular_limit(), DEFAULT_POPULAR_LIMIT);
        assert_eq!(loaded.database_path(), PathBuf::from("data/quotes.db"));

        // Refuses to clobber without force
        assert!(write_config(&path, &QuotebookConfig::starter(), false).is_err());
        write_config(&path, &QuotebookConfig::starter(), true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().unwrap(), QuotebookConfig::starter());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotebook.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("quotes.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().exists());
    }
}
