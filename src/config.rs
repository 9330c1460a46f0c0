// src/config.rs

use crate::error::{MlogError, Result};
use crate::models::DEFAULT_CATEGORY;
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Which clock decides what "today" is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    #[default]
    Local,
    Utc,
}

impl DayBoundary {
    /// The only place the tool reads the wall clock for a calendar day.
    pub fn today(&self) -> NaiveDate {
        match self {
            DayBoundary::Local => Local::now().date_naive(),
            DayBoundary::Utc => Utc::now().date_naive(),
        }
    }
}

/// Settings from ~/.config/mlog/config.toml. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: Option<PathBuf>,

    #[serde(default)]
    pub day_boundary: DayBoundary,

    #[serde(default = "default_category")]
    pub default_category: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: None,
            day_boundary: DayBoundary::default(),
            default_category: default_category(),
            log_level: default_log_level(),
        }
    }
}

/// ~/.config/mlog
pub fn config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or(MlogError::HomeDirNotFound)?;
    Ok(home_dir.join(".config/mlog"))
}

impl Config {
    /// Loads the config file named by `MLOG_CONFIG`, or the default one.
    /// A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os("MLOG_CONFIG") {
            Some(p) => PathBuf::from(p),
            None => config_dir()?.join("config.toml"),
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
            .map_err(|e| MlogError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// `MLOG_DB` wins over the config file, which wins over the default location.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(p) = std::env::var_os("MLOG_DB") {
            return Ok(PathBuf::from(p));
        }
        match &self.database {
            Some(p) => Ok(p.clone()),
            None => Ok(config_dir()?.join("mission_log.db")),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.day_boundary.today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.day_boundary, DayBoundary::Local);
        assert_eq!(config.default_category, "General");
        assert_eq!(config.log_level, "warn");
        assert!(config.database.is_none());
    }

    #[test]
    fn reads_all_fields() {
        let config = Config::parse(
            r#"
            database = "/tmp/ml.db"
            day_boundary = "utc"
            default_category = "Work"
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.database, Some(PathBuf::from("/tmp/ml.db")));
        assert_eq!(config.day_boundary, DayBoundary::Utc);
        assert_eq!(config.default_category, "Work");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.default_category, "General");
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "day_boundary = \"mars\"").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, MlogError::Config(_)));
    }
}
