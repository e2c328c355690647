use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";
pub const DEFAULT_EXPORT_PATH: &str = "export.csv";

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PricesConfig {
    pub path: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportConfig {
    pub path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            path: DEFAULT_EXPORT_PATH.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CalculationConfig {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub prices: PricesConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub calculation: CalculationConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "idxm", "idxm")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.base_dir = path.as_ref().parent().map(Path::to_path_buf);
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Resolves `path` against the config file's directory when relative.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn prices_path(&self) -> PathBuf {
        self.resolve(Path::new(&self.prices.path))
    }

    pub fn export_path(&self) -> PathBuf {
        self.resolve(Path::new(&self.export.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
prices:
  path: "data_sources/stock_prices.csv"
  date_format: "%Y-%m-%d"
export:
  path: "out/index.csv"
calculation:
  start_date: 2020-01-01
  end_date: "2020-12-31"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.prices.path, "data_sources/stock_prices.csv");
        assert_eq!(config.prices.date_format, "%Y-%m-%d");
        assert_eq!(config.export.path, "out/index.csv");
        assert_eq!(
            config.calculation.start_date,
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
        assert_eq!(
            config.calculation.end_date,
            NaiveDate::from_ymd_opt(2020, 12, 31)
        );
        assert!(config.base_dir.is_none());
    }

    #[test]
    fn test_config_defaults() {
        let yaml_str = r#"
prices:
  path: "prices.csv"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.prices.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(config.export.path, DEFAULT_EXPORT_PATH);
        assert!(config.calculation.start_date.is_none());
        assert!(config.calculation.end_date.is_none());
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.yaml");
        fs::write(
            &config_path,
            "prices:\n  path: data/prices.csv\nexport:\n  path: /tmp/index.csv\n",
        )?;

        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(config.prices_path(), dir.path().join("data/prices.csv"));
        assert_eq!(config.export_path(), PathBuf::from("/tmp/index.csv"));
        Ok(())
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = AppConfig::load_from_path("/nonexistent/config.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
