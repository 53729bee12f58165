use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{archive, output};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub archive: ArchiveConfig,

    pub output: OutputConfig,

    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Emit logs as JSON lines instead of human readable text.
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub url: String,

    /// Where the downloaded ZIP is stored.
    pub archive_path: String,

    /// Directory the ZIP is unpacked into.
    pub extract_dir: String,

    pub user_agent: String,

    /// Connection timeout in seconds (default: 30)
    pub connect_timeout_seconds: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            url: archive::DEFAULT_URL.to_string(),
            archive_path: archive::DEFAULT_ARCHIVE_PATH.to_string(),
            extract_dir: ".".to_string(),
            user_agent: archive::DEFAULT_USER_AGENT.to_string(),
            connect_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub full_path: String,

    pub min_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            full_path: output::FULL_FILENAME.to_string(),
            min_path: output::MIN_FILENAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory holding the `AnimeDoc_<id>.xml` files.
    pub source_dir: String,

    /// Skip documents that fail to parse instead of aborting the run.
    pub skip_malformed: bool,

    /// Report progress every N documents (default: 1000)
    pub progress_interval: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_dir: archive::DEFAULT_SOURCE_DIR.to_string(),
            skip_malformed: false,
            progress_interval: 1000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("diorama").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".diorama").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes the default config to `path` unless a file already exists there.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.archive.url)
            .with_context(|| format!("Invalid archive URL: {}", self.archive.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Archive URL must use http or https: {url}");
        }

        if self.archive.archive_path.is_empty() {
            anyhow::bail!("archive.archive_path cannot be empty");
        }

        if self.batch.source_dir.is_empty() {
            anyhow::bail!("batch.source_dir cannot be empty");
        }

        if self.output.full_path.is_empty() || self.output.min_path.is_empty() {
            anyhow::bail!("Output paths cannot be empty");
        }

        if self.output.full_path == self.output.min_path {
            anyhow::bail!("output.full_path and output.min_path must differ");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.output.full_path, "anidb.json");
        assert_eq!(config.output.min_path, "anidb_min.json");
        assert_eq!(config.batch.source_dir, "Anime_HTTP");
        assert!(!config.batch.skip_malformed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[archive]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("[batch]"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [batch]
            skip_malformed = true
            "#,
        )
        .unwrap();
        assert!(config.batch.skip_malformed);
        assert_eq!(config.batch.progress_interval, 1000);
        assert_eq!(config.archive.url, archive::DEFAULT_URL);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.archive.url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.archive.url = "ftp://example.com/a.zip".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_same_outputs() {
        let mut config = Config::default();
        config.output.min_path = config.output.full_path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_create_default_if_missing() {
        let path = std::env::temp_dir()
            .join(format!("diorama-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        assert!(Config::create_default_if_missing(&path).unwrap());
        assert!(!Config::create_default_if_missing(&path).unwrap());

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.output.full_path, "anidb.json");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
