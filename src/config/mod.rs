use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod template;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Taxonomy template file
    #[serde(default = "default_template_path")]
    pub template: PathBuf,
    /// Ordered list of playlist locations
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total request timeout per source
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Number of sources fetched at the same time
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_m3u_path")]
    pub m3u_path: PathBuf,
    #[serde(default = "default_txt_path")]
    pub txt_path: PathBuf,
    /// Word used in the `『<label><n>』` mirror suffix
    #[serde(default = "default_line_label")]
    pub line_label: String,
    /// Rendered into the `x-tvg-url` header attribute
    #[serde(default = "default_epg_url")]
    pub epg_url: String,
    /// Optional JSON run report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

fn default_template_path() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE_PATH)
}
fn default_sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
}
fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}
fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}
fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_m3u_path() -> PathBuf {
    PathBuf::from(DEFAULT_M3U_OUTPUT)
}
fn default_txt_path() -> PathBuf {
    PathBuf::from(DEFAULT_TXT_OUTPUT)
}
fn default_line_label() -> String {
    DEFAULT_LINE_LABEL.to_string()
}
fn default_epg_url() -> String {
    DEFAULT_EPG_URL.to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            m3u_path: default_m3u_path(),
            txt_path: default_txt_path(),
            line_label: default_line_label(),
            epg_url: default_epg_url(),
            report_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: default_template_path(),
            sources: default_sources(),
            fetch: FetchConfig::default(),
            matching: MatchingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration file, writing a starter file with the defaults
    /// when it does not exist yet. Call [`Config::validate`] once any
    /// overrides have been applied.
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        let config = if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Self::from_toml(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)
                .map_err(|e| AppError::configuration(format!("Failed to render defaults: {e}")))?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
            default_config
        };

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> AppResult<Self> {
        toml::from_str(contents)
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {e}")))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::configuration(
                "fetch.max_concurrent must be at least 1",
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::configuration(
                "fetch.timeout_secs must be at least 1",
            ));
        }
        if self.output.m3u_path == self.output.txt_path {
            return Err(AppError::configuration(
                "output.m3u_path and output.txt_path must differ",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
template = "my/template.txt"
sources = ["http://a.example/list.m3u", ""]

[fetch]
max_concurrent = 2
"#,
        )
        .unwrap();

        assert_eq!(config.template, PathBuf::from("my/template.txt"));
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.fetch.max_concurrent, 2);
        assert_eq!(config.fetch.timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert!(!config.matching.case_insensitive);
        assert_eq!(config.output.m3u_path, PathBuf::from(DEFAULT_M3U_OUTPUT));
        assert_eq!(config.output.line_label, DEFAULT_LINE_LABEL);
        assert!(config.output.report_path.is_none());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.sources.len(), DEFAULT_SOURCES.len());
        assert_eq!(config.fetch.max_concurrent, 5);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(120));
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.fetch.max_concurrent = 0;
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml("sources = 12").is_err());
    }

    #[test]
    fn test_load_defers_validation_to_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregator.toml");
        std::fs::write(&path, "[fetch]\nmax_concurrent = 0\n").unwrap();

        let mut config = Config::load_from_file(&path).unwrap();
        assert!(config.validate().is_err());

        // A command-line override fixes the file value
        config.fetch.max_concurrent = 3;
        config.validate().unwrap();
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregator.toml");

        let config = Config::load_from_file(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.fetch.max_concurrent, DEFAULT_MAX_CONCURRENT_FETCHES);

        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded.sources, config.sources);
    }
}
