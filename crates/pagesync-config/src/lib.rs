//! Configuration management for pagesync.
//!
//! Parses `pagesync.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. The configuration file
//! 3. Environment variables: `CONFLUENCE_BASE_URL`, `CONFLUENCE_PARENT_ID`,
//!    `ATLASSIAN_USERNAME`, `ATLASSIAN_API_TOKEN`, `FOLDER_TO_PUBLISH`
//! 4. CLI settings passed to [`Config::load`] via [`CliSettings`]
//!
//! ## Environment Variable Expansion
//!
//! String values in the file support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use expand::EnvExpander;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pagesync.toml";

/// Folder (relative to the source directory) whose notes are published.
const DEFAULT_FOLDER: &str = "Confluence Pages";

/// Number of documents published in parallel.
const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound for `publish.concurrency`.
const MAX_CONCURRENCY: usize = 64;

/// CLI settings that override configuration file and environment values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override parent page ID.
    pub parent_id: Option<String>,
    /// Override Atlassian user name (e-mail).
    pub user_name: Option<String>,
    /// Override Atlassian API token.
    pub api_token: Option<String>,
    /// Override the folder to publish.
    pub folder: Option<String>,
    /// Override the source (vault root) directory.
    pub source_dir: Option<PathBuf>,
    /// Override the number of parallel publish workers.
    pub concurrency: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings as layered so far (possibly incomplete).
    confluence: ConfluenceConfigRaw,
    /// Publish settings as parsed from TOML (paths are relative strings).
    publish: PublishConfigRaw,

    /// Resolved publish configuration (set after loading).
    #[serde(skip)]
    pub publish_resolved: PublishConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw Confluence configuration; every field may come from a different layer.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfluenceConfigRaw {
    base_url: Option<String>,
    parent_id: Option<String>,
    user_name: Option<String>,
    api_token: Option<String>,
}

/// Raw publish configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PublishConfigRaw {
    source_dir: Option<String>,
    folder: Option<String>,
    concurrency: Option<usize>,
}

/// Resolved publish configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Vault root. Binary lookups never leave this directory.
    pub source_dir: PathBuf,
    /// Folder (relative to `source_dir`) whose notes are published.
    pub folder: String,
    /// Number of documents published in parallel.
    pub concurrency: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            folder: DEFAULT_FOLDER.to_owned(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl PublishConfig {
    /// Absolute path of the folder to publish.
    #[must_use]
    pub fn folder_path(&self) -> PathBuf {
        self.source_dir.join(&self.folder)
    }
}

/// Validated Confluence configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfluenceConfig {
    /// Confluence Cloud base URL (e.g. `https://example.atlassian.net`).
    pub base_url: String,
    /// ID of the page new pages are created under.
    pub parent_id: String,
    /// Atlassian account e-mail.
    pub user_name: String,
    /// Atlassian API token.
    pub api_token: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`ATLASSIAN_API_TOKEN`} not set").
        message: String,
    },
}

/// Require an optional string field to be present and non-empty.
fn require_present<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ConfigError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Validation(format!("{field} is required"))),
    }
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file, environment and optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pagesync.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        config.apply_env(|name| std::env::var(name).ok());

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using the given lookup function.
    ///
    /// Empty values are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = get("CONFLUENCE_BASE_URL") {
            self.confluence.base_url = Some(v);
        }
        if let Some(v) = get("CONFLUENCE_PARENT_ID") {
            self.confluence.parent_id = Some(v);
        }
        if let Some(v) = get("ATLASSIAN_USERNAME") {
            self.confluence.user_name = Some(v);
        }
        if let Some(v) = get("ATLASSIAN_API_TOKEN") {
            self.confluence.api_token = Some(v);
        }
        if let Some(v) = get("FOLDER_TO_PUBLISH") {
            self.publish_resolved.folder = v;
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let confluence = &mut self.confluence;
        if let Some(base_url) = &settings.base_url {
            confluence.base_url = Some(base_url.clone());
        }
        if let Some(parent_id) = &settings.parent_id {
            confluence.parent_id = Some(parent_id.clone());
        }
        if let Some(user_name) = &settings.user_name {
            confluence.user_name = Some(user_name.clone());
        }
        if let Some(api_token) = &settings.api_token {
            confluence.api_token = Some(api_token.clone());
        }
        if let Some(folder) = &settings.folder {
            self.publish_resolved.folder.clone_from(folder);
        }
        if let Some(source_dir) = &settings.source_dir {
            self.publish_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(concurrency) = settings.concurrency {
            self.publish_resolved.concurrency = concurrency;
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first missing or invalid field.
    pub fn require_confluence(&self) -> Result<ConfluenceConfig, ConfigError> {
        let raw = &self.confluence;
        let base_url = require_present(raw.base_url.as_deref(), "confluence.base_url")?;
        require_http_url(base_url, "confluence.base_url")?;
        let parent_id = require_present(raw.parent_id.as_deref(), "confluence.parent_id")?;
        let user_name = require_present(raw.user_name.as_deref(), "confluence.user_name")?;
        let api_token = require_present(raw.api_token.as_deref(), "confluence.api_token")?;

        Ok(ConfluenceConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            parent_id: parent_id.to_owned(),
            user_name: user_name.to_owned(),
            api_token: api_token.to_owned(),
        })
    }

    /// Validate publish configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let publish = &self.publish_resolved;
        if publish.folder.is_empty() {
            return Err(ConfigError::Validation(
                "publish.folder cannot be empty".to_owned(),
            ));
        }
        if publish.concurrency == 0 {
            return Err(ConfigError::Validation(
                "publish.concurrency must be greater than 0".to_owned(),
            ));
        }
        if publish.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Validation(format!(
                "publish.concurrency cannot exceed {MAX_CONCURRENCY}"
            )));
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            confluence: ConfluenceConfigRaw::default(),
            publish: PublishConfigRaw::default(),
            publish_resolved: PublishConfig {
                source_dir: base.to_path_buf(),
                ..PublishConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let env = EnvExpander::new(|name| std::env::var(name).ok());
        let confluence = &mut self.confluence;
        env.field(&mut confluence.base_url, "confluence.base_url")?;
        env.field(&mut confluence.parent_id, "confluence.parent_id")?;
        env.field(&mut confluence.user_name, "confluence.user_name")?;
        env.field(&mut confluence.api_token, "confluence.api_token")?;
        env.field(&mut self.publish.source_dir, "publish.source_dir")?;
        env.field(&mut self.publish.folder, "publish.folder")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let source_dir = self
            .publish
            .source_dir
            .as_deref()
            .map_or_else(|| config_dir.to_path_buf(), |dir| config_dir.join(dir));

        self.publish_resolved = PublishConfig {
            source_dir,
            folder: self
                .publish
                .folder
                .clone()
                .unwrap_or_else(|| DEFAULT_FOLDER.to_owned()),
            concurrency: self.publish.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
        };
    }
}
