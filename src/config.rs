use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::SweepError;

/// Main configuration structure for reposweep
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Path to the whitelist file listing repositories to keep
    #[serde(default = "default_whitelist_path")]
    pub whitelist_path: String,

    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

// Default value functions
fn default_whitelist_path() -> String {
    ".github/repo-whitelist.yml".to_string()
}
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_user_agent() -> String {
    "GitHub-Repo-Cleanup".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            whitelist_path: default_whitelist_path(),
            github: GitHubConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to built-in defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            debug!("No configuration at {:?}, using defaults", config_path);
            let mut config = Self::default();
            config.expand_paths()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        // Expand environment variables in paths
        config.expand_paths()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("reposweep").join("config.yml"))
    }

    /// Expand environment variables and `~` in configuration paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.whitelist_path = shellexpand::full(&self.whitelist_path)
            .context("Failed to expand whitelist_path")?
            .into_owned();

        Ok(())
    }

    /// Whitelist location as a path
    pub fn whitelist_path(&self) -> PathBuf {
        PathBuf::from(&self.whitelist_path)
    }
}

/// Whether deletions are simulated or performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Compute and report the partition, delete nothing
    DryRun,
    /// Delete every repository in the delete partition
    Execute,
}

impl RunMode {
    /// Resolve the mode from the `--dry-run` flag and the `DRY_RUN` environment value.
    ///
    /// Only the exact string `"true"` in the environment enables a dry run.
    pub fn resolve(dry_run_flag: bool, dry_run_env: Option<&str>) -> Self {
        if dry_run_flag || dry_run_env == Some("true") {
            Self::DryRun
        } else {
            Self::Execute
        }
    }

    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DryRun => "DRY RUN",
            Self::Execute => "DELETE",
        }
    }
}

/// Per-run settings, resolved once before anything is deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: RunMode,
    pub whitelist_path: PathBuf,
}

/// Opaque GitHub access token
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, rejecting empty values
    pub fn new(token: impl Into<String>) -> Result<Self, SweepError> {
        let token = token.into().trim().to_string();

        if token.is_empty() {
            return Err(SweepError::auth("access token is empty"));
        }

        const KNOWN_PREFIXES: [&str; 5] = ["ghp_", "gho_", "ghs_", "ghu_", "github_pat_"];
        if !KNOWN_PREFIXES.iter().any(|prefix| token.starts_with(prefix)) {
            warn!("Token doesn't look like a GitHub token (expected a ghp_, gho_, ghs_, ghu_ or github_pat_ prefix)");
        }

        Ok(Self(token))
    }

    /// Read the token from the named environment variable
    pub fn from_env(var: &str) -> Result<Self, SweepError> {
        debug!("Reading access token from {}", var);

        let token = std::env::var(var)
            .map_err(|_| SweepError::auth(format!("{} environment variable is required", var)))?;

        Self::new(token)
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}
