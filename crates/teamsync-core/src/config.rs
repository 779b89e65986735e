use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TeamsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsConfig {
    #[serde(default = "default_active_team")]
    pub active: String,
    #[serde(default = "default_emeritus_team")]
    pub emeritus: String,
}

fn default_active_team() -> String {
    "editorial-board".to_string()
}

fn default_emeritus_team() -> String {
    "emeritus-editors".to_string()
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            active: default_active_team(),
            emeritus: default_emeritus_team(),
        }
    }
}

// ---------------------------------------------------------------------------
// GitHubConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_graphql_url() -> String {
    "https://api.github.com/graphql".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            graphql_url: default_graphql_url(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// PackagesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesConfig {
    /// Repository holding the catalog, as `owner/name`.
    #[serde(default = "default_package_repository")]
    pub repository: String,
    /// Path of the catalog file inside the repository.
    #[serde(default = "default_package_path")]
    pub path: String,
}

fn default_package_repository() -> String {
    "pyOpenSci/pyopensci.github.io".to_string()
}

fn default_package_path() -> String {
    "_data/packages.yml".to_string()
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            repository: default_package_repository(),
            path: default_package_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default)]
    pub teams: TeamsConfig,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Accounts never written to a roster (bots, org admins).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub packages: PackagesConfig,
    /// Optional YAML file overriding the default chart theme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

fn default_organization() -> String {
    "pyOpenSci".to_string()
}

fn default_data_dir() -> String {
    paths::DEFAULT_DATA_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            teams: TeamsConfig::default(),
            data_dir: default_data_dir(),
            exclude: Vec::new(),
            github: GitHubConfig::default(),
            packages: PackagesConfig::default(),
            theme: None,
        }
    }
}

impl Config {
    /// Load `teamsync.yaml` from `root`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.organization.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "organization is empty".to_string(),
            });
        }

        if self.teams.active.eq_ignore_ascii_case(&self.teams.emeritus) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "active and emeritus teams are both '{}'",
                    self.teams.active
                ),
            });
        }

        if crate::github::split_repository(&self.packages.repository).is_err() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "packages.repository '{}' is not in owner/name form",
                    self.packages.repository
                ),
            });
        }

        if self.github.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "github.timeout_secs is 0; requests will never time out".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
