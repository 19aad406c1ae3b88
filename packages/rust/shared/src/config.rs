//! Application configuration for repofrag.
//!
//! User config lives at `~/.repofrag/repofrag.toml` and is optional.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RepofragError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "repofrag.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".repofrag";

/// Summary used in the payload when the fragments document carries none.
pub const DEFAULT_FALLBACK_SUMMARY: &str = "Backend Spring Boot + PostgreSQL (inferred)";

// ---------------------------------------------------------------------------
// Config structs (matching repofrag.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fragment extraction settings.
    #[serde(default)]
    pub extract: ExtractSection,

    /// Payload building settings.
    #[serde(default)]
    pub payload: PayloadSection,
}

/// `[extract]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSection {
    /// Maximum characters kept per excerpt.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Files larger than this are skipped during the tree walk.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Exact file names captured at the root and anywhere in the walk.
    #[serde(default = "default_priority_files")]
    pub priority_files: Vec<String>,

    /// File name suffixes captured during the walk.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names whose subtrees are never captured.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            max_file_bytes: default_max_file_bytes(),
            priority_files: default_priority_files(),
            extensions: default_extensions(),
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

fn default_max_chars() -> usize {
    2000
}
fn default_max_file_bytes() -> u64 {
    200_000
}
fn default_priority_files() -> Vec<String> {
    ["pom.xml", "Dockerfile", "docker-compose.yml"]
        .map(String::from)
        .to_vec()
}
fn default_extensions() -> Vec<String> {
    [".java", ".xml", ".yml", ".yaml", ".properties", ".md"]
        .map(String::from)
        .to_vec()
}
fn default_excluded_dirs() -> Vec<String> {
    ["target", ".git", "node_modules", ".venv"]
        .map(String::from)
        .to_vec()
}

/// `[payload]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadSection {
    /// Number of fragments kept when `--max` is not given.
    #[serde(default = "default_max")]
    pub default_max: usize,

    /// Environment label used when `--env` is not given.
    #[serde(default = "default_env")]
    pub default_env: String,

    /// Summary written when the fragments document has none.
    #[serde(default = "default_fallback_summary")]
    pub fallback_summary: String,
}

impl Default for PayloadSection {
    fn default() -> Self {
        Self {
            default_max: default_max(),
            default_env: default_env(),
            fallback_summary: default_fallback_summary(),
        }
    }
}

fn default_max() -> usize {
    10
}
fn default_env() -> String {
    "local".into()
}
fn default_fallback_summary() -> String {
    DEFAULT_FALLBACK_SUMMARY.into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime extraction configuration.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Repository root to scan.
    pub root: PathBuf,
    pub max_chars: usize,
    pub max_file_bytes: u64,
    pub priority_files: Vec<String>,
    pub extensions: Vec<String>,
    pub excluded_dirs: Vec<String>,
}

impl ExtractConfig {
    /// Defaults for scanning `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self::from_section(&ExtractSection::default(), root)
    }

    pub fn from_section(section: &ExtractSection, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_chars: section.max_chars,
            max_file_bytes: section.max_file_bytes,
            priority_files: section.priority_files.clone(),
            extensions: section.extensions.clone(),
            excluded_dirs: section.excluded_dirs.clone(),
        }
    }
}

/// Runtime payload configuration.
#[derive(Debug, Clone)]
pub struct PayloadConfig {
    /// Repository root holding both documents.
    pub root: PathBuf,
    /// Maximum number of fragments kept (always positive).
    pub max: usize,
    /// Environment label stored verbatim.
    pub env: String,
    pub priority_files: Vec<String>,
    pub fallback_summary: String,
}

impl PayloadConfig {
    /// Defaults for building the payload under `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self::from_app(&AppConfig::default(), root)
    }

    pub fn from_app(config: &AppConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max: config.payload.default_max,
            env: config.payload.default_env.clone(),
            priority_files: config.extract.priority_files.clone(),
            fallback_summary: config.payload.fallback_summary.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.repofrag/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| RepofragError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.repofrag/repofrag.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RepofragError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        RepofragError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject values the pipelines cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.extract.max_chars == 0 {
        return Err(RepofragError::config("extract.max_chars must be positive"));
    }
    if config.payload.default_max == 0 {
        return Err(RepofragError::config("payload.default_max must be positive"));
    }
    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RepofragError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RepofragError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RepofragError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
