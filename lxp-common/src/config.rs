//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `LXP_ROOT_FOLDER`, then `LXP_ROOT` environment variable
//! 3. `root_folder` key of the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: the resolver logs a
//! warning and continues with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary environment variable for the root folder
pub const ENV_ROOT_FOLDER: &str = "LXP_ROOT_FOLDER";
/// Fallback environment variable for the root folder
pub const ENV_ROOT: &str = "LXP_ROOT";
/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "lxp.db";

/// Compiled-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            // ~/.local/share/lxp (or /var/lib/lxp when no home is known)
            dirs::data_local_dir()
                .map(|d| d.join("lxp"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/lxp"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("lxp"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/lxp"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("lxp"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\lxp"))
        } else {
            PathBuf::from("./lxp_data")
        };

        Self { root_folder }
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Feedback submission settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedbackSettings {
    /// Label stored with every response to identify the submitting role
    pub submitter_tag: String,
    /// Upper bound on free-text response length, in characters
    pub max_response_length: usize,
    /// Upper bound on submitted option text length, in characters
    pub max_option_text_length: usize,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            submitter_tag: "learner".to_string(),
            max_response_length: 1000,
            max_option_text_length: 255,
        }
    }
}

/// Parsed TOML config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub feedback: FeedbackSettings,
}

impl TomlConfig {
    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Resolves the root folder for a module
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
        }
    }

    /// Supply the command-line override (priority 1)
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Resolve the root folder; never fails
    ///
    /// The config file is only read when neither the command line nor the
    /// environment names a folder.
    pub fn resolve(&self) -> PathBuf {
        self.resolve_override()
            .unwrap_or_else(|| Self::from_config(&self.load_config()))
    }

    /// Resolve the root folder against a config the caller already loaded
    pub fn resolve_with_config(&self, config: &TomlConfig) -> PathBuf {
        self.resolve_override()
            .unwrap_or_else(|| Self::from_config(config))
    }

    /// Priorities 1 and 2: command line, then environment
    fn resolve_override(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_arg {
            debug!("Root folder from command line: {}", path.display());
            return Some(path.clone());
        }

        for var in [ENV_ROOT_FOLDER, ENV_ROOT] {
            if let Ok(path) = std::env::var(var) {
                if !path.is_empty() {
                    debug!("Root folder from {}: {}", var, path);
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }

    /// Priorities 3 and 4: config file, then compiled default
    fn from_config(config: &TomlConfig) -> PathBuf {
        match &config.root_folder {
            Some(root_folder) => {
                debug!("Root folder from config file: {}", root_folder.display());
                root_folder.clone()
            }
            None => CompiledDefaults::for_current_platform().root_folder,
        }
    }

    /// Module-specific config file path (`<config dir>/lxp/<module>.toml`)
    pub fn module_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lxp").join(format!("{}.toml", self.module_name)))
    }

    /// First existing config file, module-specific before shared
    pub fn config_file_path(&self) -> Option<PathBuf> {
        let mut candidates = Vec::new();
        candidates.extend(self.module_config_path());
        candidates.extend(dirs::config_dir().map(|d| d.join("lxp").join("config.toml")));
        if cfg!(target_os = "linux") {
            candidates.push(PathBuf::from("/etc/lxp/config.toml"));
        }

        candidates.into_iter().find(|path| path.exists())
    }

    /// Load the config file, falling back to defaults when missing or invalid
    pub fn load_config(&self) -> TomlConfig {
        let Some(path) = self.config_file_path() else {
            debug!("No config file found for {}, using defaults", self.module_name);
            return TomlConfig::default();
        };

        match TomlConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }
}

/// Prepares the root folder and names the files inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if missing (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
