//! Aiakos configuration file handling
//!
//! Provides default configuration generation and loading for the `aiakos`
//! CLI. Configuration files are TOML and live next to the ledger file by
//! default (`~/.local/share/aiakos/config.toml`).
//!
//! ## Deployment vs Ledger Settings
//!
//! This file holds DEPLOYMENT settings only: where the ledger lives, the
//! salt used to derive identities from labels, and logging. The owner and
//! the quorum threshold are fixed inside the ledger at `aiakos init` and
//! cannot be changed from here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default identity derivation salt
const DEFAULT_IDENTITY_SALT: &str = "aiakos";

/// Aiakos CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiakosConfig {
    /// Ledger storage configuration
    pub ledger: LedgerConfig,

    /// Identity derivation configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path to the CBOR ledger file
    pub state_path: PathBuf,
}

/// Identity derivation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Salt mixed into `aiakos identity --name` derivations.
    /// Every participant of one deployment must use the same salt.
    #[serde(default = "default_identity_salt")]
    pub salt: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_identity_salt() -> String {
    DEFAULT_IDENTITY_SALT.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            salt: default_identity_salt(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl AiakosConfig {
    /// Create a new configuration with the given ledger path
    pub fn new(state_path: PathBuf) -> Self {
        Self {
            ledger: LedgerConfig { state_path },
            identity: IdentityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: AiakosConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    #[allow(dead_code)] // exercised by tests; the CLI writes the commented template instead
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Load the config at `path`, writing the default template first if it
    /// does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            let state_path = default_state_path_for(path);
            Self::create_default(path, &state_path)?;
            eprintln!("📝 Created default configuration: {}", path.display());
        }
        Self::load(path)
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(state_path: &Path) -> String {
        format!(
            r#"# Aiakos Configuration (Deployment Settings)
#
# This file contains DEPLOYMENT configuration only: where the ledger lives,
# how labels map to identities, and logging.
#
# The OWNER and the REQUIRED APPROVALS threshold are fixed inside the ledger
# when it is created with `aiakos init` and cannot be changed here.

[ledger]
# Path to the CBOR ledger file
state_path = "{state_path}"

[identity]
# Salt for `aiakos identity --name <label>`.
# Everyone deriving identities for this ledger must use the same salt.
salt = "{salt}"

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides this)
level = "{level}"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/aiakos/aiakos.log"
"#,
            state_path = state_path.display(),
            salt = DEFAULT_IDENTITY_SALT,
            level = DEFAULT_LOG_LEVEL,
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        state_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(state_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Default data directory: `~/.local/share/aiakos`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aiakos")
}

/// Default config file path
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

/// Ledger path placed adjacent to a config file
///
/// - Config: /data/aiakos/config.toml
/// - Ledger: /data/aiakos/ledger.cbor
pub fn default_state_path_for(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("ledger.cbor")
}
