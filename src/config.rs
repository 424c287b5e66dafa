//! Notary configuration
//!
//! Layered, later layers winning:
//! 1. built-in defaults
//! 2. `~/.config/notary/config.json` (platform config dir)
//! 3. `NOTARY_HASH_ALGORITHM` / `NOTARY_STORE` environment variables
//! 4. command-line flags (applied by the binary)

use crate::hasher::HashAlgorithm;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_ALGORITHM: &str = "NOTARY_HASH_ALGORITHM";
pub const ENV_STORE: &str = "NOTARY_STORE";

/// Default store file, relative to the working directory
pub const DEFAULT_STORE_PATH: &str = "sessions.notary";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryConfig {
    pub algorithm: HashAlgorithm,
    pub store_path: PathBuf,
}

/// On-disk shape; every field optional so a file may override only some
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    algorithm: Option<String>,
    store_path: Option<PathBuf>,
}

impl Default for NotaryConfig {
    fn default() -> Self {
        NotaryConfig {
            algorithm: HashAlgorithm::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl NotaryConfig {
    /// Defaults, then the user config file, then the environment
    pub fn load() -> Result<Self> {
        let mut config = NotaryConfig::default();
        if let Some(path) = Self::default_path() {
            if path.exists() {
                config = config.merge_file(&path)?;
            }
        }
        config.merge_env(|key| std::env::var(key).ok())
    }

    /// Location of the user config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("notary").join("config.json"))
    }

    /// Overlay the fields present in a JSON config file
    pub fn merge_file(mut self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        if let Some(alg) = file.algorithm {
            self.algorithm = alg.parse()?;
        }
        if let Some(store_path) = file.store_path {
            self.store_path = store_path;
        }
        Ok(self)
    }

    /// Overlay environment variables, looked up through `lookup`
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(alg) = lookup(ENV_ALGORITHM).filter(|v| !v.trim().is_empty()) {
            self.algorithm = alg.parse()?;
        }
        if let Some(store_path) = lookup(ENV_STORE).filter(|v| !v.trim().is_empty()) {
            self.store_path = PathBuf::from(store_path);
        }
        Ok(self)
    }
}
