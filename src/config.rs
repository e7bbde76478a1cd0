//! Settings loaded from `~/.optiscale/config.toml`
//!
//! Every field has a default, so a missing file is not an error. An explicit
//! `--config` path must exist and parse.

use crate::types::{OptiscaleError, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tool output lists at most this many services/accounts by default
pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// 3-letter currency code reported with every profile
    pub currency: String,
    /// Free-form provider label ("aws", "gcp", "azure", ...)
    pub cloud_provider: String,
    /// Number of top services/accounts included in tool output
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            cloud_provider: "aws".into(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Settings {
    /// `~/.optiscale/config.toml`, if a home directory can be resolved
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|d| d.home_dir().join(".optiscale").join("config.toml"))
    }

    /// Load from an explicit path, or from the default path when it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            OptiscaleError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_toml_str(&content)
            .map_err(|e| OptiscaleError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut settings: Settings =
            toml::from_str(content).map_err(|e| OptiscaleError::Config(e.to_string()))?;
        settings.normalize()?;
        Ok(settings)
    }

    /// Apply command-line overrides on top of file values
    pub fn with_overrides(
        mut self,
        currency: Option<String>,
        cloud_provider: Option<String>,
        top_n: Option<usize>,
    ) -> Result<Self> {
        if let Some(currency) = currency {
            self.currency = currency;
        }
        if let Some(provider) = cloud_provider {
            self.cloud_provider = provider;
        }
        if let Some(n) = top_n {
            self.top_n = n;
        }
        self.normalize()?;
        Ok(self)
    }

    fn normalize(&mut self) -> Result<()> {
        self.currency = self.currency.trim().to_ascii_uppercase();
        self.cloud_provider = self.cloud_provider.trim().to_ascii_lowercase();
        if self.currency.is_empty() {
            return Err(OptiscaleError::Config("currency cannot be empty".into()));
        }
        if self.top_n == 0 {
            return Err(OptiscaleError::Config("top_n must be at least 1".into()));
        }
        Ok(())
    }
}
