use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::log::Sink;
use crate::{flog_debug, Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    /// Log file location; `~/.flowstate/flowstate.log` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(default)]
    pub log_to_stderr: bool,
    /// Directory of `*.json` / `*.toml` definitions the CLI preloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions_dir: Option<String>,
}

impl Config {
    pub fn flowstate_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".flowstate"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::flowstate_dir()?.join("flowstate.toml"))
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(file) => Ok(expand_tilde(file)),
            None => Ok(Self::flowstate_dir()?.join("flowstate.log")),
        }
    }

    pub fn log_sink(&self) -> Result<Sink> {
        if self.log_to_stderr {
            return Ok(Sink::Stderr);
        }
        Ok(Sink::File(self.log_path()?))
    }

    pub fn definitions_dir(&self) -> Option<PathBuf> {
        self.definitions_dir.as_deref().map(expand_tilde)
    }

    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        flog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            flog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        flog_debug!(
            "Config loaded: debug={}, log_file={:?}, definitions_dir={:?}",
            config.debug,
            config.log_file,
            config.definitions_dir
        );
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        flog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
