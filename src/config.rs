use crate::error::ClientError;
use crate::tags::is_hex_color;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TAG_COLOR: &str = "#60a5fa";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Scheme and host of the LinkVault server; `/api/...` is appended.
    pub api_base: String,
    pub timeout_secs: u64,
    /// Preset color of the new-tag form.
    pub default_tag_color: String,
    /// When set, JSON logs are also written here with daily rotation.
    pub log_dir: Option<PathBuf>,
    /// File the values were read from; `None` when only defaults apply.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 10,
            default_tag_color: DEFAULT_TAG_COLOR.to_string(),
            log_dir: None,
            source: None,
        }
    }
}

impl Config {
    /// Load from `--config`, `LINKVAULT_CONFIG`, or the per-user file, then
    /// apply `LINKVAULT_API` and `--api` on top.
    pub fn load(
        explicit: Option<&Path>,
        api_flag: Option<&str>,
    ) -> Result<Self, ClientError> {
        let path = config_path(
            explicit,
            env::var("LINKVAULT_CONFIG").ok(),
            env::var("HOME").ok(),
        );
        let config = match path {
            Some(ConfigPath::Required(p)) => Self::from_file(&p)?,
            Some(ConfigPath::Optional(p)) if p.exists() => {
                Self::from_file(&p)?
            }
            _ => Self::default(),
        };
        let config = config
            .apply_overrides(env::var("LINKVAULT_API").ok(), api_flag);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ClientError> {
        toml::from_str(raw).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Environment first, then the command-line flag so the flag wins.
    pub fn apply_overrides(
        mut self,
        env_api: Option<String>,
        flag_api: Option<&str>,
    ) -> Self {
        if let Some(api) = env_api.filter(|s| !s.trim().is_empty()) {
            self.api_base = api;
        }
        if let Some(api) = flag_api {
            self.api_base = api.to_string();
        }
        self.api_base = self.api_base.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.api_base.starts_with("http://")
            || self.api_base.starts_with("https://"))
        {
            return Err(ClientError::Config(format!(
                "api_base must start with http:// or https:// (got {:?})",
                self.api_base
            )));
        }
        if !is_hex_color(&self.default_tag_color) {
            return Err(ClientError::Config(format!(
                "default_tag_color must look like #RRGGBB (got {:?})",
                self.default_tag_color
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigPath {
    /// Named explicitly; a missing file is an error.
    Required(PathBuf),
    /// Conventional location; skipped when absent.
    Optional(PathBuf),
}

pub fn config_path(
    explicit: Option<&Path>,
    env_path: Option<String>,
    home: Option<String>,
) -> Option<ConfigPath> {
    if let Some(p) = explicit {
        return Some(ConfigPath::Required(p.to_path_buf()));
    }
    if let Some(p) = env_path.filter(|s| !s.is_empty()) {
        return Some(ConfigPath::Required(PathBuf::from(p)));
    }
    home.map(|h| {
        ConfigPath::Optional(
            PathBuf::from(h).join(".config/linkvault/config.toml"),
        )
    })
}
