//! Configuration file support for liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.

use crate::aggregate::AggregateOptions;
use crate::export::ExportFormat;
use crate::{Error, Result, SelectionPolicy, DEFAULT_TOP_N};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub assistance: AssistanceConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Which ranked-set selection rule history uses
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    TopN,
    BestOfDay,
}

/// Largest accepted `history.top_n`; bounds the export column count
pub const MAX_TOP_N: usize = 20;

/// History aggregation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub policy: PolicyKind,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Match "Bench", " squat " etc. as primary lifts
    #[serde(default)]
    pub normalize_names: bool,

    /// Fixed day boundary offset; unset means the system timezone
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            top_n: default_top_n(),
            normalize_names: false,
            utc_offset_minutes: None,
        }
    }
}

impl HistoryConfig {
    pub fn selection_policy(&self) -> SelectionPolicy {
        match self.policy {
            PolicyKind::TopN => SelectionPolicy::TopN(self.top_n),
            PolicyKind::BestOfDay => SelectionPolicy::BestOfDay,
        }
    }

    /// Build aggregation options, validating the configured values
    pub fn aggregate_options(&self) -> Result<AggregateOptions> {
        if self.policy == PolicyKind::TopN && !(1..=MAX_TOP_N).contains(&self.top_n) {
            return Err(Error::Config(format!(
                "history.top_n must be between 1 and {}, got {}",
                MAX_TOP_N, self.top_n
            )));
        }

        let utc_offset = match self.utc_offset_minutes {
            Some(minutes) => Some(
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        Error::Config(format!(
                            "history.utc_offset_minutes out of range: {}",
                            minutes
                        ))
                    })?,
            ),
            None => None,
        };

        Ok(AggregateOptions {
            policy: self.selection_policy(),
            normalize_names: self.normalize_names,
            utc_offset,
        })
    }
}

/// Extra assistance exercises offered alongside the built-in menu
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AssistanceConfig {
    #[serde(default)]
    pub custom: Vec<String>,
}

/// Export defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub default_format: ExportFormat,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("liftlog")
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("liftlog").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
