//! # Configuration
//!
//! TOML configuration for the `parentsim` binary and for anything embedding
//! the game core that wants the same knobs.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - resolution policy, requirement gate, attribute mode, dice seed
//! - [`StorageConfig`] - where the sled database lives
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use parentsim::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("parentsim.toml").await?;
//!     let config = Config::load("parentsim.toml").await?;
//!     let resolver = config.game.build_resolver();
//!     println!("policy: {}", resolver.policy().name());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! resolution = "threshold"   # or "additive"
//! pivot = 21
//! step = 3
//! requirement_threshold = 10
//! attribute_mode = "fixed"   # or "mutable"
//! default_child_name = "Alex"
//! # seed = 42               # reproducible dice
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "parentsim.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::game::dice::{DiceRoller, SeededRoller, ThreadRoller};
use crate::game::resolver::{
    ActionResolver, LinearScoring, ResolutionPolicy, DEFAULT_REQUIREMENT_THRESHOLD,
};
use crate::game::session::AttributeMode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    #[default]
    Threshold,
    Additive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub resolution: ResolutionKind,
    /// Additive policy: totals at or above the pivot succeed.
    #[serde(default = "default_pivot")]
    pub pivot: i32,
    /// Additive policy: points of total per unit of delta bias.
    #[serde(default = "default_step")]
    pub step: i32,
    #[serde(default = "default_requirement_threshold")]
    pub requirement_threshold: i32,
    #[serde(default)]
    pub attribute_mode: AttributeMode,
    #[serde(default = "default_child_name")]
    pub default_child_name: String,
    /// Fixed dice seed; fresh randomness per roll when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_pivot() -> i32 {
    LinearScoring::default().pivot
}

fn default_step() -> i32 {
    LinearScoring::default().step
}

fn default_requirement_threshold() -> i32 {
    DEFAULT_REQUIREMENT_THRESHOLD
}

fn default_child_name() -> String {
    "Alex".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            resolution: ResolutionKind::default(),
            pivot: default_pivot(),
            step: default_step(),
            requirement_threshold: default_requirement_threshold(),
            attribute_mode: AttributeMode::default(),
            default_child_name: default_child_name(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn build_resolver(&self) -> ActionResolver {
        let policy = match self.resolution {
            ResolutionKind::Threshold => ResolutionPolicy::Threshold,
            ResolutionKind::Additive => ResolutionPolicy::additive_linear(LinearScoring {
                pivot: self.pivot,
                step: self.step,
            }),
        };
        ActionResolver::new(policy).with_requirement_threshold(self.requirement_threshold)
    }

    pub fn build_roller(&self) -> Box<dyn DiceRoller> {
        match self.seed {
            Some(seed) => Box::new(SeededRoller::new(seed)),
            None => Box::new(ThreadRoller),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl StorageConfig {
    /// Directory of the sled database inside `data_dir`.
    pub fn sled_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("parentsim")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("parentsim.log".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.step <= 0 {
            return Err(anyhow!("game.step must be positive, got {}", self.game.step));
        }
        if self.game.default_child_name.trim().is_empty() {
            return Err(anyhow!("game.default_child_name must not be empty"));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        Ok(())
    }
}
