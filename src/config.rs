use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::constants::SETTLE_DELAY_MS;
use crate::controller::TestSettings;
use crate::error::Result;
use crate::session::TestDuration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration: TestDuration,
    pub throttle_ms: u64,
    pub settle_delay_ms: u64,
    pub caret_blink: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration: TestDuration::Sixty,
            throttle_ms: 0,
            settle_delay_ms: SETTLE_DELAY_MS,
            caret_blink: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn test_settings(&self, line_tolerance: f32) -> TestSettings {
        TestSettings {
            duration: self.duration,
            throttle_ms: self.throttle_ms,
            settle_delay_ms: self.settle_delay_ms,
            line_tolerance,
            caret_blink: self.caret_blink,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typetest_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
