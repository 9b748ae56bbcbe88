use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::range::MIN_SPAN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_span: f64,
    pub seek_epsilon: f64,
    pub seek_throttle_ms: u64,
    pub waveform_buckets: usize,
    pub handle_hit_radius: f64,
    pub media_server_url: Option<String>,
    pub export: ExportSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_span: MIN_SPAN,
            seek_epsilon: 0.05,
            seek_throttle_ms: 80,
            waveform_buckets: 200,
            handle_hit_radius: 8.0,
            media_server_url: None,
            export: ExportSettings::default(),
        }
    }
}

impl EngineConfig {
    pub fn seek_throttle(&self) -> Duration {
        Duration::from_millis(self.seek_throttle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Falls back to `~/Videos` when unset.
    pub save_dir: Option<PathBuf>,
    pub format: String,
    pub resolution: String,
    pub codec: String,
    pub bitrate: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            save_dir: None,
            format: "mp4".to_string(),
            resolution: "source".to_string(),
            codec: "libx264".to_string(),
            bitrate: "128k".to_string(),
        }
    }
}

pub fn load_config(path: &Path) -> EngineConfig {
    if !path.exists() {
        info!(?path, "config file missing, using defaults");
        return EngineConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<EngineConfig>(&contents) {
            Ok(config) => {
                info!(?path, "loaded config");
                config
            }
            Err(e) => {
                warn!(?path, error = %e, "invalid config, using defaults");
                EngineConfig::default()
            }
        },
        Err(e) => {
            warn!(?path, error = %e, "unreadable config, using defaults");
            EngineConfig::default()
        }
    }
}
