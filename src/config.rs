// SPDX-License-Identifier: GPL-3.0-only

//! Persisted user configuration
//!
//! Stored as JSON under the platform config directory. Loading never fails:
//! a missing or malformed file falls back to defaults (with a warning), and
//! unknown or missing fields are tolerated so old files keep working.

use crate::backends::camera::StreamConstraints;
use crate::constants::{api, capture, config as paths};
use crate::session::SessionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the analysis server
    pub api_base_url: String,
    /// Capture a photo when stopping the stream instead of discarding it
    pub capture_on_stop: bool,
    /// Which enumerated device to use (0 = first)
    pub device_index: usize,
    /// Requested stream width hint
    pub ideal_width: u32,
    /// Requested stream height hint
    pub ideal_height: u32,
    /// Requested frame rate hint
    pub ideal_frame_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: api::DEFAULT_BASE_URL.to_string(),
            capture_on_stop: false,
            device_index: 0,
            ideal_width: capture::IDEAL_WIDTH,
            ideal_height: capture::IDEAL_HEIGHT,
            ideal_frame_rate: capture::IDEAL_FRAME_RATE,
        }
    }
}

impl Config {
    /// Default on-disk location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(paths::APP_DIR).join(paths::FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                Self::default()
            }
        }
    }

    /// Save to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no config directory on this platform")
        })?;
        self.save_to(&path)
    }

    /// Save to a specific file, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }

    /// Session options derived from this config
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            constraints: StreamConstraints {
                ideal_width: self.ideal_width,
                ideal_height: self.ideal_height,
                ideal_frame_rate: self.ideal_frame_rate,
            },
            device_index: self.device_index,
            capture_on_stop: self.capture_on_stop,
        }
    }
}
