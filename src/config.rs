//! Session configuration using Figment.
//!
//! Strongly-typed configuration for an acquisition session, loaded from:
//! 1. a TOML file (base configuration, `config/dualcam.toml` by default)
//! 2. environment variables prefixed with `DUALCAM_` (double underscore as
//!    the section separator, e.g. `DUALCAM_APPLICATION__LOG_LEVEL=debug`)
//!
//! # Example
//! ```no_run
//! use dualcam_daq::config::Settings;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load()?;
//! settings.validate()?;
//! println!("Session: {}", settings.application.name);
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::acquisition::lut::QUADRANTS;

/// Top-level session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Application settings.
    pub application: ApplicationConfig,
    /// Acquisition geometry and integration settings.
    pub acquisition: AcquisitionConfig,
    /// Camera roster. Exactly one camera is the accumulator owner.
    pub cameras: Vec<CameraDefinition>,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name.
    pub name: String,
    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Persistent log file. Diagnostics go here in addition to the console.
    pub log_file: PathBuf,
}

/// Acquisition geometry and integration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Number of integration cycles per session.
    #[serde(default = "default_num_integrations")]
    pub num_integrations: u32,
    /// Four-sample pixel groups per frame. A frame carries one sample per
    /// quadrant stream per group, so frames are `quad_groups * 4` samples long.
    pub quad_groups: usize,
    /// Whether per-quadrant lookup-table correction is applied.
    #[serde(default)]
    pub lut_enabled: bool,
}

/// One camera in the rig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDefinition {
    /// Unique camera identifier (e.g. "cam0").
    pub id: String,
    /// Whether this camera's loop zeroes the shared accumulator at session
    /// start. Exactly one camera must carry this flag.
    #[serde(default)]
    pub owner: bool,
}

fn default_num_integrations() -> u32 {
    16
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application: ApplicationConfig {
                name: "dualcam-daq".to_string(),
                log_level: "info".to_string(),
                log_file: PathBuf::from("logs/acquisition.log"),
            },
            acquisition: AcquisitionConfig {
                num_integrations: default_num_integrations(),
                quad_groups: 16384,
                lut_enabled: false,
            },
            cameras: vec![
                CameraDefinition {
                    id: "cam0".to_string(),
                    owner: true,
                },
                CameraDefinition {
                    id: "cam1".to_string(),
                    owner: false,
                },
            ],
        }
    }
}

impl Settings {
    /// Load configuration from `config/dualcam.toml` and environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from("config/dualcam.toml")
    }

    /// Load configuration from a specific file path, layered over defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("DUALCAM_").split("__"))
            .extract()
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.acquisition.num_integrations == 0 {
            return Err("num_integrations must be at least 1".to_string());
        }

        if self.acquisition.quad_groups == 0 {
            return Err("quad_groups must be at least 1".to_string());
        }

        if self.cameras.is_empty() {
            return Err("at least one camera must be defined".to_string());
        }

        let mut ids = std::collections::HashSet::new();
        for camera in &self.cameras {
            if !ids.insert(&camera.id) {
                return Err(format!("Duplicate camera ID: {}", camera.id));
            }
        }

        let owners = self.cameras.iter().filter(|c| c.owner).count();
        if owners != 1 {
            return Err(format!(
                "Exactly one camera must own the accumulator reset, found {owners}"
            ));
        }

        Ok(())
    }

    /// Samples per frame: one sample per quadrant stream per pixel group.
    pub fn samples_per_frame(&self) -> usize {
        self.acquisition.quad_groups * QUADRANTS
    }

    /// The camera designated to zero the accumulator at session start.
    pub fn owner_camera(&self) -> Option<&CameraDefinition> {
        self.cameras.iter().find(|c| c.owner)
    }
}
