//! Configuration file support for rtcpack.
//!
//! An optional `rtcpack.toml` at the source root persists project
//! settings so they do not have to be passed as CLI flags on every run.
//!
//! ## Example Configuration
//!
//! ```toml
//! [package]
//! product = "webrtc"
//!
//! [build]
//! jobs = 8
//!
//! [trim]
//! extra = ["ffmpeg"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The default configuration file name.
pub const CONFIG_FILE_NAME: &str = "rtcpack.toml";

/// Root configuration structure for `rtcpack.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RtcpackConfig {
    /// Package naming.
    pub package: PackageSection,

    /// Build executor tuning.
    pub build: BuildSection,

    /// Third-party trimming additions.
    pub trim: TrimSection,
}

/// Package naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSection {
    /// Product name used for the archive and the merged static library.
    pub product: String,
}

impl Default for PackageSection {
    fn default() -> Self {
        Self {
            product: "webrtc".to_string(),
        }
    }
}

/// Build executor tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Parallelism passed to the build executor.
    pub jobs: u32,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            jobs: rtcpack_sdk::build::DEFAULT_JOBS,
        }
    }
}

/// Third-party trimming additions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimSection {
    /// Extra allow-list entries kept in addition to the baseline set.
    pub extra: Vec<String>,
}

impl RtcpackConfig {
    /// Loads configuration from the specified file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: RtcpackConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Loads `rtcpack.toml` from `dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}
