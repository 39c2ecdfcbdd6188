//! Package build metadata.
//!
//! Every package carries a `pack_meta.json` describing how it was
//! produced, so a downloaded archive can be traced back to the source
//! revision and build environment that made it.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::types::{PackError, PackageSpec};

/// File name of the metadata manifest inside the package directory.
pub const META_FILE_NAME: &str = "pack_meta.json";

/// Build metadata for artifact correlation and traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackMeta {
    /// Product the package contains.
    pub product: String,
    /// Version label the package was produced under.
    pub version: String,
    /// Target platform string.
    pub platform: String,
    /// Packaged configuration (Debug, Release, or Both).
    pub configuration: String,
    /// Name of the consolidated static library, when the platform merges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_library: Option<String>,
    /// Git revision of the source checkout (short form, best effort).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_revision: Option<String>,
    /// Build timestamp in RFC3339 form.
    pub build_time: String,
    /// Host OS the package was produced on.
    pub host_os: String,
    /// rtcpack version that produced the package.
    pub rtcpack_version: String,
}

/// Captures metadata for the current run.
pub fn create_pack_meta(spec: &PackageSpec, product: &str, merged_library: Option<&str>) -> PackMeta {
    PackMeta {
        product: product.to_string(),
        version: spec.version.clone(),
        platform: spec.platform.to_string(),
        configuration: spec.configuration.to_string(),
        merged_library: merged_library.map(str::to_string),
        source_revision: git_revision(&spec.source_root),
        build_time: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        host_os: std::env::consts::OS.to_string(),
        rtcpack_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Writes the metadata manifest into the package directory.
pub fn write_pack_meta(package_dir: &Path, meta: &PackMeta) -> Result<(), PackError> {
    std::fs::create_dir_all(package_dir)?;
    let json = serde_json::to_string_pretty(meta)?;
    std::fs::write(package_dir.join(META_FILE_NAME), json)?;
    Ok(())
}

/// Short git revision of the checkout, if it is a git repository and git
/// is available.
fn git_revision(source_root: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(source_root)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if revision.is_empty() { None } else { Some(revision) }
}
