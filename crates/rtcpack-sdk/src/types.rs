//! Core types for rtcpack-sdk.
//!
//! This module defines the fundamental types used throughout the SDK:
//!
//! - [`PackError`] - Error types for packaging and build operations
//! - [`Platform`] - Target platform selection
//! - [`Configuration`] - Build configuration (Debug, Release, or Both)
//! - [`PackageSpec`] - Immutable description of one packaging run

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::str::FromStr;

/// Error types for rtcpack-sdk operations.
///
/// Every component returns `Result<_, PackError>` and never terminates the
/// process itself; the CLI layer decides the exit code.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// An I/O error occurred.
    ///
    /// Common causes include missing build output directories, permission
    /// issues, or disk space problems while assembling the package.
    #[error("I/O error: {0}. Check file paths and permissions")]
    Io(#[from] std::io::Error),

    /// An external tool could not be started at all.
    #[error("failed to start {tool}: {source}. Ensure the tool is installed and on PATH")]
    Spawn {
        /// The executable that failed to launch.
        tool: String,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// An external tool ran but exited with a non-zero status.
    ///
    /// This is always fatal: a failing build generator, build executor,
    /// librarian, or archiver indicates a broken build environment and
    /// there is no retry logic anywhere.
    #[error("{tool} failed with {status}")]
    Tool {
        /// The executable that failed.
        tool: String,
        /// The captured exit status.
        status: ExitStatus,
    },

    /// The generated build-descriptor file could not be read.
    #[error("build descriptor not found at {path}: {source}")]
    Descriptor {
        /// The descriptor path that was probed.
        path: PathBuf,
        /// The underlying read error.
        source: std::io::Error,
    },

    /// A configuration error occurred.
    ///
    /// This indicates invalid CLI or `rtcpack.toml` input, such as an
    /// unknown platform or configuration name.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization failed while writing package metadata.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Target platform a package is produced for.
///
/// The platform selects the library-merge strategy, the build-generator
/// feature flags, and the third-party allow-list additions.
///
/// # Example
///
/// ```
/// use rtcpack_sdk::Platform;
///
/// let platform: Platform = "linux-x64".parse().unwrap();
/// assert_eq!(platform.as_str(), "linux-x64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Desktop Linux, x86-64.
    LinuxX64,
    /// 32-bit Windows.
    Win32,
    /// macOS.
    Osx,
    /// Android, armeabi-v7a ABI.
    LinuxAndroidArmeabiV7a,
}

impl Platform {
    /// Returns the canonical platform string used in archive names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinuxX64 => "linux-x64",
            Platform::Win32 => "win32",
            Platform::Osx => "osx",
            Platform::LinuxAndroidArmeabiV7a => "linux-android-armeabi-v7a",
        }
    }

    /// Derives the default platform for the host OS, if the host is one of
    /// the supported desktop platforms.
    pub fn host() -> Option<Platform> {
        match std::env::consts::OS {
            "linux" => Some(Platform::LinuxX64),
            "windows" => Some(Platform::Win32),
            "macos" => Some(Platform::Osx),
            _ => None,
        }
    }

    /// Platform-specific file name of a shared library called `name`.
    ///
    /// # Example
    ///
    /// ```
    /// use rtcpack_sdk::Platform;
    ///
    /// assert_eq!(Platform::LinuxX64.shared_library_name("vpx"), "libvpx.so");
    /// assert_eq!(Platform::Win32.shared_library_name("vpx"), "vpx.lib");
    /// assert_eq!(Platform::Osx.shared_library_name("vpx"), "libvpx.dylib");
    /// ```
    pub fn shared_library_name(&self, name: &str) -> String {
        match self {
            Platform::LinuxX64 | Platform::LinuxAndroidArmeabiV7a => format!("lib{name}.so"),
            Platform::Win32 => format!("{name}.lib"),
            Platform::Osx => format!("lib{name}.dylib"),
        }
    }

    /// File name of the consolidated static library for this platform.
    pub fn merged_library_name(&self, product: &str) -> String {
        match self {
            Platform::Win32 => format!("{product}_all.lib"),
            _ => format!("{product}_all.a"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux-x64" => Ok(Platform::LinuxX64),
            "win32" => Ok(Platform::Win32),
            "osx" => Ok(Platform::Osx),
            "linux-android-armeabi-v7a" => Ok(Platform::LinuxAndroidArmeabiV7a),
            other => Err(PackError::Config(format!(
                "unknown platform '{other}' (expected linux-x64, win32, osx, or linux-android-armeabi-v7a)"
            ))),
        }
    }
}

/// Build configuration to package.
///
/// `Both` builds and packages Debug and Release under a single package
/// directory, with the Release libraries in `lib/` and the Debug libraries
/// in `debug_lib/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configuration {
    /// Debug build with assertions and no optimizations.
    Debug,
    /// Optimized release build.
    Release,
    /// Debug and Release combined into one package.
    Both,
}

impl Configuration {
    /// Returns the configuration name as used for build output directories.
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "Debug",
            Configuration::Release => "Release",
            Configuration::Both => "Both",
        }
    }

    /// The concrete configurations to drive through the build generator,
    /// in build order.
    pub fn build_order(&self) -> &'static [Configuration] {
        match self {
            Configuration::Debug => &[Configuration::Debug],
            Configuration::Release => &[Configuration::Release],
            Configuration::Both => &[Configuration::Debug, Configuration::Release],
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Debug" => Ok(Configuration::Debug),
            "Release" => Ok(Configuration::Release),
            "Both" => Ok(Configuration::Both),
            other => Err(PackError::Config(format!(
                "unknown configuration '{other}' (expected Debug, Release, or Both)"
            ))),
        }
    }
}

/// Immutable description of one packaging run.
///
/// Every component takes the spec by reference instead of consulting
/// process-wide globals, which keeps the pipeline testable against
/// synthetic directory trees.
#[derive(Debug, Clone)]
pub struct PackageSpec {
    /// Root of the source checkout, containing the `src` directory.
    pub source_root: PathBuf,
    /// Root of the build tree, containing one subdirectory per configuration.
    pub build_root: PathBuf,
    /// Opaque version label, conventionally `<date>_<source revision>`.
    pub version: String,
    /// Target platform being packaged.
    pub platform: Platform,
    /// Configuration(s) to package.
    pub configuration: Configuration,
}

impl PackageSpec {
    /// The `src` directory inside the source checkout.
    pub fn src_dir(&self) -> PathBuf {
        self.source_root.join("src")
    }

    /// Build output directory for one concrete configuration.
    pub fn out_dir(&self, configuration: Configuration) -> PathBuf {
        self.build_root.join(configuration.as_str())
    }

    /// The package directory name and archive base name for this run.
    ///
    /// Single configurations are suffixed (`<version>-Release`); `Both`
    /// shares the bare version.
    pub fn version_name(&self) -> String {
        match self.configuration {
            Configuration::Debug | Configuration::Release => {
                format!("{}-{}", self.version, self.configuration)
            }
            Configuration::Both => self.version.clone(),
        }
    }

    /// Absolute path of the package directory under the build root.
    pub fn package_dir(&self) -> PathBuf {
        self.build_root.join(self.version_name())
    }
}

/// Convenience spec constructor used across the test suites.
#[cfg(test)]
pub(crate) fn test_spec(
    root: &std::path::Path,
    platform: Platform,
    configuration: Configuration,
) -> PackageSpec {
    PackageSpec {
        source_root: root.join("checkout"),
        build_root: root.join("build"),
        version: "20170131_ac61b745".to_string(),
        platform,
        configuration,
    }
}
