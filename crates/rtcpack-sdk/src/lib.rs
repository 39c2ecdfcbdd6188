//! Packaging SDK for WebRTC native builds.
//!
//! `rtcpack-sdk` turns a compiled WebRTC checkout into a distributable
//! archive: it drives the external build toolchain, consolidates the
//! per-compilation-unit libraries into one static archive per platform,
//! gathers headers and licenses, and reverse-engineers the library and
//! define lists the downstream build configuration needs.
//!
//! # Architecture
//!
//! The pipeline is strictly sequential; each component blocks on the
//! external processes it spawns:
//!
//! - **trim** - reduce the vendored `third_party` tree to an allow-list
//!   (crash-safe rename protocol)
//! - **build** - generate build files with `gn`, compile with `ninja`
//! - **packager** - merge libraries, gather support files, archive
//! - **extract** - recover libraries and used defines from the generated
//!   build descriptor, emitting the downstream manifest
//!
//! The supporting modules (`fileset`, `merge`, `meta`) are reusable on
//! their own.
//!
//! # Example
//!
//! ```no_run
//! use rtcpack_sdk::{Configuration, PackageSpec, Packager, Platform};
//!
//! let spec = PackageSpec {
//!     source_root: "/home/dev/webrtc-checkout".into(),
//!     build_root: "/home/dev/webrtc-out".into(),
//!     version: "20170131_ac61b745".to_string(),
//!     platform: Platform::LinuxX64,
//!     configuration: Configuration::Release,
//! };
//!
//! let mut packager = Packager::new(spec, "webrtc");
//! packager.build_package()?;
//! # Ok::<(), rtcpack_sdk::PackError>(())
//! ```

pub mod build;
pub mod extract;
pub mod fileset;
pub mod merge;
pub mod meta;
pub mod packager;
mod process;
pub mod trim;
pub mod types;

// Re-export key types for convenience
pub use extract::{DescriptorScan, extract_build_settings, scan_descriptor};
pub use fileset::{Matcher, collect_files, copy_files};
pub use merge::merge_libraries;
pub use meta::{PackMeta, create_pack_meta, write_pack_meta};
pub use packager::Packager;
pub use trim::trim_third_party;
pub use types::{Configuration, PackError, PackageSpec, Platform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
