//! Build driver: generate build files with `gn` and compile with `ninja`.
//!
//! The feature-flag set is fixed per platform family; the goal is a
//! self-contained static build with tests, protobuf, and other optional
//! tooling disabled. Both external invocations are hard synchronous
//! barriers and any failure aborts the run.

use std::process::Command;

use crate::process::run_tool;
use crate::types::{Configuration, PackError, PackageSpec, Platform};

/// Default ninja parallelism.
pub const DEFAULT_JOBS: u32 = 5;

/// Computes the `gn` feature-flag list for one platform and configuration.
pub fn gn_args(platform: Platform, configuration: Configuration) -> Vec<String> {
    let is_debug = matches!(configuration, Configuration::Debug);
    let mut args = vec![
        format!("is_debug={is_debug}"),
        "rtc_include_tests=false".to_string(),
        "use_rtti=true".to_string(),
    ];
    match platform {
        Platform::Osx => {
            args.extend(
                [
                    "is_component_build=false",
                    "libyuv_include_tests=false",
                    "rtc_enable_protobuf=false",
                ]
                .map(String::from),
            );
        }
        _ => {
            args.extend(
                [
                    "rtc_enable_protobuf=false",
                    "rtc_use_openmax_dl=false",
                    "is_clang=false",
                    "use_sysroot=false",
                    "rtc_use_gtk=false",
                ]
                .map(String::from),
            );
            if platform == Platform::Win32 {
                args.push("target_cpu=\"x86\"".to_string());
            }
        }
    }
    args
}

/// Generates build files for `configuration` and runs the full build.
///
/// `gn gen` runs from the checkout's `src` directory against the
/// per-configuration output directory, then `ninja` compiles it with the
/// given parallelism.
pub fn generate_and_build(
    spec: &PackageSpec,
    configuration: Configuration,
    jobs: u32,
    verbose: bool,
) -> Result<(), PackError> {
    let out_dir = spec.out_dir(configuration);
    println!("Generating {configuration} build files in {}", out_dir.display());

    let mut generate = Command::new("gn");
    generate
        .arg("gen")
        .arg(&out_dir)
        .arg(format!("--args={}", gn_args(spec.platform, configuration).join(" ")))
        .current_dir(spec.src_dir());
    run_tool(generate, "gn", verbose)?;

    println!("Building {configuration}");
    let mut build = Command::new("ninja");
    build
        .arg(format!("-j{jobs}"))
        .arg("-C")
        .arg(&out_dir)
        .current_dir(spec.src_dir());
    run_tool(build, "ninja", verbose)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_tracks_configuration() {
        let debug = gn_args(Platform::LinuxX64, Configuration::Debug);
        let release = gn_args(Platform::LinuxX64, Configuration::Release);
        assert_eq!(debug[0], "is_debug=true");
        assert_eq!(release[0], "is_debug=false");
    }

    #[test]
    fn common_flags_always_present() {
        for platform in [Platform::LinuxX64, Platform::Win32, Platform::Osx] {
            let args = gn_args(platform, Configuration::Release);
            assert!(args.contains(&"rtc_include_tests=false".to_string()));
            assert!(args.contains(&"use_rtti=true".to_string()));
            assert!(args.contains(&"rtc_enable_protobuf=false".to_string()));
        }
    }

    #[test]
    fn osx_uses_the_reduced_flag_set() {
        let args = gn_args(Platform::Osx, Configuration::Release);
        assert!(args.contains(&"is_component_build=false".to_string()));
        assert!(args.contains(&"libyuv_include_tests=false".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("is_clang")));
        assert!(!args.iter().any(|a| a.starts_with("target_cpu")));
    }

    #[test]
    fn win32_appends_target_cpu_override() {
        let args = gn_args(Platform::Win32, Configuration::Release);
        assert_eq!(args.last().unwrap(), "target_cpu=\"x86\"");
        assert!(args.contains(&"use_sysroot=false".to_string()));
    }

    #[test]
    fn linux_and_android_share_a_flag_set() {
        let linux = gn_args(Platform::LinuxX64, Configuration::Release);
        let android = gn_args(Platform::LinuxAndroidArmeabiV7a, Configuration::Release);
        assert_eq!(linux, android);
        assert!(linux.contains(&"rtc_use_gtk=false".to_string()));
    }
}
