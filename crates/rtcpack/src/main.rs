use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;

use rtcpack_sdk::{Configuration, PackageSpec, Packager, Platform, build, extract, trim};

mod config;

use config::RtcpackConfig;

/// CLI orchestrator for building and packaging WebRTC native libraries.
///
/// Sequences third-party trimming, the external build toolchain, package
/// assembly, and build-settings extraction for one platform. Note that the
/// source directory contains platform-specific differences, so it cannot
/// be shared between platforms (e.g. residing on a host OS and shared to
/// VMs).
#[derive(Parser, Debug)]
#[command(name = "rtcpack", about = "WebRTC build packaging orchestrator", long_about = None)]
struct Cli {
    /// Location of the WebRTC source directory (containing 'src')
    #[arg(long = "source_dir")]
    source_dir: Option<PathBuf>,

    /// Location of the build directory (containing 'Debug' and/or 'Release')
    #[arg(long = "build_dir")]
    build_dir: Option<PathBuf>,

    /// Name to give the package; use the format <date>_<source revision>,
    /// identical across platforms of the same build
    #[arg(long)]
    version: String,

    /// Platform to package for (linux-x64, win32, osx,
    /// linux-android-armeabi-v7a); defaults to the host platform
    #[arg(long)]
    platform: Option<String>,

    /// Configuration to build and package
    #[arg(short = 'c', long, default_value = "Both")]
    configuration: String,

    /// Print every external command before running it
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let spec = resolve_spec(&cli)?;

    println!("Options values:");
    println!("--source_dir={}", spec.source_root.display());
    println!("--build_dir={}", spec.build_root.display());
    println!("--version={}", spec.version);
    println!("--platform={}", spec.platform);
    println!("--configuration={}", spec.configuration);

    let config = RtcpackConfig::load_or_default(&spec.source_root)?;

    trim::trim_third_party(&spec.src_dir(), spec.platform, &config.trim.extra)
        .context("trimming third_party")?;

    for &configuration in spec.configuration.build_order() {
        build::generate_and_build(&spec, configuration, config.build.jobs, cli.verbose)
            .with_context(|| format!("building {configuration}"))?;
    }

    let mut packager =
        Packager::new(spec.clone(), config.package.product.clone()).verbose(cli.verbose);
    packager.build_package().context("assembling package")?;

    extract::extract_build_settings(
        &spec,
        &config.package.product,
        packager.merged_static_library(),
    )
    .context("extracting build settings")?;

    Ok(())
}

/// Resolves CLI options into the immutable run description.
fn resolve_spec(cli: &Cli) -> Result<PackageSpec> {
    let source_root = match &cli.source_dir {
        Some(dir) => dir.clone(),
        None => default_source_dir(),
    };
    let build_root = match &cli.build_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("resolving the current directory")?,
    };
    let platform = match &cli.platform {
        Some(name) => name.parse::<Platform>()?,
        None => {
            Platform::host().context("no default platform for this host; pass --platform")?
        }
    };
    let configuration: Configuration = cli.configuration.parse()?;

    Ok(PackageSpec {
        source_root,
        build_root,
        version: cli.version.clone(),
        platform,
        configuration,
    })
}

/// Parent of the executable's own directory, by the convention that the
/// tool is installed inside the checkout; falls back to the current
/// directory when the executable path cannot be resolved.
fn default_source_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| Some(exe.parent()?.parent()?.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("valid command line")
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_is_required() {
        assert!(Cli::try_parse_from(["rtcpack"]).is_err());
    }

    #[test]
    fn options_use_underscore_names() {
        let cli = parse(&[
            "rtcpack",
            "--source_dir",
            "/src",
            "--build_dir",
            "/out",
            "--version",
            "20170131_ac61b745",
            "--platform",
            "linux-x64",
            "-c",
            "Release",
        ]);
        let spec = resolve_spec(&cli).unwrap();
        assert_eq!(spec.source_root, PathBuf::from("/src"));
        assert_eq!(spec.build_root, PathBuf::from("/out"));
        assert_eq!(spec.platform, Platform::LinuxX64);
        assert_eq!(spec.configuration, Configuration::Release);
    }

    #[test]
    fn configuration_defaults_to_both() {
        let cli = parse(&["rtcpack", "--version", "v1", "--platform", "osx"]);
        let spec = resolve_spec(&cli).unwrap();
        assert_eq!(spec.configuration, Configuration::Both);
    }

    #[test]
    fn bad_platform_is_rejected_at_resolution() {
        let cli = parse(&["rtcpack", "--version", "v1", "--platform", "amiga"]);
        assert!(resolve_spec(&cli).is_err());
    }
}
