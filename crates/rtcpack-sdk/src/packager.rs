//! Package assembly: merge libraries, gather support files, produce the
//! distributable archive.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::fileset::{Matcher, collect_files, copy_files};
use crate::merge::merge_libraries;
use crate::meta::{create_pack_meta, write_pack_meta};
use crate::process::run_tool;
use crate::types::{Configuration, PackError, PackageSpec, Platform};

/// Header-like suffixes gathered into `include/`.
const HEADER_SUFFIXES: &[&str] = &[".h", ".hpp", ".h.def"];

/// License-like file names gathered into `licenses/`.
const LICENSE_SUFFIXES: &[&str] = &["LICENSE", "COPYING", "LICENSE_THIRD_PARTY", "PATENTS"];

/// Source subtrees support files are gathered from.
const SUPPORT_SUBDIRS: &[&str] = &["webrtc", "third_party"];

/// Assembles the package directory for one platform and archives it.
///
/// One packager instance covers one run; after [`Packager::build_package`]
/// the merged static library name (if the platform produces one) is
/// available for the descriptor extractor.
pub struct Packager {
    spec: PackageSpec,
    product: String,
    verbose: bool,
    merged_static_library: Option<String>,
}

impl Packager {
    /// Creates a packager for one run. `product` names the archive and the
    /// merged library (`<product>_all.<ext>`).
    pub fn new(spec: PackageSpec, product: impl Into<String>) -> Self {
        Self {
            spec,
            product: product.into(),
            verbose: false,
            merged_static_library: None,
        }
    }

    /// Echo external commands while packaging.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Name of the consolidated static library produced by the last
    /// [`Packager::build_package`] call, if any.
    pub fn merged_static_library(&self) -> Option<&str> {
        self.merged_static_library.as_deref()
    }

    /// Builds the package directory and the compressed archive.
    ///
    /// Single configurations land their libraries in `lib/`; `Both` runs
    /// the library step twice, Release into `lib/` and Debug into
    /// `debug_lib/`, under one shared package directory and one archive.
    pub fn build_package(&mut self) -> Result<(), PackError> {
        let package_dir = self.spec.package_dir();
        let version_name = self.spec.version_name();

        remove_package_dir(&package_dir);

        match self.spec.configuration {
            Configuration::Debug | Configuration::Release => {
                self.package_libs(self.spec.configuration, &package_dir, "lib")?;
            }
            Configuration::Both => {
                self.package_libs(Configuration::Release, &package_dir, "lib")?;
                self.package_libs(Configuration::Debug, &package_dir, "debug_lib")?;
            }
        }

        self.package_support(&package_dir)?;

        let meta = create_pack_meta(&self.spec, &self.product, self.merged_static_library());
        write_pack_meta(&package_dir, &meta)?;

        self.make_archive(&version_name)
    }

    /// Merges and copies one configuration's build outputs into
    /// `<package_dir>/<lib_subdir>`.
    fn package_libs(
        &mut self,
        configuration: Configuration,
        package_dir: &Path,
        lib_subdir: &str,
    ) -> Result<(), PackError> {
        let out_dir = self.spec.out_dir(configuration);
        let lib_dir = package_dir.join(lib_subdir);
        println!("Packaging {configuration} libraries from {}", out_dir.display());

        match self.spec.platform {
            Platform::LinuxX64 | Platform::LinuxAndroidArmeabiV7a => {
                self.merge_objects(&out_dir, &lib_dir, &[Matcher::suffix(".o")], true)?;
                let shared = collect_files(&out_dir, &[Matcher::suffix(".so")])?;
                copy_files(&out_dir, &lib_dir, &shared, false);
            }
            Platform::Osx => {
                self.merge_objects(&out_dir, &lib_dir, &[Matcher::suffix(".o")], true)?;
                let shared = collect_files(&out_dir, &[Matcher::suffix(".dylib")])?;
                copy_files(&out_dir, &lib_dir, &shared, false);
            }
            Platform::Win32 => {
                self.merge_objects(&out_dir, &lib_dir, &[Matcher::suffix(".lib")], false)?;
                // .dll plus its satellites (.dll.lib, .dll.pdb, ...) and
                // standalone symbol files.
                let matchers = [Matcher::pattern(r".*\.dll.*")?, Matcher::suffix(".pdb")];
                let shared = collect_files(&out_dir, &matchers)?;
                copy_files(&out_dir, &lib_dir, &shared, false);
            }
        }
        Ok(())
    }

    /// Collects the platform's mergeable inputs and consolidates them into
    /// the single static library, remembering its name.
    fn merge_objects(
        &mut self,
        out_dir: &Path,
        lib_dir: &Path,
        matchers: &[Matcher],
        exclude_examples: bool,
    ) -> Result<(), PackError> {
        let mut inputs = collect_files(out_dir, matchers)?;
        if exclude_examples {
            inputs.retain(|path| !path.to_string_lossy().contains("example"));
        }

        let merged = self.spec.platform.merged_library_name(&self.product);
        merge_libraries(
            self.spec.platform,
            &inputs,
            out_dir,
            &lib_dir.join(&merged),
            self.verbose,
        )?;
        self.merged_static_library = Some(merged);
        Ok(())
    }

    /// Gathers headers and license files from the source tree into the
    /// package's `include/` and `licenses/` subtrees.
    fn package_support(&self, package_dir: &Path) -> Result<(), PackError> {
        let header_matchers: Vec<Matcher> =
            HEADER_SUFFIXES.iter().map(|s| Matcher::suffix(s)).collect();
        let license_matchers: Vec<Matcher> =
            LICENSE_SUFFIXES.iter().map(|s| Matcher::suffix(s)).collect();

        for subdir in SUPPORT_SUBDIRS {
            let src = self.spec.src_dir().join(subdir);

            let headers = collect_files(&src, &header_matchers)?;
            copy_files(&src, &package_dir.join("include").join(subdir), &headers, true);

            let licenses = collect_files(&src, &license_matchers)?;
            copy_files(&src, &package_dir.join("licenses").join(subdir), &licenses, true);
        }
        Ok(())
    }

    /// Produces `<product>-<version_name>-<platform>.tar.gz` next to the
    /// package directory.
    fn make_archive(&self, version_name: &str) -> Result<(), PackError> {
        let archive_name = format!(
            "{}-{}-{}.tar.gz",
            self.product, version_name, self.spec.platform
        );
        println!("Archiving {archive_name}");

        let mut cmd = Command::new("cmake");
        cmd.args(["-E", "tar", "cvzf"])
            .arg(&archive_name)
            .arg(version_name)
            .current_dir(&self.spec.build_root);
        run_tool(cmd, "cmake -E tar", self.verbose)
    }
}

/// Removes a stale package directory; a missing directory is a no-op.
fn remove_package_dir(package_dir: &Path) {
    if let Err(e) = fs::remove_dir_all(package_dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            eprintln!("Warning: could not remove {:?} ({e})", package_dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_spec;
    use tempfile::TempDir;

    #[test]
    fn archive_name_embeds_product_version_and_platform() {
        let dir = TempDir::new().unwrap();
        let spec = test_spec(dir.path(), Platform::LinuxX64, Configuration::Release);
        let packager = Packager::new(spec, "webrtc");
        assert_eq!(
            format!(
                "{}-{}-{}.tar.gz",
                packager.product,
                packager.spec.version_name(),
                packager.spec.platform
            ),
            "webrtc-20170131_ac61b745-Release-linux-x64.tar.gz"
        );
    }

    #[test]
    fn merged_library_is_unset_until_packaging_runs() {
        let dir = TempDir::new().unwrap();
        let spec = test_spec(dir.path(), Platform::Win32, Configuration::Both);
        let packager = Packager::new(spec, "webrtc");
        assert!(packager.merged_static_library().is_none());
    }

    #[test]
    fn remove_package_dir_tolerates_missing_directory() {
        let dir = TempDir::new().unwrap();
        remove_package_dir(&dir.path().join("never-created"));

        let real = dir.path().join("stale");
        fs::create_dir_all(real.join("lib")).unwrap();
        remove_package_dir(&real);
        assert!(!real.exists());
    }

    #[test]
    fn merge_inputs_exclude_example_objects() {
        // Exercises the collection + filter path of package_libs without
        // spawning the librarian: replicate the exact selection logic.
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("Release");
        for rel in ["a.o", "b.o", "examples/c.o", "obj/example_player.o"] {
            let path = out_dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        let mut inputs = collect_files(&out_dir, &[Matcher::suffix(".o")]).unwrap();
        inputs.retain(|path| !path.to_string_lossy().contains("example"));
        let names: Vec<String> = {
            let mut v: Vec<String> = inputs
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            v.sort();
            v
        };
        assert_eq!(names, vec!["a.o", "b.o"]);
    }

    #[test]
    fn support_files_land_under_include_and_licenses() {
        let dir = TempDir::new().unwrap();
        let spec = test_spec(dir.path(), Platform::LinuxX64, Configuration::Release);
        let src = spec.src_dir();
        for (rel, contents) in [
            ("webrtc/api/peer.h", "header"),
            ("webrtc/api/peer.cc", "impl"),
            ("third_party/opus/LICENSE", "license"),
            ("third_party/libvpx/vpx/vp8.h", "header"),
        ] {
            let path = src.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        let package_dir = dir.path().join("pkg");
        let packager = Packager::new(spec, "webrtc");
        packager.package_support(&package_dir).unwrap();

        assert!(package_dir.join("include/webrtc/api/peer.h").is_file());
        assert!(!package_dir.join("include/webrtc/api/peer.cc").exists());
        assert!(package_dir.join("include/third_party/libvpx/vpx/vp8.h").is_file());
        assert!(package_dir.join("licenses/third_party/opus/LICENSE").is_file());
    }
}
