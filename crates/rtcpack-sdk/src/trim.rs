//! Third-party trimmer: reduce the vendored dependency tree to the entries
//! the packaged build actually needs.
//!
//! The trim is staged through three directory names so an interrupted run
//! can always be resumed:
//!
//! - `third_party` — the live tree
//! - `third_party.new` — the trimmed tree being assembled
//! - `third_party.old` — the pre-trim tree, kept for manual recovery
//!
//! Invariant: `third_party.old` only comes into existence after
//! `third_party.new` is fully populated, so on re-run the presence of
//! `.old` means the copy finished and only the final rename can be
//! outstanding. `.old` is never removed automatically.

use std::fs;
use std::path::Path;

use crate::fileset::copy_dir_recursive;
use crate::types::{PackError, Platform};

/// Dependencies every platform keeps.
pub const BASELINE_ALLOW_LIST: &[&str] = &[
    "boringssl",
    "expat",
    "gflags",
    "jsoncpp",
    "libjpeg_turbo",
    "libsrtp",
    "libvpx",
    "libyuv",
    "opus",
    "protobuf",
    "usrsctp",
    "yasm",
];

/// The full allow-list for one platform: the baseline, the platform's own
/// additions, then any extras from the project configuration.
pub fn allow_list(platform: Platform, extras: &[String]) -> Vec<String> {
    let mut entries: Vec<String> = BASELINE_ALLOW_LIST.iter().map(|s| s.to_string()).collect();
    match platform {
        Platform::Osx => {
            entries.extend(["llvm-build", "openmax_dl", "ocmock"].map(String::from));
        }
        Platform::Win32 => {
            entries.push("winsdk_samples".to_string());
        }
        Platform::LinuxX64 | Platform::LinuxAndroidArmeabiV7a => {}
    }
    entries.extend(extras.iter().cloned());
    entries
}

/// Trims `<src_dir>/third_party` down to the allow-list plus `BUILD.gn`.
///
/// Safe to re-run at any point: a run interrupted during the copy is
/// rebuilt from scratch, and a run interrupted between the two renames is
/// finished by the second (idempotent) rename alone. Running against an
/// already-trimmed tree is a no-op apart from that second rename check.
pub fn trim_third_party(
    src_dir: &Path,
    platform: Platform,
    extras: &[String],
) -> Result<(), PackError> {
    let third_party = src_dir.join("third_party");
    let old_dir = src_dir.join("third_party.old");
    let new_dir = src_dir.join("third_party.new");

    if !old_dir.is_dir() && third_party.is_dir() {
        // No .old yet: either a fresh run or one that died mid-copy.
        // Any partial .new is stale and rebuilt from scratch.
        let _ = fs::remove_dir_all(&new_dir);
        fs::create_dir_all(&new_dir)?;

        copy_entry(&third_party.join("BUILD.gn"), &new_dir)?;
        for entry in allow_list(platform, extras) {
            copy_entry(&third_party.join(&entry), &new_dir)?;
        }

        fs::rename(&third_party, &old_dir)?;
    }

    if new_dir.is_dir() {
        fs::rename(&new_dir, &third_party)?;
    }

    Ok(())
}

fn copy_entry(src: &Path, dest_dir: &Path) -> Result<(), PackError> {
    let Some(file_name) = src.file_name() else {
        return Ok(());
    };
    let dest = dest_dir.join(file_name);
    if src.is_dir() {
        copy_dir_recursive(src, &dest)?;
    } else {
        fs::copy(src, &dest)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn seed_third_party(src_dir: &Path, platform: Platform) {
        let third_party = src_dir.join("third_party");
        fs::create_dir_all(&third_party).unwrap();
        fs::write(third_party.join("BUILD.gn"), "config").unwrap();
        for entry in allow_list(platform, &[]) {
            let dir = third_party.join(&entry);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("BUILD.gn"), entry).unwrap();
        }
        // Entries that must be trimmed away.
        for junk in ["android_tools", "icu", "WebKit"] {
            let dir = third_party.join(junk);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("README"), junk).unwrap();
        }
    }

    fn entries(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    fn expected_entries(platform: Platform, extras: &[String]) -> BTreeSet<String> {
        let mut expected: BTreeSet<String> = allow_list(platform, extras).into_iter().collect();
        expected.insert("BUILD.gn".to_string());
        expected
    }

    #[test]
    fn platform_additions() {
        let base = allow_list(Platform::LinuxX64, &[]);
        assert_eq!(base.len(), BASELINE_ALLOW_LIST.len());

        let mac = allow_list(Platform::Osx, &[]);
        assert!(mac.contains(&"ocmock".to_string()));

        let win = allow_list(Platform::Win32, &[]);
        assert!(win.contains(&"winsdk_samples".to_string()));
        assert!(!base.contains(&"winsdk_samples".to_string()));

        let extra = allow_list(Platform::LinuxX64, &["ffmpeg".to_string()]);
        assert!(extra.contains(&"ffmpeg".to_string()));
    }

    #[test]
    fn trims_to_allow_list_and_keeps_old_tree() {
        let dir = TempDir::new().unwrap();
        seed_third_party(dir.path(), Platform::LinuxX64);

        trim_third_party(dir.path(), Platform::LinuxX64, &[]).unwrap();

        let third_party = dir.path().join("third_party");
        assert_eq!(entries(&third_party), expected_entries(Platform::LinuxX64, &[]));

        // The pre-trim tree is retained under .old, untouched.
        let old_dir = dir.path().join("third_party.old");
        assert!(old_dir.join("android_tools/README").is_file());
        assert!(!dir.path().join("third_party.new").exists());
    }

    #[test]
    fn rerun_on_trimmed_tree_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        seed_third_party(dir.path(), Platform::LinuxX64);

        trim_third_party(dir.path(), Platform::LinuxX64, &[]).unwrap();
        let before = entries(&dir.path().join("third_party"));
        trim_third_party(dir.path(), Platform::LinuxX64, &[]).unwrap();
        let after = entries(&dir.path().join("third_party"));

        assert_eq!(before, after);
        assert!(dir.path().join("third_party.old").is_dir());
    }

    #[test]
    fn resumes_after_interrupt_between_renames() {
        // Simulate a run that finished the copy and the rename to .old but
        // was killed before renaming .new into place.
        let dir = TempDir::new().unwrap();
        seed_third_party(dir.path(), Platform::LinuxX64);

        let third_party = dir.path().join("third_party");
        let new_dir = dir.path().join("third_party.new");
        fs::create_dir_all(&new_dir).unwrap();
        fs::write(new_dir.join("BUILD.gn"), "config").unwrap();
        for entry in allow_list(Platform::LinuxX64, &[]) {
            let sub = new_dir.join(&entry);
            fs::create_dir_all(&sub).unwrap();
        }
        fs::rename(&third_party, dir.path().join("third_party.old")).unwrap();

        trim_third_party(dir.path(), Platform::LinuxX64, &[]).unwrap();

        assert_eq!(
            entries(&dir.path().join("third_party")),
            expected_entries(Platform::LinuxX64, &[])
        );
        assert!(!dir.path().join("third_party.new").exists());
    }

    #[test]
    fn stale_partial_new_is_rebuilt() {
        // A run killed mid-copy leaves .new but no .old; the next run must
        // wipe and rebuild it rather than trusting partial contents.
        let dir = TempDir::new().unwrap();
        seed_third_party(dir.path(), Platform::LinuxX64);

        let new_dir = dir.path().join("third_party.new");
        fs::create_dir_all(new_dir.join("half-copied")).unwrap();

        trim_third_party(dir.path(), Platform::LinuxX64, &[]).unwrap();

        let third_party = dir.path().join("third_party");
        assert!(!third_party.join("half-copied").exists());
        assert_eq!(entries(&third_party), expected_entries(Platform::LinuxX64, &[]));
    }
}
