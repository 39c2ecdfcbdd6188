//! Library merging: consolidate many object/library files into one static
//! archive.
//!
//! Each platform uses its native librarian:
//!
//! | Platform | Tool | Invocation style |
//! |----------|------|------------------|
//! | Linux / Android | `ar` | scripted `-M` session on stdin |
//! | macOS | `libtool` | `-filelist` response file |
//! | Windows | `lib.exe` | positional arguments |
//!
//! Member order in the resulting archive follows input order exactly; no
//! deduplication or sorting happens here, because member order affects
//! symbol resolution when the downstream build links the merged archive.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::process::{run_tool, run_tool_with_stdin};
use crate::types::{PackError, Platform};

/// Merges `inputs` (paths relative to `src_dir`) into one static archive at
/// `dest`, creating intermediate directories first.
///
/// A non-zero exit from the underlying tool is fatal.
pub fn merge_libraries(
    platform: Platform,
    inputs: &[PathBuf],
    src_dir: &Path,
    dest: &Path,
    verbose: bool,
) -> Result<(), PackError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    match platform {
        Platform::LinuxX64 | Platform::LinuxAndroidArmeabiV7a => {
            let script = ar_script(inputs, src_dir, dest);
            let mut cmd = Command::new("ar");
            cmd.arg("-M");
            run_tool_with_stdin(cmd, "ar", &script, verbose)
        }
        Platform::Osx => {
            let rsp = write_response_file(inputs, src_dir)?;
            let mut cmd = Command::new("libtool");
            cmd.arg("-static")
                .arg("-o")
                .arg(dest)
                .arg("-filelist")
                .arg(&rsp);
            run_tool(cmd, "libtool", verbose)
        }
        Platform::Win32 => {
            let mut cmd = Command::new("lib.exe");
            cmd.arg(format!("/OUT:{}", dest.display()));
            for input in inputs {
                cmd.arg(src_dir.join(input));
            }
            run_tool(cmd, "lib.exe", verbose)
        }
    }
}

/// Builds the `ar -M` session script: create the destination, add each
/// member in list order, save, end.
fn ar_script(inputs: &[PathBuf], src_dir: &Path, dest: &Path) -> String {
    let mut script = String::new();
    script.push_str(&format!("create {}\n", dest.display()));
    for input in inputs {
        script.push_str(&format!("addmod {}\n", src_dir.join(input).display()));
    }
    script.push_str("save\nend\n");
    script
}

/// Writes the absolute input paths to a uniquely-named response file, one
/// per line, and persists it.
///
/// The file is deliberately not deleted after the merge; it lives in the
/// system temp directory under a unique name and is left to OS cleanup.
fn write_response_file(inputs: &[PathBuf], src_dir: &Path) -> Result<PathBuf, PackError> {
    let mut file = tempfile::Builder::new()
        .prefix("rtcpack-merge-")
        .suffix(".rsp")
        .tempfile()?;
    let listing = inputs
        .iter()
        .map(|input| src_dir.join(input).display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    file.write_all(listing.as_bytes())?;
    file.into_temp_path()
        .keep()
        .map_err(|e| PackError::Io(e.error))
}
