//! Build-descriptor extraction: recover linked libraries and active
//! preprocessor defines from a generated ninja file.
//!
//! The generator wraps long declarations across physical lines with a `$`
//! continuation marker, so the file is scanned twice:
//!
//! - library names come from the RAW physical lines, because tokenizing
//!   before reassembly also catches library names embedded in linker-flag
//!   tokens;
//! - `defines =` assignments come from the reassembled logical lines,
//!   because a wrapped assignment is only recognizable once joined.
//!
//! Candidate defines are then cross-referenced against the source tree:
//! a define whose bare name appears anywhere in any file's content counts
//! as used. Presence in a single file is taken as sufficient evidence and
//! the define is never tested again — an approximation kept on purpose,
//! not a reference-counting analysis.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Configuration, PackError, PackageSpec, Platform};

/// File extensions that identify a library token.
pub const LIBRARY_EXTENSIONS: &[&str] = &[".lib", ".dll", ".a", ".so"];

/// Everything recovered from one descriptor file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DescriptorScan {
    /// Library file names in first-seen order.
    pub libraries: Vec<String>,
    /// Full define tokens (`-DNAME=value`) in first-seen order.
    pub defines: Vec<String>,
}

/// The generated descriptor file inspected for one run.
///
/// The path differs by platform, and `Both` falls back to the Release
/// build's descriptor.
pub fn descriptor_path(spec: &PackageSpec) -> PathBuf {
    let relative: &Path = match spec.platform {
        Platform::Osx => Path::new("obj/webrtc/webrtc_common.ninja"),
        _ => Path::new("obj/webrtc/examples/peerconnection_client.ninja"),
    };
    spec.out_dir(inspected_configuration(spec)).join(relative)
}

fn inspected_configuration(spec: &PackageSpec) -> Configuration {
    match spec.configuration {
        Configuration::Both => Configuration::Release,
        single => single,
    }
}

/// Joins `$`-continued physical lines into logical lines.
///
/// A line ending in `$` is merged with every following line up to and
/// including the first one that does not. Only the marker itself is
/// stripped; the whitespace before it survives, so token boundaries are
/// preserved.
pub fn aggregate_continuations(text: &str) -> Vec<String> {
    let mut logical = Vec::new();
    let mut acc = String::new();
    for line in text.lines() {
        match line.strip_suffix('$') {
            Some(body) => acc.push_str(body),
            None => {
                acc.push_str(line);
                logical.push(std::mem::take(&mut acc));
            }
        }
    }
    if !acc.is_empty() {
        logical.push(acc);
    }
    logical
}

/// Runs both scans over the descriptor text.
pub fn scan_descriptor(text: &str) -> DescriptorScan {
    DescriptorScan {
        libraries: extract_libraries(text),
        defines: extract_defines(&aggregate_continuations(text)),
    }
}

fn extract_libraries(text: &str) -> Vec<String> {
    let mut libraries: Vec<String> = Vec::new();
    for line in text.lines() {
        for token in line.split_whitespace() {
            if LIBRARY_EXTENSIONS.iter().any(|ext| token.ends_with(ext))
                && !libraries.iter().any(|known| known == token)
            {
                libraries.push(token.to_string());
            }
        }
    }
    libraries
}

fn extract_defines(logical_lines: &[String]) -> Vec<String> {
    let mut defines: Vec<String> = Vec::new();
    for line in logical_lines {
        let Some(payload) = defines_payload(line) else {
            continue;
        };
        for token in payload.split_whitespace() {
            if !defines.iter().any(|known| known == token) {
                defines.push(token.to_string());
            }
        }
    }
    defines
}

/// Payload of a `defines = ...` assignment, leading whitespace tolerated.
fn defines_payload(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("defines")?;
    let rest = rest.trim_start().strip_prefix('=')?;
    Some(rest.trim_start())
}

/// Bare name of a define token: the `-D` prefix and any `=value` suffix
/// stripped. Tokens without the prefix pass through unchanged.
pub fn define_name(define: &str) -> String {
    let stripped = define.strip_prefix("-D").unwrap_or(define);
    let name: String = stripped
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        stripped.to_string()
    } else {
        name
    }
}

/// Splits candidate defines into (used, unused) by scanning every file
/// under `roots` for each candidate's bare name.
///
/// Unreadable files and missing roots are skipped silently. Output keeps
/// the candidates' original order. The walk stops early once every
/// candidate has been seen.
pub fn partition_used_defines(roots: &[PathBuf], defines: &[String]) -> (Vec<String>, Vec<String>) {
    struct Candidate {
        name: String,
        define: String,
        used: bool,
    }

    let mut candidates: Vec<Candidate> = defines
        .iter()
        .map(|define| Candidate {
            name: define_name(define),
            define: define.clone(),
            used: false,
        })
        .collect();

    fn mark_tree(dir: &Path, candidates: &mut Vec<Candidate>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            if candidates.iter().all(|c| c.used) {
                return;
            }
            let path = entry.path();
            if path.is_dir() {
                mark_tree(&path, candidates);
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            for candidate in candidates.iter_mut().filter(|c| !c.used) {
                if content.contains(&candidate.name) {
                    candidate.used = true;
                }
            }
        }
    }

    for root in roots {
        if candidates.iter().all(|c| c.used) {
            break;
        }
        mark_tree(root, &mut candidates);
    }

    let mut used = Vec::new();
    let mut unused = Vec::new();
    for candidate in candidates {
        if candidate.used {
            used.push(candidate.define);
        } else {
            unused.push(candidate.define);
        }
    }
    (used, unused)
}

/// Renders the declarative manifest consumed by the downstream build
/// configuration.
///
/// When a merged static library exists it replaces the raw library set.
pub fn render_manifest(
    product: &str,
    merged_static_library: Option<&str>,
    libraries: &[String],
    used_defines: &[String],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("set({product}_LIBS\n"));
    match merged_static_library {
        Some(merged) => out.push_str(&format!("  {merged}\n")),
        None => {
            for library in libraries {
                out.push_str(&format!("  {library}\n"));
            }
        }
    }
    out.push_str(")\n");

    out.push_str(&format!("set({product}_DEFS\n"));
    for define in used_defines {
        out.push_str(&format!("  {define}\n"));
    }
    out.push_str(")\n");
    out
}

/// Reads the descriptor, cross-references defines against the source
/// tree, and writes the manifest to standard output.
///
/// A missing descriptor file is fatal: the build it describes should have
/// just been produced.
pub fn extract_build_settings(
    spec: &PackageSpec,
    product: &str,
    merged_static_library: Option<&str>,
) -> Result<(), PackError> {
    println!(
        "\nRetrieving build settings configuration for {}",
        inspected_configuration(spec)
    );

    let path = descriptor_path(spec);
    let text = fs::read_to_string(&path).map_err(|e| PackError::Descriptor {
        path: path.clone(),
        source: e,
    })?;
    let scan = scan_descriptor(&text);

    let roots = [
        spec.src_dir().join("third_party"),
        spec.src_dir().join("webrtc"),
    ];
    let (used, unused) = partition_used_defines(&roots, &scan.defines);

    print!(
        "{}",
        render_manifest(product, merged_static_library, &scan.libraries, &used)
    );
    println!("Unused defines: {}", unused.join(" "));
    Ok(())
}
