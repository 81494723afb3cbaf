//! Filepath: src/core/special.rs
//! Locates well-known documentation/rules files at the repository root.
//!
//! Oversized or unreadable files are skipped without error: the scan is
//! best-effort and never fails the pipeline.

use std::path::Path;

use camino::Utf8PathBuf;

use crate::core::model::{SpecialFile, SpecialFileType};
use crate::infra::io::ContentProvider;

/// Content above this size is never inlined into the index.
pub const SPECIAL_FILE_CAP: u64 = 64 * 1024; // 64 KiB

/// Fixed list of root filenames checked for existence, in scan order.
const WELL_KNOWN: &[(&str, SpecialFileType)] = &[
    ("AGENTS.md", SpecialFileType::AgentsDoc),
    (".cursorrules", SpecialFileType::CursorRules),
    (".windsurfrules", SpecialFileType::WindsurfRules),
    ("README.md", SpecialFileType::Readme),
    ("README", SpecialFileType::Readme),
    ("readme.md", SpecialFileType::Readme),
];

/// Conventional rules subdirectory; every markdown file inside counts.
const RULES_DIR: &str = ".rules";

/// Scan `root` for well-known files. At most one readme entry is kept
/// (the first spelling that exists).
pub fn scan(root: &Path, provider: &dyn ContentProvider) -> Vec<SpecialFile> {
    let mut out = Vec::new();
    let mut seen_readme = false;

    for &(name, file_type) in WELL_KNOWN {
        if file_type == SpecialFileType::Readme && seen_readme {
            continue;
        }
        let Ok(content) = provider.read_capped(&root.join(name), SPECIAL_FILE_CAP) else {
            continue;
        };
        if file_type == SpecialFileType::Readme {
            seen_readme = true;
        }
        out.push(SpecialFile {
            path: Utf8PathBuf::from(name),
            file_type,
            content,
        });
    }

    // Rules directory: best-effort listing, sorted for determinism.
    let rules_dir = root.join(RULES_DIR);
    if let Ok(entries) = std::fs::read_dir(&rules_dir) {
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.ends_with(".md"))
            .collect();
        names.sort();

        for name in names {
            let Ok(content) = provider.read_capped(&rules_dir.join(&name), SPECIAL_FILE_CAP)
            else {
                continue;
            };
            out.push(SpecialFile {
                path: Utf8PathBuf::from(format!("{RULES_DIR}/{name}")),
                file_type: SpecialFileType::AgentsDoc,
                content,
            });
        }
    }

    out
}
