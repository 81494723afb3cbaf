//! Filepath: src/core/modules.rs
//! Directory-based module grouping with purpose inference.
//!
//! Runs strictly after all per-file metadata is finalized, since it
//! aggregates the full set. Grouping uses a BTreeMap so bucket iteration
//! is deterministic regardless of input order.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;

use crate::core::model::{FileMetadata, FileType, ModuleMap};

/// Cap on aggregated keywords per module, insertion order.
pub const MAX_MODULE_KEYWORDS: usize = 30;

/// Exact directory-name → purpose table, checked first.
const DIR_PURPOSES: &[(&str, &str)] = &[
    ("components", "UI components"),
    ("component", "UI components"),
    ("pages", "UI components"),
    ("views", "UI components"),
    ("routes", "Route definitions"),
    ("services", "Service layer"),
    ("utils", "Utilities"),
    ("utilities", "Utilities"),
    ("helpers", "Utilities"),
    ("hooks", "Hooks"),
    ("store", "State management"),
    ("stores", "State management"),
    ("state", "State management"),
    ("models", "Data models"),
    ("schemas", "Schemas"),
    ("types", "Type definitions"),
    ("typings", "Type definitions"),
    ("config", "Configuration"),
    ("commands", "CLI commands"),
    ("cli", "CLI commands"),
    ("handlers", "Request handlers"),
    ("controllers", "Request handlers"),
    ("middleware", "Middleware"),
    ("tests", "Test suite"),
    ("test", "Test suite"),
    ("__tests__", "Test suite"),
    ("docs", "Documentation"),
    ("doc", "Documentation"),
];

/// Group finalized file metadata into purpose-tagged modules, sorted
/// descending by importance.
pub fn group(files: &[FileMetadata]) -> Vec<ModuleMap> {
    let mut buckets: BTreeMap<Utf8PathBuf, Vec<&FileMetadata>> = BTreeMap::new();

    for file in files {
        let dir = file
            .path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        buckets.entry(dir).or_default().push(file);
    }

    let mut modules: Vec<ModuleMap> = buckets
        .into_iter()
        // Single-file buckets carry no grouping signal, except the root.
        .filter(|(dir, members)| members.len() >= 2 || dir.as_str() == ".")
        .map(|(dir, members)| build_module(dir, &members))
        .collect();

    // Descending importance; path tiebreak keeps the order stable.
    modules.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });

    modules
}

fn build_module(dir: Utf8PathBuf, members: &[&FileMetadata]) -> ModuleMap {
    let mut keywords: IndexSet<String> = IndexSet::new();
    for member in members {
        for keyword in &member.keywords {
            keywords.insert(keyword.clone());
        }
    }

    let importance =
        members.iter().map(|m| m.importance).sum::<f64>() / members.len() as f64;

    let purpose = infer_purpose(&dir, members);

    ModuleMap {
        purpose,
        keywords: keywords.into_iter().take(MAX_MODULE_KEYWORDS).collect(),
        files: members.iter().map(|m| m.path.clone()).collect(),
        importance,
        path: dir,
    }
}

/// First-match purpose precedence: directory-name table, all-tests,
/// all-config, component keyword, generic fallback.
fn infer_purpose(dir: &Utf8Path, members: &[&FileMetadata]) -> String {
    let name = dir.file_name().unwrap_or(dir.as_str()).to_lowercase();
    if let Some((_, purpose)) = DIR_PURPOSES.iter().find(|(n, _)| *n == name) {
        return (*purpose).to_string();
    }

    if members.iter().all(|m| m.file_type == FileType::Test) {
        return "Test suite".to_string();
    }
    if members.iter().all(|m| m.file_type == FileType::Config) {
        return "Configuration files".to_string();
    }
    if members
        .iter()
        .any(|m| m.keywords.iter().any(|k| k.to_lowercase().contains("component")))
    {
        return "Component library".to_string();
    }

    "Module".to_string()
}
