//! Filepath: src/core/keywords.rs
//! Per-language keyword, export, and dependency extraction.
//!
//! Extraction is pattern-based and best-effort: no AST is built, and a
//! file that defeats the regexes simply yields fewer keywords. Dispatch
//! is a strategy table keyed by normalized extension with an explicit
//! generic fallback, so new-language support is additive.
//!
//! The combined keyword set keeps the first `MAX_KEYWORDS` entries in
//! insertion order. No relevance ranking is applied; downstream output
//! depends on that order, so do not re-rank here.

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

/// Cap on keywords kept per file, in insertion order.
pub const MAX_KEYWORDS: usize = 20;

const MIN_WORD_LEN: usize = 3;

/// Words too generic to be useful keywords.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "that", "this", "with", "from", "into", "are", "was", "has", "have",
    "const", "let", "var", "function", "class", "return", "import", "export", "default", "async",
    "await", "pub", "use", "mod", "impl", "self", "super", "crate", "type", "interface", "enum",
    "struct", "trait", "static", "void", "null", "true", "false", "none", "def", "pass", "else",
    "match", "new", "get", "set", "mut", "where", "while", "loop", "string", "number", "boolean",
];

/// Everything extracted from one file in a single pass.
#[derive(Debug, Default, Clone)]
pub struct Extraction {
    pub keywords: Vec<String>,
    pub exports: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Rust,
    JsTs,
    Python,
    Go,
    /// Identifier harvest for unrecognized extensions.
    Generic,
}

fn strategy_for(path: &Path) -> Strategy {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "rs" => Strategy::Rust,
        "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => Strategy::JsTs,
        "py" => Strategy::Python,
        "go" => Strategy::Go,
        _ => Strategy::Generic,
    }
}

// --- JS/TS patterns ---

static JS_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*export\s+(?:default\s+)?(?:abstract\s+)?(?:async\s+)?(?:function|class|const|let|var|interface|type|enum)\s+([A-Za-z_$][\w$]*)",
    )
    .unwrap()
});
static JS_CJS_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=").unwrap());
static JS_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:const|let|var|function|class)\s+([A-Za-z_$][\w$]*)").unwrap()
});
static JS_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:import\s+[^'"]*?from\s*|import\s*|require\(\s*)['"]([^'"]+)['"]"#).unwrap()
});

// --- Rust patterns ---

static RUST_PUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*pub(?:\([^)]*\))?\s+(?:async\s+)?(?:unsafe\s+)?(?:fn|struct|enum|trait|mod|const|static|type)\s+([A-Za-z_]\w*)",
    )
    .unwrap()
});
static RUST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:fn|struct|enum|trait)\s+([A-Za-z_]\w*)")
        .unwrap()
});
static RUST_USE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*use\s+([A-Za-z_]\w*)").unwrap());

// --- Python patterns ---

static PY_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:async\s+)?(?:def|class)\s+([A-Za-z_]\w*)").unwrap());
static PY_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:from\s+([A-Za-z_][\w.]*)\s+import|import\s+([A-Za-z_][\w.]*))")
        .unwrap()
});

// --- Go patterns ---

static GO_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:func\s+(?:\([^)]*\)\s*)?|type\s+)([A-Za-z_]\w*)").unwrap()
});
static GO_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([a-z][\w.\-]*(?:/[\w.\-]+)*)""#).unwrap());

// --- Generic fallback ---

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]{2,}").unwrap());

/// Extract keywords, exports, and dependencies for one file.
pub fn extract(path: &Path, content: &str) -> Extraction {
    let strategy = strategy_for(path);
    let exports = exports_for(strategy, content);
    let dependencies = dependencies_for(strategy, content);

    let mut keywords: IndexSet<String> = IndexSet::new();

    // Exported symbols and type names come first: they carry the most
    // signal and must survive the cap.
    for name in &exports {
        insert_word(&mut keywords, name);
    }

    // Named bindings and other declarations.
    for name in bindings_for(strategy, content) {
        insert_word(&mut keywords, &name);
    }

    // Dependency names double as keywords ("react", "axum", ...).
    for dep in &dependencies {
        insert_word(&mut keywords, dep);
    }

    // Filename-derived words are always added.
    for word in filename_words(path) {
        insert_word(&mut keywords, &word);
    }

    let keywords = keywords.into_iter().take(MAX_KEYWORDS).collect();

    Extraction { keywords, exports, dependencies }
}

/// Filename-derived keywords only, for files whose content is never
/// read (below the extraction gate or unreadable).
pub fn filename_keywords(path: &Path) -> Vec<String> {
    let mut set: IndexSet<String> = IndexSet::new();
    for word in filename_words(path) {
        insert_word(&mut set, &word);
    }
    set.into_iter().take(MAX_KEYWORDS).collect()
}

/// Just the exported/public symbol names.
pub fn extract_exports(path: &Path, content: &str) -> Vec<String> {
    exports_for(strategy_for(path), content)
}

/// Just the import/require targets, normalized to package names.
pub fn extract_dependencies(path: &Path, content: &str) -> Vec<String> {
    dependencies_for(strategy_for(path), content)
}

fn exports_for(strategy: Strategy, content: &str) -> Vec<String> {
    let mut out: IndexSet<String> = IndexSet::new();
    match strategy {
        Strategy::JsTs => {
            for cap in JS_EXPORT.captures_iter(content) {
                out.insert(cap[1].to_string());
            }
            for cap in JS_CJS_EXPORT.captures_iter(content) {
                out.insert(cap[1].to_string());
            }
        }
        Strategy::Rust => {
            for cap in RUST_PUB.captures_iter(content) {
                out.insert(cap[1].to_string());
            }
        }
        Strategy::Python => {
            for cap in PY_DEF.captures_iter(content) {
                let name = &cap[1];
                // Leading underscore marks a private definition.
                if !name.starts_with('_') {
                    out.insert(name.to_string());
                }
            }
        }
        Strategy::Go => {
            for cap in GO_DECL.captures_iter(content) {
                let name = &cap[1];
                // Only capitalized identifiers are exported in Go.
                if name.chars().next().is_some_and(char::is_uppercase) {
                    out.insert(name.to_string());
                }
            }
        }
        Strategy::Generic => {}
    }
    out.into_iter().collect()
}

fn dependencies_for(strategy: Strategy, content: &str) -> Vec<String> {
    let mut out: IndexSet<String> = IndexSet::new();
    match strategy {
        Strategy::JsTs => {
            for cap in JS_IMPORT.captures_iter(content) {
                if let Some(pkg) = normalize_js_package(&cap[1]) {
                    out.insert(pkg);
                }
            }
        }
        Strategy::Rust => {
            for cap in RUST_USE.captures_iter(content) {
                let root = &cap[1];
                if !matches!(root, "crate" | "self" | "super" | "std" | "core" | "alloc") {
                    out.insert(root.to_string());
                }
            }
        }
        Strategy::Python => {
            for cap in PY_IMPORT.captures_iter(content) {
                let target = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str());
                if let Some(target) = target {
                    // "pkg.sub.mod" → "pkg"
                    let root = target.split('.').next().unwrap_or(target);
                    out.insert(root.to_string());
                }
            }
        }
        Strategy::Go => {
            for cap in GO_IMPORT.captures_iter(content) {
                out.insert(cap[1].to_string());
            }
        }
        Strategy::Generic => {}
    }
    out.into_iter().collect()
}

fn bindings_for(strategy: Strategy, content: &str) -> Vec<String> {
    let mut out: IndexSet<String> = IndexSet::new();
    match strategy {
        Strategy::JsTs => {
            for cap in JS_BINDING.captures_iter(content) {
                out.insert(cap[1].to_string());
            }
        }
        Strategy::Rust => {
            for cap in RUST_ITEM.captures_iter(content) {
                out.insert(cap[1].to_string());
            }
        }
        Strategy::Python => {
            for cap in PY_DEF.captures_iter(content) {
                out.insert(cap[1].to_string());
            }
        }
        Strategy::Go => {
            for cap in GO_DECL.captures_iter(content) {
                out.insert(cap[1].to_string());
            }
        }
        Strategy::Generic => {
            for m in IDENTIFIER.find_iter(content).take(64) {
                out.insert(m.as_str().to_string());
            }
        }
    }
    out.into_iter().collect()
}

/// Collapse an import specifier to its package name. Relative imports
/// yield `None`; scoped packages keep their two-segment form.
fn normalize_js_package(specifier: &str) -> Option<String> {
    if specifier.starts_with('.') || specifier.starts_with('/') {
        return None;
    }
    let specifier = specifier.strip_prefix("node:").unwrap_or(specifier);
    if let Some(rest) = specifier.strip_prefix('@') {
        let mut segments = rest.splitn(3, '/');
        let scope = segments.next()?;
        let name = segments.next()?;
        return Some(format!("@{scope}/{name}"));
    }
    specifier.split('/').next().map(str::to_string)
}

/// Split a filename into words on case transitions, hyphens, underscores,
/// and dots.
fn filename_words(path: &Path) -> Vec<String> {
    let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
        return Vec::new();
    };

    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in stem.chars() {
        if ch == '-' || ch == '_' || ch == '.' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        // camelCase boundary: lower → upper starts a new word
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn insert_word(set: &mut IndexSet<String>, word: &str) {
    let lower = word.to_lowercase();
    if word.len() < MIN_WORD_LEN || STOP_WORDS.contains(&lower.as_str()) {
        return;
    }
    set.insert(word.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_exports_and_imports() {
        let content = r#"
import React from 'react';
import { deep } from '@scope/pkg/lib/deep';
import fs from 'node:fs';
const helper = require('lodash/fp');
import local from './local';

export default function HomePage() {}
export const API_URL = 'x';
export class DataStore {}
"#;
        let path = Path::new("src/HomePage.tsx");

        let exports = extract_exports(path, content);
        assert_eq!(exports, vec!["HomePage", "API_URL", "DataStore"]);

        let deps = extract_dependencies(path, content);
        assert_eq!(deps, vec!["react", "@scope/pkg", "fs", "lodash"]);
    }

    #[test]
    fn test_rust_pub_items_and_uses() {
        let content = r#"
use anyhow::Result;
use crate::core::model;
use std::path::Path;
use serde::Serialize;

pub struct Indexer;
pub(crate) fn helper() {}
pub async fn run() {}
fn private_only() {}
"#;
        let path = Path::new("src/indexer.rs");

        let exports = extract_exports(path, content);
        assert_eq!(exports, vec!["Indexer", "helper", "run"]);

        let deps = extract_dependencies(path, content);
        assert_eq!(deps, vec!["anyhow", "serde"]);
    }

    #[test]
    fn test_python_definitions_skip_private() {
        let content = "import os.path\nfrom requests import get\n\ndef fetch():\n    pass\n\ndef _internal():\n    pass\n\nclass Client:\n    pass\n";
        let path = Path::new("client.py");

        assert_eq!(extract_exports(path, content), vec!["fetch", "Client"]);
        assert_eq!(extract_dependencies(path, content), vec!["os", "requests"]);
    }

    #[test]
    fn test_go_exported_identifiers_only() {
        let content = "package server\n\nimport (\n\t\"net/http\"\n\t\"github.com/gin-gonic/gin\"\n)\n\nfunc Serve() {}\nfunc helper() {}\ntype Router struct{}\n";
        let path = Path::new("server.go");

        assert_eq!(extract_exports(path, content), vec!["Serve", "Router"]);
        let deps = extract_dependencies(path, content);
        assert!(deps.contains(&"net/http".to_string()));
        assert!(deps.contains(&"github.com/gin-gonic/gin".to_string()));
    }

    #[test]
    fn test_keyword_cap_preserves_insertion_order() {
        let mut content = String::new();
        for i in 0..40 {
            content.push_str(&format!("pub fn function_number_{i:02}() {{}}\n"));
        }
        let extraction = extract(Path::new("src/many.rs"), &content);

        assert_eq!(extraction.keywords.len(), MAX_KEYWORDS);
        // First 20 in declaration order, untouched by any ranking.
        assert_eq!(extraction.keywords[0], "function_number_00");
        assert_eq!(extraction.keywords[19], "function_number_19");
    }

    #[test]
    fn test_filename_words_split_and_filter() {
        let words = filename_words(Path::new("src/userProfile-card_view.ts"));
        assert_eq!(words, vec!["user", "Profile", "card", "view"]);

        // Short words and stop words never make it into the set.
        let extraction = extract(Path::new("a/of.xyz"), "");
        assert!(extraction.keywords.is_empty());
    }

    #[test]
    fn test_generic_fallback_harvests_identifiers() {
        let extraction = extract(
            Path::new("schema.graphql"),
            "type Query { userAccount: Account }",
        );
        assert!(extraction.keywords.contains(&"Query".to_string()));
        assert!(extraction.keywords.contains(&"userAccount".to_string()));
        assert!(extraction.exports.is_empty());
    }
}
