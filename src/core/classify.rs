//! Filepath: src/core/classify.rs
//! Ignore-pattern matching, category assignment, and importance scoring.
//!
//! The ignore rule set is explicit data handed to the classifier, not a
//! module-level singleton, so tests can substitute their own tables. A
//! themed-content platform override is checked before the ignore set:
//! template files on such platforms are kept even when a sibling vendor
//! or cache directory is ignored.

use std::path::Path;

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::core::model::FileType;

/// Platform detected from marker files at the repository root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// A themed content system: templates/layouts/sections own the site.
    ThemedContent,
}

/// Default ignore globs: build output, dependency caches, VCS metadata,
/// IDE state, logs, coverage, minified bundles.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    "coverage",
    ".nyc_output",
    "vendor",
    ".next",
    ".nuxt",
    ".cache",
    "*.log",
    "*.pyc",
    "*.min.js",
    "*.min.css",
    "*.map",
    ".DS_Store",
    "Thumbs.db",
];

/// Template globs kept on themed-content platforms, overriding the
/// default ignore set entirely when one matches.
const TEMPLATE_KEEP_PATTERNS: &[&str] = &[
    "templates/**",
    "layouts/**",
    "layout/**",
    "sections/**",
    "snippets/**",
    "assets/**",
    "content/**",
    "config/*.json",
];

/// Filenames that mark a likely program entry point or project anchor.
const ANCHOR_FILENAMES: &[&str] = &[
    "main.rs",
    "lib.rs",
    "index.js",
    "index.ts",
    "index.jsx",
    "index.tsx",
    "app.js",
    "app.ts",
    "main.py",
    "__main__.py",
    "main.go",
    "server.js",
    "server.ts",
    "package.json",
    "cargo.toml",
    "pyproject.toml",
    "go.mod",
    "readme.md",
    "readme",
];

const CONFIG_FILENAMES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "cargo.toml",
    "cargo.lock",
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "requirements.txt",
    "go.mod",
    "go.sum",
    "tsconfig.json",
    "jsconfig.json",
    "babel.config.js",
    "webpack.config.js",
    "rollup.config.js",
    "vite.config.js",
    "vite.config.ts",
    "jest.config.js",
    "vitest.config.ts",
    "eslint.config.js",
    ".eslintrc",
    ".eslintrc.json",
    ".prettierrc",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "makefile",
    "justfile",
    ".env",
    ".env.example",
];

const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "ini", "conf", "properties"];

const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt", "adoc", "org"];

const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "js", "jsx", "ts", "tsx", "mjs", "cjs", "py", "go", "rb", "java", "kt", "swift", "c",
    "cc", "cpp", "cxx", "h", "hpp", "cs", "php", "scala", "ex", "exs", "erl", "hs", "ml", "zig",
    "lua", "sh", "bash", "liquid", "vue", "svelte", "astro", "html", "css", "scss", "sass",
    "less", "sql", "graphql", "proto",
];

/// Context for one classification pass.
pub struct ClassifyContext {
    pub platform: Option<Platform>,
    all_patterns: Vec<String>,
    ignore_exact: Vec<String>,
    ignore_globs: GlobSet,
    template_keep: GlobSet,
}

impl ClassifyContext {
    /// Build a context from default + caller ignore patterns. Patterns
    /// without glob metacharacters match exact names and directory
    /// prefixes; the rest compile into a glob set.
    pub fn new(extra_ignores: &[String], platform: Option<Platform>) -> Result<Self> {
        let mut exact = Vec::new();
        let mut globs = GlobSetBuilder::new();
        let all_patterns: Vec<String> = DEFAULT_IGNORE_PATTERNS
            .iter()
            .map(|p| (*p).to_string())
            .chain(extra_ignores.iter().cloned())
            .collect();

        for pattern in all_patterns.iter().cloned() {
            if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
                globs.add(Glob::new(&pattern)?);
                // Also match the pattern anywhere below the root
                if !pattern.starts_with("**/") {
                    globs.add(Glob::new(&format!("**/{pattern}"))?);
                }
            } else {
                exact.push(pattern);
            }
        }

        let mut keep = GlobSetBuilder::new();
        for pattern in TEMPLATE_KEEP_PATTERNS {
            keep.add(Glob::new(pattern)?);
        }

        Ok(Self {
            platform,
            all_patterns,
            ignore_exact: exact,
            ignore_globs: globs.build()?,
            template_keep: keep.build()?,
        })
    }

    /// All patterns in effect (defaults + caller-supplied), for recording
    /// in the index.
    pub fn effective_patterns(&self) -> Vec<String> {
        self.all_patterns.clone()
    }

    /// Should this repo-relative path be ignored?
    pub fn is_ignored(&self, path: &Path) -> bool {
        // Platform keep-list overrides the whole default ignore set.
        if self.platform == Some(Platform::ThemedContent) && self.template_keep.is_match(path) {
            return false;
        }

        // Exact name / directory-prefix matches.
        for component in path.components() {
            let name = component.as_os_str().to_string_lossy();
            if self.ignore_exact.iter().any(|p| p == name.as_ref()) {
                return true;
            }
        }

        self.ignore_globs.is_match(path)
    }
}

/// Assign a category by strict priority:
/// test markers > config names > documentation > source > asset.
pub fn categorize(path: &Path) -> FileType {
    let lossy = path.to_string_lossy().replace('\\', "/");
    let lower = lossy.to_lowercase();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if is_test_path(&lower) {
        return FileType::Test;
    }

    if CONFIG_FILENAMES.contains(&file_name.as_str()) {
        return FileType::Config;
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if CONFIG_EXTENSIONS.contains(&ext.as_str()) {
        return FileType::Config;
    }
    if DOC_EXTENSIONS.contains(&ext.as_str()) {
        return FileType::Documentation;
    }
    if SOURCE_EXTENSIONS.contains(&ext.as_str()) {
        return FileType::Source;
    }

    FileType::Asset
}

fn is_test_path(lower: &str) -> bool {
    lower.contains(".test.")
        || lower.contains(".spec.")
        || lower.contains("_test.")
        || lower.contains("/tests/")
        || lower.contains("/test/")
        || lower.contains("/__tests__/")
        || lower.starts_with("tests/")
        || lower.starts_with("test/")
        || lower.starts_with("__tests__/")
}

/// Heuristic importance in [0, 1]: base 0.5, a depth bonus inversely
/// proportional to path depth, a flat bonus for anchor filenames, and a
/// platform bonus for template files.
pub fn score_importance(path: &Path, platform: Option<Platform>) -> f64 {
    let mut score = 0.5;

    // Shallow paths matter more. Root files get the full 0.3.
    let depth = path.components().count().max(1);
    score += (0.3 / depth as f64).min(0.3);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if ANCHOR_FILENAMES.contains(&file_name.as_str()) {
        score += 0.2;
    }

    if platform == Some(Platform::ThemedContent) {
        let lossy = path.to_string_lossy().replace('\\', "/");
        if lossy.starts_with("templates/")
            || lossy.starts_with("layouts/")
            || lossy.starts_with("sections/")
            || lossy.starts_with("snippets/")
        {
            score += 0.1;
        }
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx(extra: &[&str], platform: Option<Platform>) -> ClassifyContext {
        let extra: Vec<String> = extra.iter().map(|s| s.to_string()).collect();
        ClassifyContext::new(&extra, platform).unwrap()
    }

    #[test]
    fn test_default_ignores_cover_caches_and_bundles() {
        let c = ctx(&[], None);
        assert!(c.is_ignored(Path::new("node_modules/react/index.js")));
        assert!(c.is_ignored(Path::new("target/debug/build.rs")));
        assert!(c.is_ignored(Path::new("assets/app.min.js")));
        assert!(c.is_ignored(Path::new("deep/nested/.cache/x")));
        assert!(!c.is_ignored(Path::new("src/main.rs")));
    }

    #[test]
    fn test_caller_patterns_extend_defaults() {
        let c = ctx(&["generated", "**/*.snap"], None);
        assert!(c.is_ignored(Path::new("generated/schema.rs")));
        assert!(c.is_ignored(Path::new("tests/snapshots/a.snap")));
        assert!(!c.is_ignored(Path::new("src/schema.rs")));
    }

    #[test]
    fn test_platform_keep_list_overrides_ignores() {
        let c = ctx(&[], Some(Platform::ThemedContent));
        // Template assets survive even though "assets" content like
        // minified bundles is ignored by default elsewhere.
        assert!(!c.is_ignored(Path::new("templates/product.liquid")));
        assert!(!c.is_ignored(Path::new("sections/header.liquid")));
        // Vendor caches next to templates are still dropped.
        assert!(c.is_ignored(Path::new("node_modules/lib/index.js")));
    }

    #[test]
    fn test_category_priority_order() {
        // Test markers beat source extensions
        assert_eq!(categorize(Path::new("src/app.test.ts")), FileType::Test);
        assert_eq!(categorize(Path::new("tests/helper.rs")), FileType::Test);
        // Config filenames beat documentation/source
        assert_eq!(categorize(Path::new("package.json")), FileType::Config);
        assert_eq!(categorize(Path::new("conf/app.yaml")), FileType::Config);
        assert_eq!(categorize(Path::new("README.md")), FileType::Documentation);
        assert_eq!(categorize(Path::new("src/lib.rs")), FileType::Source);
        assert_eq!(categorize(Path::new("logo.png")), FileType::Asset);
    }

    #[test]
    fn test_importance_bounds_and_ordering() {
        let root_manifest = score_importance(Path::new("package.json"), None);
        let deep_source =
            score_importance(&PathBuf::from("src/a/b/c/d/helper.ts"), None);

        assert!((0.0..=1.0).contains(&root_manifest));
        assert!((0.0..=1.0).contains(&deep_source));
        assert!(root_manifest > deep_source);

        // Root manifest: 0.5 + 0.3 depth + 0.2 anchor = 1.0
        assert!((root_manifest - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_platform_bonus_applies_to_templates_only() {
        let tpl = score_importance(
            Path::new("templates/index.liquid"),
            Some(Platform::ThemedContent),
        );
        let plain = score_importance(Path::new("templates/index.liquid"), None);
        assert!(tpl > plain);
    }
}
