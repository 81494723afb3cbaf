//! Filepath: src/core/assemble.rs
//! Pipeline orchestration: one pass from a target directory to an
//! immutable `RepositoryIndex`.
//!
//! Phase order matters in exactly one place: module grouping runs only
//! after every file's classification/extraction has completed. Everything
//! else is best-effort and independently degradable; no step is fatal.

use std::path::{Path, PathBuf};

use anyhow::Result;
use camino::Utf8PathBuf;
use chrono::Utc;
use indexmap::IndexSet;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::classify::{self, ClassifyContext, Platform};
use crate::core::keywords;
use crate::core::model::{
    CodeInsights, FileMetadata, FileType, RepositoryIndex, WorkspacePackage,
};
use crate::core::patterns::{self, SearchTool};
use crate::core::special;
use crate::core::stack::{self, DetectionRule};
use crate::core::modules;
use crate::infra::io::ContentProvider;
use crate::infra::walk::FileWalker;

/// Files below this importance are classified but not content-extracted,
/// unless they are config files.
pub const EXTRACTION_IMPORTANCE_THRESHOLD: f64 = 0.6;

/// Content ceiling for keyword/export extraction. Deliberately smaller
/// than the raw read ceiling used for special files.
pub const EXTRACTION_CONTENT_CAP: u64 = 100 * 1024; // 100 KiB

/// Paths at or above this importance land in `important_paths`.
const IMPORTANT_PATH_THRESHOLD: f64 = 0.7;

/// Marker files that flag a themed-content platform at the root.
const THEME_MARKERS: &[&str] = &["config/settings_schema.json", "theme.toml"];

/// Directory names always safe to prune during traversal. File-level
/// ignore globs are evaluated later by the classifier, where the themed
/// platform keep-list can override them.
const PRUNE_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    ".git",
    ".idea",
    ".vscode",
    "__pycache__",
    "coverage",
    ".next",
    ".nuxt",
    ".cache",
    "vendor",
];

/// Caller configuration for one indexing run.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Ignore patterns applied on top of the built-in defaults.
    pub ignore_patterns: Vec<String>,
    /// Hard cap on processed files.
    pub max_files: usize,
    /// Keep test files in the index.
    pub include_tests: bool,
    /// Reserved: identifiers of additional detector rule sets.
    pub detectors: Vec<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            max_files: 2000,
            include_tests: true,
            detectors: Vec::new(),
        }
    }
}

/// Assemble a `RepositoryIndex` for `root`. The only error this returns
/// is an invalid caller-supplied ignore pattern; every downstream failure
/// degrades to an absent or empty field.
pub fn assemble(
    root: &Path,
    options: &IndexOptions,
    provider: &dyn ContentProvider,
    tool: &SearchTool,
    rules: &[DetectionRule],
) -> Result<RepositoryIndex> {
    // Stack detection runs once over the tree.
    let detected_stack = stack::detect(root, rules, provider);
    debug!(technologies = detected_stack.len(), "stack detection done");

    let platform = detect_platform(root, provider);
    let ctx = ClassifyContext::new(&options.ignore_patterns, platform)?;

    let workspace_packages = discover_workspaces(root, provider);
    let special_files = special::scan(root, provider);

    // Enumerate, filter, and cap. The walker output is sorted, so the
    // truncation point is deterministic. The cap counts only files that
    // survive filtering, so it lives here rather than in the walker.
    let walker = FileWalker::new(&prune_patterns())?;

    let mut selected: Vec<PathBuf> = Vec::new();
    let mut truncated = false;
    for rel in walker.walk_files(root) {
        if ctx.is_ignored(&rel) {
            continue;
        }
        if !options.include_tests && classify::categorize(&rel) == FileType::Test {
            continue;
        }
        if selected.len() >= options.max_files {
            truncated = true;
            break;
        }
        selected.push(rel);
    }
    if truncated {
        warn!(
            max_files = options.max_files,
            "file cap reached; index is a truncated snapshot"
        );
    }

    // Per-file classification and conditional extraction fan out over
    // rayon; collect() preserves input order.
    let file_metadata: Vec<FileMetadata> = selected
        .par_iter()
        .map(|rel| describe_file(root, rel, platform, provider))
        .collect();

    // Grouping aggregates the full set, so it must not start earlier.
    let modules = modules::group(&file_metadata);

    let code_insights = run_searches(root, tool);

    let mut important: Vec<(f64, Utf8PathBuf)> = file_metadata
        .iter()
        .filter(|f| f.importance >= IMPORTANT_PATH_THRESHOLD)
        .map(|f| (f.importance, f.path.clone()))
        .collect();
    important.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });

    let total_files = file_metadata.len();
    Ok(RepositoryIndex {
        detected_stack,
        workspace_packages,
        important_paths: important.into_iter().map(|(_, p)| p).collect(),
        modules,
        file_metadata,
        special_files,
        code_insights,
        ignore_patterns: ctx.effective_patterns(),
        total_files,
        indexed_at: Utc::now(),
    })
}

/// Run the `index` command end-to-end: merge config and CLI flags,
/// assemble, and emit the JSON artifact.
pub fn run(args: crate::cli::IndexArgs, ctx: &crate::cli::AppContext) -> Result<()> {
    use anyhow::Context as _;
    use owo_colors::OwoColorize;

    let config = crate::infra::config::load_config().unwrap_or_default();
    let options = merge_options(
        &config,
        args.ignore,
        args.max_files,
        args.no_tests,
        args.detector,
    );

    if ctx.dry_run {
        if !ctx.quiet {
            println!("{}", "DRY RUN: Would index:".yellow());
            println!("  Root: {}", args.path.display());
            println!("  Max files: {}", options.max_files);
            println!("  Ignore patterns: {:?}", options.ignore_patterns);
        }
        return Ok(());
    }

    let index = assemble_with_progress(&args.path, &options, ctx)?;

    let json = serde_json::to_string_pretty(&index).context("serialize index")?;
    // Explicit -o wins; otherwise the configured artifact path applies.
    let output = args
        .output
        .or_else(|| config.index.output_file.as_ref().map(PathBuf::from));
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).context("create output directory")?;
            }
            std::fs::write(&path, json).context("write index artifact")?;
            if !ctx.quiet {
                println!(
                    "{} {} ({} files)",
                    "Wrote".green(),
                    path.display(),
                    index.total_files
                );
            }
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Assemble with a terminal spinner (suppressed by --quiet).
pub(crate) fn assemble_with_progress(
    root: &Path,
    options: &IndexOptions,
    ctx: &crate::cli::AppContext,
) -> Result<RepositoryIndex> {
    use crate::infra::io::FsContentProvider;

    let spinner = if ctx.quiet {
        indicatif::ProgressBar::hidden()
    } else {
        let spinner = indicatif::ProgressBar::new_spinner();
        spinner.set_message("indexing repository");
        spinner.enable_steady_tick(std::time::Duration::from_millis(120));
        spinner
    };

    let index = assemble(
        root,
        options,
        &FsContentProvider,
        &SearchTool::from_env(),
        &stack::default_rules(),
    );

    spinner.finish_and_clear();
    index
}

/// Merge persisted config with CLI overrides. CLI wins where it is
/// explicit; config fills the rest.
pub(crate) fn merge_options(
    config: &crate::infra::config::Config,
    extra_ignores: Vec<String>,
    max_files: Option<usize>,
    no_tests: bool,
    detectors: Vec<String>,
) -> IndexOptions {
    let mut ignore_patterns = config.ignore_patterns.clone();
    ignore_patterns.extend(extra_ignores);

    let mut all_detectors = config.index.detectors.clone();
    all_detectors.extend(detectors);

    IndexOptions {
        ignore_patterns,
        max_files: max_files.unwrap_or(config.index.max_files),
        include_tests: if no_tests { false } else { config.index.include_tests },
        detectors: all_detectors,
    }
}

fn prune_patterns() -> Vec<String> {
    PRUNE_DIRS
        .iter()
        .flat_map(|d| [format!("**/{d}"), (*d).to_string()])
        .collect()
}

fn detect_platform(root: &Path, provider: &dyn ContentProvider) -> Option<Platform> {
    THEME_MARKERS
        .iter()
        .any(|m| provider.exists(&root.join(m)))
        .then_some(Platform::ThemedContent)
}

/// Classify one file and, when it clears the extraction gate, extract
/// keywords/exports/dependencies from its content. A failed read is a
/// permanent skip of extraction for that file, never an error.
fn describe_file(
    root: &Path,
    rel: &Path,
    platform: Option<Platform>,
    provider: &dyn ContentProvider,
) -> FileMetadata {
    let file_type = classify::categorize(rel);
    let importance = classify::score_importance(rel, platform);

    let should_extract =
        importance > EXTRACTION_IMPORTANCE_THRESHOLD || file_type == FileType::Config;

    let extraction = if should_extract {
        provider
            .read_capped(&root.join(rel), EXTRACTION_CONTENT_CAP)
            .ok()
            .map(|content| keywords::extract(rel, &content))
    } else {
        None
    };

    let path = Utf8PathBuf::from(rel.to_string_lossy().replace('\\', "/"));
    match extraction {
        Some(extraction) => FileMetadata {
            path,
            file_type,
            keywords: extraction.keywords,
            importance,
            exports: non_empty(extraction.exports),
            dependencies: non_empty(extraction.dependencies),
        },
        None => FileMetadata {
            path,
            file_type,
            keywords: keywords::filename_keywords(rel),
            importance,
            exports: None,
            dependencies: None,
        },
    }
}

fn non_empty(v: Vec<String>) -> Option<Vec<String>> {
    (!v.is_empty()).then_some(v)
}

/// Fire the whole search battery plus the standalone entry-point and
/// config-constant searches. Each failure is already isolated inside
/// `SearchTool`.
fn run_searches(root: &Path, tool: &SearchTool) -> CodeInsights {
    let entry_result = tool.search(root, &patterns::entry_point_spec());
    let patterns_out = tool.run_battery(root, &patterns::default_battery());
    let config_out = tool.run_battery(root, &patterns::config_constant_specs());

    // Unique entry-point paths in match order.
    let mut entry_points: IndexSet<Utf8PathBuf> = IndexSet::new();
    for m in &entry_result.matches {
        entry_points.insert(m.path.clone());
    }

    CodeInsights {
        entry_points: entry_points.into_iter().collect(),
        patterns: patterns_out,
        config_patterns: config_out,
    }
}

/// Discover workspace packages from the root `package.json` (its
/// `workspaces` field, array or `{ "packages": [...] }` form) and from a
/// root `Cargo.toml` `[workspace].members` list. Malformed manifests and
/// unreadable members are skipped entry by entry.
fn discover_workspaces(root: &Path, provider: &dyn ContentProvider) -> Vec<WorkspacePackage> {
    let mut out = Vec::new();

    if let Some(manifest) = read_json(root, "package.json", provider) {
        let name = manifest
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("(unnamed)")
            .to_string();
        out.push(WorkspacePackage {
            name,
            version: string_field(&manifest, "version"),
            path: Utf8PathBuf::from("."),
            description: string_field(&manifest, "description"),
            is_root: true,
        });

        for glob in workspace_globs(&manifest) {
            for dir in expand_member_glob(root, &glob) {
                let Some(member) = read_json(&dir, "package.json", provider) else {
                    continue;
                };
                let Some(name) = string_field(&member, "name") else {
                    continue;
                };
                out.push(WorkspacePackage {
                    name,
                    version: string_field(&member, "version"),
                    path: rel_utf8(root, &dir),
                    description: string_field(&member, "description"),
                    is_root: false,
                });
            }
        }
    }

    if let Ok(raw) = provider.read_capped(&root.join("Cargo.toml"), EXTRACTION_CONTENT_CAP) {
        if let Ok(manifest) = raw.parse::<toml::Table>() {
            if let Some(package) = manifest.get("package") {
                if let Some(name) = package.get("name").and_then(toml::Value::as_str) {
                    out.push(WorkspacePackage {
                        name: name.to_string(),
                        version: package
                            .get("version")
                            .and_then(toml::Value::as_str)
                            .map(str::to_string),
                        path: Utf8PathBuf::from("."),
                        description: package
                            .get("description")
                            .and_then(toml::Value::as_str)
                            .map(str::to_string),
                        is_root: true,
                    });
                }
            }

            let members = manifest
                .get("workspace")
                .and_then(|w| w.get("members"))
                .and_then(toml::Value::as_array)
                .map(|a| {
                    a.iter()
                        .filter_map(toml::Value::as_str)
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();

            for glob in members {
                for dir in expand_member_glob(root, &glob) {
                    let Ok(raw) =
                        provider.read_capped(&dir.join("Cargo.toml"), EXTRACTION_CONTENT_CAP)
                    else {
                        continue;
                    };
                    let Ok(member) = raw.parse::<toml::Table>() else { continue };
                    let Some(package) = member.get("package") else { continue };
                    let Some(name) = package.get("name").and_then(toml::Value::as_str) else {
                        continue;
                    };
                    out.push(WorkspacePackage {
                        name: name.to_string(),
                        version: package
                            .get("version")
                            .and_then(toml::Value::as_str)
                            .map(str::to_string),
                        path: rel_utf8(root, &dir),
                        description: package
                            .get("description")
                            .and_then(toml::Value::as_str)
                            .map(str::to_string),
                        is_root: false,
                    });
                }
            }
        }
    }

    out
}

fn read_json(
    dir: &Path,
    name: &str,
    provider: &dyn ContentProvider,
) -> Option<serde_json::Value> {
    let raw = provider.read_capped(&dir.join(name), EXTRACTION_CONTENT_CAP).ok()?;
    serde_json::from_str(&raw).ok()
}

fn string_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

/// `workspaces` is either an array of globs or `{ "packages": [...] }`.
fn workspace_globs(manifest: &serde_json::Value) -> Vec<String> {
    let field = manifest.get("workspaces");
    let arr = match field {
        Some(serde_json::Value::Array(a)) => Some(a),
        Some(serde_json::Value::Object(o)) => {
            o.get("packages").and_then(serde_json::Value::as_array)
        }
        _ => None,
    };
    arr.map(|a| {
        a.iter()
            .filter_map(serde_json::Value::as_str)
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Expand a member glob like `crates/*` against the filesystem. Only a
/// trailing `*` segment is expanded; anything else is taken literally,
/// which covers the member syntax both manifest formats actually use.
fn expand_member_glob(root: &Path, pattern: &str) -> Vec<PathBuf> {
    match pattern.strip_suffix("/*") {
        Some(prefix) => {
            let Ok(entries) = std::fs::read_dir(root.join(prefix)) else {
                return Vec::new();
            };
            let mut dirs: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            dirs.sort();
            dirs
        }
        None => {
            let dir = root.join(pattern);
            if dir.is_dir() { vec![dir] } else { Vec::new() }
        }
    }
}

fn rel_utf8(root: &Path, dir: &Path) -> Utf8PathBuf {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    Utf8PathBuf::from(rel.to_string_lossy().replace('\\', "/"))
}
