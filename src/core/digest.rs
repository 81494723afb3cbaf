//! Filepath: src/core/digest.rs
//! Deterministic rendering of a `RepositoryIndex` into bounded text.
//!
//! Every clipping constant here is a fixed heuristic approximating a
//! downstream token budget; none is derived from a real tokenizer. The
//! special-files section is the only unbounded one (contents are inlined
//! verbatim), so callers with tight budgets should disable it via
//! `DigestOptions` or pre-filter the index.

use std::collections::HashMap;
use std::fmt::Write as _;

use camino::Utf8PathBuf;
use itertools::Itertools;

use crate::core::model::{PatternSearchResult, RepositoryIndex};

const MAX_ENTRY_POINTS: usize = 10;
const MAX_FILES_PER_PATTERN: usize = 5;
const MAX_MATCHES_PER_FILE: usize = 3;
const LINE_CLIP: usize = 80;
const MAX_MODULES: usize = 10;
const MAX_MODULE_KEYWORDS_SHOWN: usize = 5;
const MAX_IMPORTANT_PATHS: usize = 15;

#[derive(Debug, Clone)]
pub struct DigestOptions {
    /// Inline special-file contents. The one section without a size cap.
    pub include_special_files: bool,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self { include_special_files: true }
    }
}

/// Run the `digest` command: assemble a fresh index for the target and
/// render it to bounded text.
pub fn run(args: crate::cli::DigestArgs, ctx: &crate::cli::AppContext) -> anyhow::Result<()> {
    use anyhow::Context as _;
    use owo_colors::OwoColorize;

    let config = crate::infra::config::load_config().unwrap_or_default();
    let options = crate::core::assemble::merge_options(
        &config,
        args.ignore,
        args.max_files,
        args.no_tests,
        Vec::new(),
    );

    if ctx.dry_run {
        if !ctx.quiet {
            println!("{}", "DRY RUN: Would digest:".yellow());
            println!("  Root: {}", args.path.display());
            println!("  Max files: {}", options.max_files);
        }
        return Ok(());
    }

    let index = crate::core::assemble::assemble_with_progress(&args.path, &options, ctx)?;

    let digest_options = DigestOptions {
        include_special_files: config.digest.include_special_files && !args.no_special_files,
    };
    let text = render_with(&index, &digest_options);

    match args.output {
        Some(path) => {
            std::fs::write(&path, text).context("write digest")?;
            if !ctx.quiet {
                println!("{} {}", "Wrote".green(), path.display());
            }
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Render the digest with default options.
pub fn render(index: &RepositoryIndex) -> String {
    render_with(index, &DigestOptions::default())
}

/// Render the digest. Output depends only on the index contents, so an
/// unchanged index always renders identically.
pub fn render_with(index: &RepositoryIndex, options: &DigestOptions) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Repository digest");
    let _ = writeln!(out);

    if !index.detected_stack.is_empty() {
        let _ = writeln!(out, "## Technology stack");
        for tech in &index.detected_stack {
            let version = tech
                .version
                .as_deref()
                .map(|v| format!(" {v}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "- {}{version} ({:?}, confidence {:.1})",
                tech.name, tech.category, tech.confidence
            );
        }
        let _ = writeln!(out);
    }

    if !index.workspace_packages.is_empty() {
        let _ = writeln!(out, "## Workspace packages");
        for pkg in &index.workspace_packages {
            let version = pkg
                .version
                .as_deref()
                .map(|v| format!(" {v}"))
                .unwrap_or_default();
            let marker = if pkg.is_root { " [root]" } else { "" };
            let _ = writeln!(out, "- {}{version} ({}){marker}", pkg.name, pkg.path);
            if let Some(desc) = &pkg.description {
                let _ = writeln!(out, "  {}", clip(desc));
            }
        }
        let _ = writeln!(out);
    }

    if options.include_special_files && !index.special_files.is_empty() {
        let _ = writeln!(out, "## Project documentation & rules");
        for special in &index.special_files {
            let _ = writeln!(out, "### {}", special.path);
            let _ = writeln!(out, "{}", special.content.trim_end());
            let _ = writeln!(out);
        }
    }

    if !index.code_insights.entry_points.is_empty() {
        let _ = writeln!(out, "## Entry points");
        for path in index.code_insights.entry_points.iter().take(MAX_ENTRY_POINTS) {
            let _ = writeln!(out, "- {path}");
        }
        let _ = writeln!(out);
    }

    for result in &index.code_insights.patterns {
        render_pattern_section(&mut out, result);
    }

    // Config patterns list files only: line content under env/config
    // paths may hold secrets.
    let config_files: Vec<&Utf8PathBuf> = index
        .code_insights
        .config_patterns
        .iter()
        .flat_map(|r| r.matches.iter().map(|m| &m.path))
        .unique()
        .collect();
    if !config_files.is_empty() {
        let _ = writeln!(out, "## Configuration files with constants");
        for path in config_files {
            let _ = writeln!(out, "- {path}");
        }
        let _ = writeln!(out);
    }

    if !index.modules.is_empty() {
        let _ = writeln!(out, "## Modules");
        for module in index.modules.iter().take(MAX_MODULES) {
            let keywords = module
                .keywords
                .iter()
                .take(MAX_MODULE_KEYWORDS_SHOWN)
                .join(", ");
            let suffix = if keywords.is_empty() {
                String::new()
            } else {
                format!("; keywords: {keywords}")
            };
            let _ = writeln!(
                out,
                "- {} — {} (importance {:.2}{suffix})",
                module.path, module.purpose, module.importance
            );
        }
        let _ = writeln!(out);
    }

    if !index.important_paths.is_empty() {
        let _ = writeln!(out, "## Important paths");
        for path in index.important_paths.iter().take(MAX_IMPORTANT_PATHS) {
            let _ = writeln!(out, "- {path}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "Indexed {} files at {}.",
        index.total_files,
        index.indexed_at.to_rfc3339()
    );

    out
}

/// One pattern section: matches grouped by file, top files by match
/// count, a few matches each, lines clipped.
fn render_pattern_section(out: &mut String, result: &PatternSearchResult) {
    if result.matches.is_empty() {
        return;
    }

    let mut counts: HashMap<&Utf8PathBuf, usize> = HashMap::new();
    let mut order: Vec<&Utf8PathBuf> = Vec::new();
    for m in &result.matches {
        let entry = counts.entry(&m.path).or_insert(0);
        if *entry == 0 {
            order.push(&m.path);
        }
        *entry += 1;
    }

    // Descending by match count; first-seen order breaks ties so output
    // is stable.
    let mut ranked: Vec<(usize, usize)> = order
        .iter()
        .enumerate()
        .map(|(i, p)| (counts[p], i))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let _ = writeln!(out, "## {}", result.description);
    for (_, idx) in ranked.into_iter().take(MAX_FILES_PER_PATTERN) {
        let path = order[idx];
        let _ = writeln!(out, "- {path} ({} matches)", counts[path]);
        for m in result
            .matches
            .iter()
            .filter(|m| &m.path == path)
            .take(MAX_MATCHES_PER_FILE)
        {
            let _ = writeln!(out, "    {}: {}", m.line, clip(m.text.trim()));
        }
    }
    let _ = writeln!(out);
}

fn clip(text: &str) -> String {
    if text.chars().count() <= LINE_CLIP {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(LINE_CLIP).collect();
        clipped.push('…');
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::*;
    use chrono::Utc;

    fn base_index() -> RepositoryIndex {
        RepositoryIndex {
            detected_stack: vec![StackTechnology {
                name: "Rust".into(),
                version: Some("1.85".into()),
                category: TechCategory::Language,
                confidence: 1.0,
            }],
            workspace_packages: vec![],
            important_paths: vec![Utf8PathBuf::from("src/main.rs")],
            modules: vec![ModuleMap {
                path: Utf8PathBuf::from("src/core"),
                purpose: "Module".into(),
                keywords: (0..8).map(|i| format!("kw{i}")).collect(),
                files: vec![Utf8PathBuf::from("src/core/a.rs")],
                importance: 0.65,
            }],
            file_metadata: vec![],
            special_files: vec![SpecialFile {
                path: Utf8PathBuf::from("README.md"),
                file_type: SpecialFileType::Readme,
                content: "# Demo\nverbatim body".into(),
            }],
            code_insights: CodeInsights::default(),
            ignore_patterns: vec![],
            total_files: 12,
            indexed_at: Utc::now(),
        }
    }

    #[test]
    fn test_sections_and_footer_present() {
        let text = render(&base_index());

        assert!(text.contains("## Technology stack"));
        assert!(text.contains("- Rust 1.85"));
        assert!(text.contains("## Project documentation & rules"));
        assert!(text.contains("verbatim body"));
        assert!(text.contains("## Modules"));
        assert!(text.contains("src/core — Module (importance 0.65"));
        assert!(text.contains("## Important paths"));
        assert!(text.contains("Indexed 12 files at "));
    }

    #[test]
    fn test_special_files_can_be_suppressed() {
        let text = render_with(
            &base_index(),
            &DigestOptions { include_special_files: false },
        );
        assert!(!text.contains("verbatim body"));
    }

    #[test]
    fn test_module_keywords_clipped_to_five() {
        let text = render(&base_index());
        assert!(text.contains("kw0, kw1, kw2, kw3, kw4"));
        assert!(!text.contains("kw5"));
    }

    #[test]
    fn test_pattern_section_ranks_files_and_clips_lines() {
        let mut index = base_index();
        let long_line = "x".repeat(200);
        let mk = |path: &str, line: u64, text: &str| PatternMatch {
            path: Utf8PathBuf::from(path),
            line,
            text: text.to_string(),
            matched: "m".into(),
        };
        index.code_insights.patterns = vec![PatternSearchResult {
            pattern: "p".into(),
            description: "HTTP route definitions".into(),
            matches: vec![
                mk("src/one.js", 1, "only"),
                mk("src/busy.js", 2, &long_line),
                mk("src/busy.js", 3, "b"),
                mk("src/busy.js", 4, "c"),
                mk("src/busy.js", 5, "d"),
            ],
        }];

        let text = render(&index);
        let busy_pos = text.find("src/busy.js").unwrap();
        let one_pos = text.find("src/one.js").unwrap();
        assert!(busy_pos < one_pos, "busier file renders first");
        assert!(text.contains("(4 matches)"));
        // Only the first 3 matches of the busy file are shown.
        assert!(text.contains("    4: c"));
        assert!(!text.contains("    5: d"));
        // Long lines are clipped to 80 chars plus an ellipsis.
        assert!(text.contains(&format!("{}…", "x".repeat(80))));
    }

    #[test]
    fn test_config_patterns_list_files_without_content() {
        let mut index = base_index();
        index.code_insights.config_patterns = vec![PatternSearchResult {
            pattern: "secret".into(),
            description: "Configuration constants".into(),
            matches: vec![PatternMatch {
                path: Utf8PathBuf::from(".env"),
                line: 1,
                text: "API_KEY=super-secret-value".into(),
                matched: "API_KEY=".into(),
            }],
        }];

        let text = render(&index);
        assert!(text.contains("## Configuration files with constants"));
        assert!(text.contains("- .env"));
        assert!(!text.contains("super-secret-value"), "secrets never echoed");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let index = base_index();
        assert_eq!(render(&index), render(&index));
    }
}
