//! Filepath: src/core/patterns.rs
//! External pattern-search battery over `rg --json`.
//!
//! Each search is an isolated task: a missing binary, a non-zero exit,
//! malformed output, or zero matches all collapse to an empty result for
//! that one search. Nothing here can abort the pipeline or degrade a
//! sibling search. The battery fans out over rayon and fans back in
//! preserving declaration order.

use std::path::Path;
use std::process::Command;

use camino::Utf8PathBuf;
use rayon::prelude::*;
use tracing::debug;

use crate::core::model::{PatternMatch, PatternSearchResult};

/// One configured search: pattern, human description, optional file-glob
/// scope, and a cap on recorded matches.
#[derive(Debug, Clone)]
pub struct PatternSpec {
    pub pattern: &'static str,
    pub description: &'static str,
    pub globs: &'static [&'static str],
    pub max_matches: usize,
}

/// The fixed battery of structural searches, in render order.
pub fn default_battery() -> Vec<PatternSpec> {
    fn spec(
        pattern: &'static str,
        description: &'static str,
        globs: &'static [&'static str],
        max_matches: usize,
    ) -> PatternSpec {
        PatternSpec { pattern, description, globs, max_matches }
    }
    vec![
        spec(
            r#"\.command\(|add_command|#\[command|\.subcommand\("#,
            "CLI command registrations",
            &[],
            20,
        ),
        spec(
            r#"\.(get|post|put|delete|patch)\s*\(\s*["'/]|@(Get|Post|Put|Delete|Patch)\(|\.route\("#,
            "HTTP route definitions",
            &[],
            30,
        ),
        spec(
            r"export\s+(default\s+)?(function|class|const)\s+[A-Z]\w+",
            "UI component declarations",
            &["*.jsx", "*.tsx", "*.vue", "*.svelte"],
            30,
        ),
        spec(
            r"new\s+Schema\(|\.model\(|@Entity|CREATE TABLE|createTable\(",
            "Persistence model declarations",
            &[],
            20,
        ),
        spec(
            r"^export\s+(default|const|function|class|interface|type)\b",
            "Top-level exports",
            &[],
            40,
        ),
        spec(
            r"defineConfig\(|module\.exports\s*=",
            "Configuration definition files",
            &["*.config.js", "*.config.ts", "*.config.mjs"],
            20,
        ),
        spec(
            r#"\b(describe|it|test)\s*\(\s*["']|#\[test\]|def test_"#,
            "Test suite declarations",
            &[],
            30,
        ),
        spec(
            r"z\.object\(|Joi\.object\(|yup\.object\(|@JsonSchema",
            "Schema definitions",
            &[],
            20,
        ),
        spec(
            r"\buse[A-Z]\w+\s*\(",
            "Hook registrations",
            &["*.js", "*.jsx", "*.ts", "*.tsx"],
            30,
        ),
        spec(
            r"class\s+\w*Error\s+extends|derive\(.*Error|impl\s+.*Error\s+for",
            "Custom error classes",
            &[],
            20,
        ),
        spec(
            r"app\.use\(|\.layer\(|\bmiddleware\b",
            "Middleware declarations",
            &[],
            20,
        ),
    ]
}

/// Standalone search for likely program entry points.
pub fn entry_point_spec() -> PatternSpec {
    PatternSpec {
        pattern: r#"fn main\(|func main\(|def main\(|if __name__ == ['"]__main__|createServer\(|app\.listen\("#,
        description: "Program entry points",
        globs: &[],
        max_matches: 30,
    }
}

/// Standalone search for configuration constants, scoped to env/config
/// files. The renderer lists files only, never line content, so secrets
/// are not echoed.
pub fn config_constant_specs() -> Vec<PatternSpec> {
    vec![PatternSpec {
        pattern: r"(?i)\b(api_key|secret|token|password|database_url|port|host)\b\s*[=:]",
        description: "Configuration constants",
        globs: &[".env*", "*.env", "*.toml", "*.yaml", "*.yml", "config/*"],
        max_matches: 20,
    }]
}

/// Thin wrapper around the external line-oriented search tool. The binary
/// name is injectable so tests can point it at a nonexistent command.
#[derive(Debug, Clone)]
pub struct SearchTool {
    binary: String,
}

impl Default for SearchTool {
    fn default() -> Self {
        Self { binary: "rg".to_string() }
    }
}

impl SearchTool {
    /// Honor `REPODIGEST_RG_BIN` so callers (and resilience tests) can
    /// redirect or disable the external tool.
    pub fn from_env() -> Self {
        match std::env::var("REPODIGEST_RG_BIN") {
            Ok(bin) if !bin.is_empty() => Self { binary: bin },
            _ => Self::default(),
        }
    }

    #[cfg(test)]
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    /// Run every spec in parallel; each failure is isolated to its own
    /// empty result and order follows the spec list.
    pub fn run_battery(&self, root: &Path, specs: &[PatternSpec]) -> Vec<PatternSearchResult> {
        specs
            .par_iter()
            .map(|spec| self.search(root, spec))
            .collect()
    }

    /// Run one search. Never fails: every error path yields an empty
    /// match list.
    pub fn search(&self, root: &Path, spec: &PatternSpec) -> PatternSearchResult {
        let matches = self.invoke(root, spec).unwrap_or_default();
        PatternSearchResult {
            pattern: spec.pattern.to_string(),
            description: spec.description.to_string(),
            matches,
        }
    }

    fn invoke(&self, root: &Path, spec: &PatternSpec) -> Option<Vec<PatternMatch>> {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(root)
            .arg("--json")
            .arg("--no-config")
            .arg("-e")
            .arg(spec.pattern);
        for glob in spec.globs {
            cmd.arg("--glob").arg(glob);
        }
        cmd.arg(".");

        let output = match cmd.output() {
            Ok(output) => output,
            Err(err) => {
                debug!(binary = %self.binary, %err, "search tool unavailable");
                return None;
            }
        };

        // rg exits 1 on zero matches; that is still a valid (empty) run.
        let stdout = String::from_utf8_lossy(&output.stdout);
        Some(parse_json_lines(&stdout, spec.max_matches))
    }
}

/// Parse the tool's JSON-lines output, keeping `match` records only.
/// Malformed lines are skipped.
fn parse_json_lines(stdout: &str, cap: usize) -> Vec<PatternMatch> {
    let mut out = Vec::new();
    for line in stdout.lines() {
        if out.len() >= cap {
            break;
        }
        let Ok(record) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        if record.get("type").and_then(serde_json::Value::as_str) != Some("match") {
            continue;
        }
        let Some(data) = record.get("data") else { continue };

        let Some(path) = data
            .pointer("/path/text")
            .and_then(serde_json::Value::as_str)
        else {
            continue;
        };
        let line_number = data
            .get("line_number")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        let text = data
            .pointer("/lines/text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
            .trim_end_matches('\n');
        let matched = data
            .pointer("/submatches/0/match/text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("");

        // rg reports "./src/x.rs" when searching "."; normalize.
        let path = path.strip_prefix("./").unwrap_or(path);

        out.push(PatternMatch {
            path: Utf8PathBuf::from(path),
            line: line_number,
            text: text.to_string(),
            matched: matched.to_string(),
        });
    }
    out
}
