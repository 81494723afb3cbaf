//! Filepath: src/core/model.rs
//! Serialized data model for the repository index.
//!
//! Every type here is an immutable snapshot produced by one pipeline run:
//! nothing mutates an index after `assemble` hands it out. Paths are
//! repo-relative UTF-8 (`camino`) so the JSON artifact is portable across
//! platforms. Field names are camelCase to match the persisted artifact.

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a detected technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechCategory {
    Framework,
    Language,
    Tool,
    Platform,
    Database,
    Runtime,
}

/// A detected language/framework/tool with a confidence score.
///
/// Entries are not deduplicated: two rules may legitimately report the
/// same name (e.g. a file-presence rule and a manifest-derived entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTechnology {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub category: TechCategory,
    /// Detection confidence in [0, 1].
    pub confidence: f64,
}

/// Coarse file classification, assigned by strict priority
/// (test > config > documentation > source > asset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Source,
    Config,
    Documentation,
    Test,
    Asset,
}

/// Per-file metadata produced by classification and extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Repo-relative path.
    pub path: Utf8PathBuf,
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// First 20 keywords in insertion order. No relevance ranking.
    pub keywords: Vec<String>,
    /// Heuristic relevance score in [0, 1].
    pub importance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exports: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
}

/// A directory-scoped grouping of classified files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMap {
    /// Repo-relative directory path ("." for the repository root).
    pub path: Utf8PathBuf,
    /// Inferred purpose label, e.g. "UI components" or "Module".
    pub purpose: String,
    /// Union of member keywords, capped at 30, insertion order.
    pub keywords: Vec<String>,
    /// Member file paths; every entry exists in `RepositoryIndex::file_metadata`.
    pub files: Vec<Utf8PathBuf>,
    /// Mean of member importances.
    pub importance: f64,
}

/// A package discovered from the root manifest or a workspace glob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePackage {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Directory relative to the repository root ("." for the root package).
    pub path: Utf8PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_root: bool,
}

/// Semantic type of a well-known documentation/rules file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialFileType {
    /// `AGENTS.md` or files under a `.rules/` directory.
    AgentsDoc,
    /// `.cursorrules`
    CursorRules,
    /// `.windsurfrules`
    WindsurfRules,
    Readme,
}

/// A well-known file with its raw (size-capped) content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialFile {
    pub path: Utf8PathBuf,
    #[serde(rename = "type")]
    pub file_type: SpecialFileType,
    pub content: String,
}

/// One line matched by an external pattern search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    pub path: Utf8PathBuf,
    pub line: u64,
    /// Full line text as reported by the search tool.
    pub text: String,
    /// The substring that matched the pattern.
    pub matched: String,
}

/// All matches for one configured pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSearchResult {
    pub pattern: String,
    pub description: String,
    pub matches: Vec<PatternMatch>,
}

/// Structural findings from the external search battery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeInsights {
    /// Likely program entry points.
    pub entry_points: Vec<Utf8PathBuf>,
    pub patterns: Vec<PatternSearchResult>,
    /// Configuration-constant findings, scoped to env/config files.
    pub config_patterns: Vec<PatternSearchResult>,
}

/// Aggregate result of one indexing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryIndex {
    pub detected_stack: Vec<StackTechnology>,
    pub workspace_packages: Vec<WorkspacePackage>,
    /// Paths with importance >= 0.7, descending.
    pub important_paths: Vec<Utf8PathBuf>,
    /// Modules sorted descending by importance.
    pub modules: Vec<ModuleMap>,
    pub file_metadata: Vec<FileMetadata>,
    pub special_files: Vec<SpecialFile>,
    pub code_insights: CodeInsights,
    /// Ignore patterns that were in effect (defaults + caller-supplied).
    pub ignore_patterns: Vec<String>,
    /// Always equals `file_metadata.len()`.
    pub total_files: usize,
    pub indexed_at: DateTime<Utc>,
}
