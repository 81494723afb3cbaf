//! **repodigest** - Fast CLI that indexes a repository and renders a bounded context digest
//!
//! One pass over a source tree produces an immutable `RepositoryIndex`:
//! detected stack, classified files, purpose-tagged modules, and structural
//! pattern findings, all under explicit file/size budgets. The digest
//! renderer compresses that index into size-capped text for token-limited
//! consumers. Every phase degrades gracefully; nothing in the pipeline is
//! fatal by design.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core indexing pipeline - detection, classification, aggregation, rendering
pub mod core {
    /// Serialized data model (`RepositoryIndex` and friends)
    pub mod model;

    /// Rule-based technology detection from file existence/content
    pub mod stack;

    /// Ignore matching, category assignment, importance scoring
    pub mod classify;

    /// Per-language keyword/export/dependency extraction (regex, no AST)
    pub mod keywords;

    /// Well-known documentation/rules file scanning
    pub mod special;

    /// External `rg --json` pattern-search battery with per-task isolation
    pub mod patterns;

    /// Directory-based module grouping with purpose inference
    pub mod modules;

    /// Pipeline orchestration under file-count/size budgets
    pub mod assemble;
    pub use self::assemble::run as index_run;

    /// Deterministic bounded-text digest rendering
    pub mod digest;
    pub use self::digest::run as digest_run;
}

/// Infrastructure - Configuration, I/O, and walking
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use self::config::{Config, init as config_init, load_config};

    /// Injectable content provider with size-capped smart reads
    pub mod io;
    pub use self::io::{ContentProvider, FsContentProvider, ReadError};

    /// Gitignore-aware directory walking
    pub mod walk;
    pub use self::walk::FileWalker;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use crate::core::{digest_run, index_run};
pub use infra::{Config, FileWalker, load_config};

// Core types for external consumers
pub use crate::core::assemble::{IndexOptions, assemble};
pub use crate::core::digest::{DigestOptions, render as render_digest};
pub use crate::core::model::{FileMetadata, ModuleMap, RepositoryIndex, StackTechnology};
