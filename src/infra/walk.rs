//! Filepath: src/infra/walk.rs
//! Gitignore-aware file walker for repository enumeration.
//! - Respects .gitignore, .git/info/exclude, and global gitignore
//! - Extra ignore globs (early prune + late filter)
//! - Deterministic ordering for stable tests/CI
//!
//! Backed by ripgrep's `ignore` crate and `globset`.
//!
//! Precedence (summarized): glob overrides → ignore files → hidden policy.
//! See `ignore::WalkBuilder` docs for full details.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

/// Gitignore-aware walker with additional ignore globs.
/// Extra globs are applied in two places:
///   1) Early: prune directories during traversal (filter_entry).
///   2) Late: filter out files that still slipped through.
pub struct FileWalker
{
    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,

    /// Include hidden (dot) files; default true so rules files like
    /// `.cursorrules` are enumerable
    include_hidden: bool,
}

impl FileWalker
{
    /// Build a walker with additional ignore patterns (e.g., "target/**",
    /// "node_modules/**", "**/*.min.js"). Patterns match on relative paths.
    pub fn new(additional_ignores: &[String]) -> Result<Self>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in additional_ignores
        {
            builder.add(Glob::new(pattern)?);
        }

        Ok(Self {
            ignore_patterns: builder.build()?,
            include_hidden: true,
        })
    }

    /// (Optional) Include or exclude hidden files (dotfiles).
    pub fn with_include_hidden(
        mut self,
        include_hidden: bool,
    ) -> Self
    {
        self.include_hidden = include_hidden;
        self
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // Hidden files policy:
        //   WalkBuilder::hidden(true)  => *skip* dotfiles
        //   WalkBuilder::hidden(false) => include dotfiles
        b.hidden(!self.include_hidden); // invert our flag for builder

        // Respect .ignore/.gitignore/.git/info/exclude and global gitignore
        b.git_ignore(true);
        b.git_global(true);
        b.git_exclude(true);

        // Early directory pruning using extra ignores (fast short-circuit).
        let extra = self.ignore_patterns.clone();
        b.filter_entry(move |ent: &DirEntry| {
            // Be conservative on unknown types.
            let is_dir = ent
                .file_type()
                .map(|ft| ft.is_dir())
                .unwrap_or(false);

            if is_dir && extra.is_match(ent.path())
            {
                return false;
            }
            true
        });

        b
    }

    /// Traverse files under `root`, respecting ignore rules and extra globs.
    /// Returns sorted **relative** paths. Any enumeration cap belongs to
    /// the caller, which knows which files count.
    pub fn walk_files<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Vec<PathBuf>
    {
        let root_path = root.as_ref();
        let walker = self
            .build_walk(root_path)
            .build();

        let mut out: Vec<PathBuf> = walker
            // Drop entries with IO errors (per-file skip, never fatal)
            .filter_map(|res| res.ok())
            // Keep only regular files
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file())
            })
            // Relative path for stable matching and serialization
            .filter_map(|entry| {
                entry
                    .into_path()
                    .strip_prefix(root_path)
                    .ok()
                    .map(Path::to_path_buf)
            })
            // Late file-level extra ignore filtering on the relative path
            .filter(|rel| {
                !self
                    .ignore_patterns
                    .is_match(rel)
            })
            .collect();

        // Deterministic order (stable CLI & tests)
        out.sort();

        out
    }
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    /// Create a file with parent dirs as needed
    fn write_file(
        root: &Path,
        rel: &str,
        contents: &str,
    ) -> Result<()>
    {
        let path = root.join(rel);
        if let Some(parent) = path.parent()
        {
            std::fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    #[test]
    fn test_file_walking_simple() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "test.rs", "fn main() {}")?;
        write_file(root, "README.md", "# Test")?;

        let walker = FileWalker::new(&[])?;
        let files = walker.walk_files(root);

        assert_eq!(
            files,
            vec![PathBuf::from("README.md"), PathBuf::from("test.rs")]
        );
        Ok(())
    }

    #[test]
    fn test_additional_globs_prune_and_filter() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "target/build/a.o", "bin")?;
        write_file(root, "node_modules/pkg/index.js", "js")?;
        write_file(root, "src/lib.rs", "pub fn x() {}")?;

        let ignores = vec!["target/**".to_string(), "node_modules/**".to_string()];
        let walker = FileWalker::new(&ignores)?;
        let files = walker.walk_files(root);

        assert_eq!(files, vec![PathBuf::from("src/lib.rs")], "unexpected files");
        Ok(())
    }

    #[test]
    fn test_hidden_files_included_by_default() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, ".cursorrules", "be terse")?;
        write_file(root, "visible.txt", "v")?;

        let walker = FileWalker::new(&[])?;
        let files = walker.walk_files(root);
        assert!(files.contains(&PathBuf::from(".cursorrules")));

        let walker = FileWalker::new(&[])?.with_include_hidden(false);
        let files = walker.walk_files(root);
        assert!(!files.contains(&PathBuf::from(".cursorrules")));
        assert!(files.contains(&PathBuf::from("visible.txt")));
        Ok(())
    }
}
