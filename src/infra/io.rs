//! Filepath: src/infra/io.rs
//! Size-capped file reads behind an injectable content provider.
//!
//! Classification and extraction stay pure over `&str` content; the
//! provider is the only place that touches the filesystem, so unit tests
//! can substitute an in-memory map. Files over 1 MiB are memory-mapped.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use thiserror::Error;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Why a read was skipped. Every variant is a per-file skip, never a
/// pipeline abort.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("file exceeds size cap ({size} > {cap} bytes)")]
    TooLarge { size: u64, cap: u64 },

    #[error("file is not valid UTF-8")]
    NonUtf8,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only content access for the pipeline.
pub trait ContentProvider: Sync {
    /// File size in bytes, if the file exists.
    fn len(&self, path: &Path) -> Result<u64, ReadError>;

    /// Read the whole file as UTF-8, refusing files larger than `cap` bytes.
    fn read_capped(&self, path: &Path, cap: u64) -> Result<String, ReadError>;

    fn exists(&self, path: &Path) -> bool {
        self.len(path).is_ok()
    }
}

/// Filesystem-backed provider used by the real pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentProvider;

impl ContentProvider for FsContentProvider {
    fn len(&self, path: &Path) -> Result<u64, ReadError> {
        Ok(std::fs::metadata(path)?.len())
    }

    fn read_capped(&self, path: &Path, cap: u64) -> Result<String, ReadError> {
        let size = self.len(path)?;
        if size > cap {
            return Err(ReadError::TooLarge { size, cap });
        }

        if size > MMAP_THRESHOLD {
            // Memory-map large files instead of buffering them
            let file = File::open(path)?;
            // SAFETY: read-only map of an existing regular file
            let mmap = unsafe { Mmap::map(&file)? };
            std::str::from_utf8(&mmap)
                .map(str::to_owned)
                .map_err(|_| ReadError::NonUtf8)
        } else {
            let bytes = std::fs::read(path)?;
            String::from_utf8(bytes).map_err(|_| ReadError::NonUtf8)
        }
    }
}

/// In-memory provider for unit tests. Paths are matched exactly.
#[derive(Debug, Default)]
pub struct MemoryContentProvider {
    files: HashMap<PathBuf, String>,
}

impl MemoryContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl ContentProvider for MemoryContentProvider {
    fn len(&self, path: &Path) -> Result<u64, ReadError> {
        self.files
            .get(path)
            .map(|c| c.len() as u64)
            .ok_or_else(|| {
                ReadError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not in fixture",
                ))
            })
    }

    fn read_capped(&self, path: &Path, cap: u64) -> Result<String, ReadError> {
        let content = self.files.get(path).ok_or_else(|| {
            ReadError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "not in fixture",
            ))
        })?;
        let size = content.len() as u64;
        if size > cap {
            return Err(ReadError::TooLarge { size, cap });
        }
        Ok(content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_provider_reads_and_caps() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let provider = FsContentProvider;
        assert_eq!(provider.read_capped(&path, 1024).unwrap(), "hello");
        assert!(matches!(
            provider.read_capped(&path, 2),
            Err(ReadError::TooLarge { size: 5, cap: 2 })
        ));
    }

    #[test]
    fn test_fs_provider_rejects_non_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bin.dat");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let provider = FsContentProvider;
        assert!(matches!(
            provider.read_capped(&path, 1024),
            Err(ReadError::NonUtf8)
        ));
    }

    #[test]
    fn test_memory_provider_matches_fixture() {
        let mut provider = MemoryContentProvider::new();
        provider.insert("src/lib.rs", "pub fn x() {}");

        assert!(provider.exists(Path::new("src/lib.rs")));
        assert!(!provider.exists(Path::new("src/other.rs")));
        assert_eq!(
            provider.read_capped(Path::new("src/lib.rs"), 64).unwrap(),
            "pub fn x() {}"
        );
    }
}
