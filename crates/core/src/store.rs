//! Note storage.
//!
//! The sync engine only talks to a [`NoteStore`]; [`FsNoteStore`] is the
//! filesystem implementation used by the binaries.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::VaultError;

/// Read/write access to markdown notes by path.
pub trait NoteStore: Send + Sync {
    /// Full note text, or `None` if the note does not exist.
    fn read(&self, path: &Path) -> Result<Option<String>, VaultError>;

    /// Replace the note at `path` with `text`, creating parent directories.
    fn write(&self, path: &Path, text: &str) -> Result<(), VaultError>;

    fn exists(&self, path: &Path) -> bool;

    /// Markdown files under `dir`, sorted. Only direct children unless
    /// `recursive`. A missing directory yields an empty list.
    fn list_markdown(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, VaultError>;
}

impl<T: NoteStore + ?Sized> NoteStore for &T {
    fn read(&self, path: &Path) -> Result<Option<String>, VaultError> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), VaultError> {
        (**self).write(path, text)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn list_markdown(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, VaultError> {
        (**self).list_markdown(dir, recursive)
    }
}

/// Filesystem-backed store. Writes go through a temp file in the target
/// directory that is then renamed over the note, so readers never observe a
/// partially written note.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsNoteStore;

impl NoteStore for FsNoteStore {
    fn read(&self, path: &Path) -> Result<Option<String>, VaultError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(VaultError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), VaultError> {
        let write_err = |source| VaultError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), bytes = text.len(), "note written");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_markdown(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, VaultError> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| VaultError::ScanFailed {
                path: dir.to_path_buf(),
                detail: e.to_string(),
            })?;
            let is_md = entry.path().extension().is_some_and(|ext| ext == "md");
            if entry.file_type().is_file() && is_md {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_note_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsNoteStore;
        assert!(store.read(&dir.path().join("nope.md")).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsNoteStore;
        let path = dir.path().join("Calendar/2025/July/18-07-2025.md");

        store.write(&path, "# first\n").unwrap();
        assert!(store.exists(&path));
        store.write(&path, "# second\n").unwrap();
        assert_eq!(store.read(&path).unwrap().as_deref(), Some("# second\n"));

        // No temp files left behind.
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_read_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsNoteStore.read(dir.path()).unwrap_err();
        assert!(matches!(err, VaultError::ReadFailed { .. }));
    }

    #[test]
    fn test_list_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let store = FsNoteStore;
        store.write(&root.join("2025/July.md"), "x").unwrap();
        store.write(&root.join("2025/July/18-07-2025.md"), "x").unwrap();
        store.write(&root.join("2025/July/01-07-2025.md"), "x").unwrap();
        std::fs::write(root.join("2025/notes.txt"), "x").unwrap();

        let shallow = store.list_markdown(&root.join("2025"), false).unwrap();
        assert_eq!(shallow, vec![root.join("2025/July.md")]);

        let deep = store.list_markdown(&root.join("2025"), true).unwrap();
        assert_eq!(
            deep,
            vec![
                root.join("2025/July/01-07-2025.md"),
                root.join("2025/July/18-07-2025.md"),
                root.join("2025/July.md"),
            ]
        );

        assert!(store.list_markdown(&root.join("missing"), true).unwrap().is_empty());
    }
}
