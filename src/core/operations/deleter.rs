use crate::core::errors::{SDError, SDResult};
use std::fs;
use std::io;
use std::path::Path;

/// Removes a single, already-emptied entry. Split out so traversal order and
/// failures can be observed.
pub trait EntryRemover: Send + Sync {
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsRemover;

impl EntryRemover for FsRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

pub trait TreeDeleter: Send + Sync {
    /// Deletes `path` and everything below it, returning how many entries
    /// were removed.
    fn delete_tree(&self, path: &Path) -> SDResult<usize>;

    fn describe(&self, path: &Path) -> String {
        format!("delete {} recursively", path.display())
    }
}

/// Post-order deleter: children go before their parent, and the first entry
/// that cannot be removed stops the whole walk.
#[derive(Debug, Default)]
pub struct RecursiveDeleter<R = FsRemover> {
    remover: R,
}

impl RecursiveDeleter {
    pub fn new() -> Self {
        Self::with_remover(FsRemover)
    }
}

impl<R: EntryRemover> RecursiveDeleter<R> {
    pub fn with_remover(remover: R) -> Self {
        Self { remover }
    }

    fn remove_entry(&self, path: &Path) -> SDResult<usize> {
        let entry_failure = |source: io::Error| SDError::DeletionEntryFailure {
            path: path.to_path_buf(),
            source,
        };

        // symlink_metadata so links are removed, never followed
        let metadata = fs::symlink_metadata(path).map_err(entry_failure)?;
        if !metadata.is_dir() {
            self.remover.remove_file(path).map_err(entry_failure)?;
            return Ok(1);
        }

        let mut removed = 0;
        for entry in fs::read_dir(path).map_err(entry_failure)? {
            let entry = entry.map_err(entry_failure)?;
            removed += self.remove_entry(&entry.path())?;
        }

        self.remover.remove_dir(path).map_err(entry_failure)?;
        Ok(removed + 1)
    }
}

impl<R: EntryRemover> TreeDeleter for RecursiveDeleter<R> {
    fn delete_tree(&self, path: &Path) -> SDResult<usize> {
        match fs::symlink_metadata(path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SDError::PathNotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(SDError::DeletionEntryFailure {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        tracing::debug!("Deleting tree at {}", path.display());
        let removed = self.remove_entry(path)?;
        tracing::info!(entries = removed, "Deleted tree at {}", path.display());

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Delegates to the filesystem, recording every removal and refusing the
    /// one path listed in `fail_on`.
    #[derive(Default)]
    struct RecordingRemover {
        removed: Mutex<Vec<PathBuf>>,
        fail_on: Option<PathBuf>,
    }

    impl RecordingRemover {
        fn check(&self, path: &Path) -> io::Result<()> {
            if self.fail_on.as_deref() == Some(path) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "entry is locked",
                ));
            }
            Ok(())
        }

        fn log(&self) -> Vec<PathBuf> {
            self.removed.lock().unwrap().clone()
        }
    }

    impl EntryRemover for RecordingRemover {
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.check(path)?;
            fs::remove_file(path)?;
            self.removed.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn remove_dir(&self, path: &Path) -> io::Result<()> {
            self.check(path)?;
            fs::remove_dir(path)?;
            self.removed.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    /// dir/{a.txt, sub/{b.txt}}
    fn sample_tree() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.txt"), "a").unwrap();
        fs::write(dir.join("sub/b.txt"), "b").unwrap();
        (temp, dir)
    }

    fn position(log: &[PathBuf], path: &Path) -> usize {
        log.iter().position(|p| p == path).unwrap()
    }

    #[test]
    fn test_delete_tree_removes_everything() {
        let (_temp, dir) = sample_tree();

        let removed = RecursiveDeleter::new().delete_tree(&dir).unwrap();

        assert_eq!(removed, 4);
        assert!(!dir.exists());
    }

    #[test]
    fn test_delete_tree_children_before_parents() {
        let (_temp, dir) = sample_tree();
        let deleter = RecursiveDeleter::with_remover(RecordingRemover::default());

        deleter.delete_tree(&dir).unwrap();

        let log = deleter.remover.log();
        assert_eq!(log.len(), 4);
        for path in &log {
            if let Some(parent) = path.parent().filter(|p| log.contains(&p.to_path_buf())) {
                assert!(position(&log, path) < position(&log, parent));
            }
        }
        assert!(position(&log, &dir.join("sub/b.txt")) < position(&log, &dir.join("sub")));
        assert_eq!(log.last(), Some(&dir));
    }

    #[test]
    fn test_delete_tree_not_found_mutates_nothing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("keep.txt"), "keep").unwrap();
        let deleter = RecursiveDeleter::with_remover(RecordingRemover::default());

        let result = deleter.delete_tree(&temp.path().join("missing"));

        assert!(matches!(result, Err(SDError::PathNotFound(_))));
        assert!(deleter.remover.log().is_empty());
        assert!(temp.path().join("keep.txt").exists());
    }

    #[test]
    fn test_delete_tree_aborts_on_first_failure() {
        let (_temp, dir) = sample_tree();
        let locked = dir.join("sub/b.txt");
        let deleter = RecursiveDeleter::with_remover(RecordingRemover {
            fail_on: Some(locked.clone()),
            ..Default::default()
        });

        let result = deleter.delete_tree(&dir);

        match result {
            Err(SDError::DeletionEntryFailure { path, .. }) => assert_eq!(path, locked),
            other => panic!("expected DeletionEntryFailure, got {other:?}"),
        }
        assert!(locked.exists());
        assert!(dir.join("sub").exists());
        assert!(dir.exists());

        // Nothing is removed after the failing entry; a.txt survives unless it
        // was visited first.
        let log = deleter.remover.log();
        assert!(log.iter().all(|p| p == &dir.join("a.txt")));
    }

    #[test]
    fn test_delete_single_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("lonely.txt");
        fs::write(&file, "x").unwrap();

        assert_eq!(RecursiveDeleter::new().delete_tree(&file).unwrap(), 1);
        assert!(!file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("precious.txt"), "keep").unwrap();

        let dir = temp.path().join("dir");
        fs::create_dir(&dir).unwrap();
        std::os::unix::fs::symlink(&outside, dir.join("link")).unwrap();

        RecursiveDeleter::new().delete_tree(&dir).unwrap();

        assert!(!dir.exists());
        assert!(outside.join("precious.txt").exists());
    }

    #[test]
    fn test_describe() {
        let text = RecursiveDeleter::new().describe(Path::new("/srv/site"));
        assert_eq!(text, "delete /srv/site recursively");
    }
}
