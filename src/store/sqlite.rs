use crate::core::errors::{SDError, SDResult};
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const COMPANION_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// Drops a SQLite database: confirms the file really is a database, then
/// removes it together with its journal files.
pub fn drop_database(path: &Path) -> SDResult<()> {
    verify_database(path).map_err(|e| {
        SDError::StoreCommandFailure(format!(
            "{} is not a usable sqlite database: {e}",
            path.display()
        ))
    })?;

    fs::remove_file(path).map_err(|e| {
        SDError::StoreCommandFailure(format!("failed to remove {}: {e}", path.display()))
    })?;

    for companion in companions(path) {
        match fs::remove_file(&companion) {
            Ok(()) => tracing::debug!("Removed {}", companion.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SDError::StoreCommandFailure(format!(
                    "failed to remove {}: {e}",
                    companion.display()
                )));
            }
        }
    }

    Ok(())
}

fn verify_database(path: &Path) -> SDResult<()> {
    // No SQLITE_OPEN_CREATE: a missing file must not be silently created.
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let _tables: i64 = conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))?;
    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE)")?;

    conn.close().map_err(|(_, e)| SDError::SqliteError(e))
}

fn companions(path: &Path) -> Vec<PathBuf> {
    COMPANION_SUFFIXES
        .iter()
        .map(|suffix| {
            let mut name = path.as_os_str().to_owned();
            name.push(suffix);
            PathBuf::from(name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT);
             INSERT INTO posts (title) VALUES ('hello');",
        )
        .unwrap();
    }

    #[test]
    fn test_drop_database_removes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site.db");
        create_db(&path);

        drop_database(&path).unwrap();

        assert!(!path.exists());
        for companion in companions(&path) {
            assert!(!companion.exists());
        }
    }

    #[test]
    fn test_drop_missing_database_fails_without_creating() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.db");

        let result = drop_database(&path);

        assert!(matches!(result, Err(SDError::StoreCommandFailure(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_refuses_non_database_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "definitely not a database\n".repeat(40)).unwrap();

        let result = drop_database(&path);

        assert!(matches!(result, Err(SDError::StoreCommandFailure(_))));
        assert!(path.exists());
    }

    #[test]
    fn test_companions() {
        let names: Vec<_> = companions(Path::new("/srv/site.db"))
            .into_iter()
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["/srv/site.db-wal", "/srv/site.db-shm", "/srv/site.db-journal"]
        );
    }
}
