//! Test helpers that make an unreleased connection observable.
//!
//! In exclusive locking mode a connection keeps its write lock on the file
//! until it is closed, so a second reader fails with `SQLITE_BUSY` for as
//! long as the first handle is alive.

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Switch `conn` to exclusive locking and write, taking the file lock.
pub fn hold_file_lock(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA locking_mode = EXCLUSIVE;
         CREATE TABLE IF NOT EXISTS held (x INTEGER);
         INSERT INTO held (x) VALUES (1);",
    )?;
    Ok(())
}

/// True when a fresh connection can read `path` without waiting.
pub fn is_released(path: &Path) -> bool {
    let Ok(conn) = Connection::open(path) else {
        return false;
    };
    if conn.busy_timeout(Duration::ZERO).is_err() {
        return false;
    }
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_holder_is_detected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("held.db");

        let holder = Connection::open(&path).unwrap();
        hold_file_lock(&holder).unwrap();
        assert!(!is_released(&path));

        drop(holder);
        assert!(is_released(&path));
    }
}
