//! Custom scoped-resource type.
//!
//! `Session::open` acquires the connection, `Session::enter` starts the
//! scoped block and hands out a [`SessionGuard`]. Leaving the block, by
//! `exit()` or by dropping the guard, commits and closes the connection.
//! The commit happens on every exit path, error paths included.

use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// An opened but not yet entered session.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    conn: Connection,
}

impl Session {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        tracing::debug!("Session opened for {}", path.display());
        Ok(Self { path, conn })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enter the scoped block.
    pub fn enter(self) -> Result<SessionGuard> {
        tracing::info!("Entering session {}", self.path.display());
        self.conn.execute_batch("BEGIN DEFERRED")?;
        Ok(SessionGuard {
            path: self.path,
            conn: Some(self.conn),
        })
    }
}

/// Entered session - commits and closes when it goes out of scope.
#[derive(Debug)]
pub struct SessionGuard {
    path: PathBuf,
    conn: Option<Connection>,
}

impl SessionGuard {
    /// Leave the block now, reporting commit or close failures.
    pub fn exit(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        tracing::info!("Exiting session {}", self.path.display());

        let committed = if conn.is_autocommit() {
            Ok(())
        } else {
            conn.execute_batch("COMMIT").map_err(Error::from)
        };
        let closed = conn.close().map_err(|(_conn, e)| Error::Close(e));

        match (committed, closed) {
            (Ok(()), Ok(())) => {
                tracing::debug!("Session {} committed and closed", self.path.display());
                Ok(())
            }
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    tracing::warn!("Ignoring close error after failed commit: {}", close_err);
                }
                Err(e)
            }
            (Ok(()), Err(e)) => Err(e),
        }
    }
}

impl Deref for SessionGuard {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("session connection is only taken on exit"),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!("Failed to exit session {}: {}", self.path.display(), e);
        }
    }
}

/// Open and enter a session, run `body`, then exit.
///
/// An error from `body` wins over an error from exiting.
pub fn with_session<T, F>(path: impl AsRef<Path>, body: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    let guard = Session::open(path)?.enter()?;
    let result = body(&*guard);
    let exited = guard.exit();
    match result {
        Ok(value) => exited.map(|()| value),
        Err(e) => {
            if let Err(exit_err) = exited {
                tracing::warn!("Ignoring exit error after failed body: {}", exit_err);
            }
            Err(e)
        }
    }
}
