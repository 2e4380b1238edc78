//! Manual open/close: the caller closes the handle on every path itself.

use rusqlite::Connection;
use std::path::Path;

use crate::error::{Error, Result};

/// Open a connection. `":memory:"` gives a private in-memory database.
pub fn open(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    tracing::debug!("Opened connection to {}", path.display());
    Ok(conn)
}

/// Close a connection, surfacing the close failure.
///
/// The handle is gone either way: on failure rusqlite hands it back and it
/// is dropped here.
pub fn close(conn: Connection) -> Result<()> {
    match conn.close() {
        Ok(()) => {
            tracing::debug!("Closed connection");
            Ok(())
        }
        Err((_conn, e)) => {
            tracing::warn!("Failed to close connection: {}", e);
            Err(Error::Close(e))
        }
    }
}

/// Open, run `body`, then close on both the success and the error path.
///
/// An error from `body` wins over an error from closing.
pub fn with_manual_close<T, F>(path: impl AsRef<Path>, body: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    let conn = open(path)?;
    let result = body(&conn);
    let closed = close(conn);

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                tracing::warn!("Ignoring close error after failed body: {}", close_err);
            }
            Err(e)
        }
    }
}
