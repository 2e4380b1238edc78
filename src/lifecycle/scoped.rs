//! Scoped-resource-producing function: acquisition and release live in one
//! function, the caller only supplies the body.

use rusqlite::Connection;
use std::path::Path;

use super::manual;
use super::scope::Scoped;
use crate::error::Result;

/// Open a connection wrapped so that it closes when the scope ends.
pub fn scoped_connection(path: impl AsRef<Path>) -> Result<Scoped<Connection>> {
    let path = path.as_ref();
    let conn = manual::open(path)?;
    let label = path.display().to_string();
    tracing::debug!("Acquired scoped connection {}", label);

    Ok(Scoped::new(conn, move |conn| {
        if let Err(e) = manual::close(conn) {
            tracing::warn!("Failed to release scoped connection {}: {}", label, e);
        } else {
            tracing::debug!("Released scoped connection {}", label);
        }
    }))
}

/// Acquire, yield the connection to `body`, release on every exit path.
pub fn with_connection<T, F>(path: impl AsRef<Path>, body: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    let conn = scoped_connection(path)?;
    body(&*conn)
}
