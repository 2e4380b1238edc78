//! Asynchronous variant: the connection lives behind a shared handle and
//! every SQLite call runs on tokio's blocking pool.

use rusqlite::Connection;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, TryLockError};

use super::manual;
use crate::blog::{self, Blog};
use crate::error::{Error, Result};

/// State shared by every clone of an [`AsyncConnection`].
#[derive(Debug)]
struct Shared {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let conn = match self.conn.get_mut() {
            Ok(conn) => conn.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if conn.is_some() {
            tracing::warn!(
                "Async connection {} dropped without close; releasing synchronously",
                self.path.display()
            );
        }
    }
}

/// Cloneable async handle to a single SQLite connection.
///
/// The connection is released by [`AsyncConnection::close`], or when the
/// last clone is dropped.
#[derive(Clone, Debug)]
pub struct AsyncConnection {
    shared: Arc<Shared>,
}

impl AsyncConnection {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || manual::open(open_path)).await??;
        tracing::debug!("Opened async connection to {}", path.display());
        Ok(Self {
            shared: Arc::new(Shared {
                path,
                conn: Mutex::new(Some(conn)),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = self.shared.clone();
        tokio::task::spawn_blocking(move || {
            let guard = shared
                .conn
                .lock()
                .map_err(|_| Error::Task("connection mutex poisoned".to_string()))?;
            let conn = guard.as_ref().ok_or(Error::Closed)?;
            f(conn)
        })
        .await?
    }

    /// Execute a single statement, returning rows affected.
    pub async fn execute(&self, sql: impl Into<String>) -> Result<usize> {
        let sql = sql.into();
        self.call(move |conn| Ok(conn.execute(&sql, [])?)).await
    }

    pub async fn create_blogs_table(&self) -> Result<()> {
        self.call(blog::create_table).await
    }

    pub async fn insert_blog(&self, entry: Blog) -> Result<usize> {
        self.call(move |conn| blog::insert(conn, &entry)).await
    }

    pub async fn fetch_blogs(&self) -> Result<Vec<Blog>> {
        self.call(blog::fetch_all).await
    }

    /// Whether `close` has run. Never blocks: a connection busy with a
    /// running call is reported as open.
    pub fn is_closed(&self) -> bool {
        match self.shared.conn.try_lock() {
            Ok(guard) => guard.is_none(),
            Err(TryLockError::WouldBlock) => false,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().is_none(),
        }
    }

    /// Release the connection. A second call is a no-op.
    pub async fn close(&self) -> Result<()> {
        let shared = self.shared.clone();
        tokio::task::spawn_blocking(move || {
            let taken = shared
                .conn
                .lock()
                .map_err(|_| Error::Task("connection mutex poisoned".to_string()))?
                .take();
            match taken {
                Some(conn) => {
                    tracing::debug!("Closing async connection {}", shared.path.display());
                    manual::close(conn)
                }
                None => Ok(()),
            }
        })
        .await?
    }
}

/// Open, await `body`, then close whether `body` succeeded or failed.
///
/// An error from `body` wins over an error from closing.
pub async fn with_async_connection<T, F, Fut>(path: impl AsRef<Path>, body: F) -> Result<T>
where
    F: FnOnce(AsyncConnection) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let conn = AsyncConnection::open(path).await?;
    let result = body(conn.clone()).await;
    let closed = conn.close().await;
    match result {
        Ok(value) => closed.map(|()| value),
        Err(e) => {
            if let Err(close_err) = closed {
                tracing::warn!("Ignoring close error after failed body: {}", close_err);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{hold_file_lock, is_released};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_async_round_trip() {
        let rows = with_async_connection(":memory:", |db| async move {
            db.create_blogs_table().await?;
            db.insert_blog(Blog::default()).await?;
            db.fetch_blogs().await
        })
        .await
        .unwrap();
        assert_eq!(rows, vec![Blog::default()]);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let db = AsyncConnection::open(":memory:").await.unwrap();
        assert!(!db.is_closed());
        db.close().await.unwrap();
        db.close().await.unwrap();
        assert!(db.is_closed());
    }

    #[tokio::test]
    async fn test_calls_after_close_fail() {
        let db = AsyncConnection::open(":memory:").await.unwrap();
        let clone = db.clone();
        db.close().await.unwrap();

        let err = clone.execute("CREATE TABLE t (x)").await.unwrap_err();
        assert!(matches!(err, Error::Closed));
    }

    #[tokio::test]
    async fn test_body_error_still_closes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("async.db");
        let mut leaked = None;

        let result: Result<()> = with_async_connection(&path, |db| {
            leaked = Some(db.clone());
            async move {
                db.create_blogs_table().await?;
                db.insert_blog(Blog::default()).await?;
                db.execute("SELECT * FROM missing").await?;
                Ok(())
            }
        })
        .await;
        assert!(matches!(result, Err(Error::Sqlite(_))));
        assert!(leaked.unwrap().is_closed());

        let db = AsyncConnection::open(&path).await.unwrap();
        assert_eq!(db.fetch_blogs().await.unwrap(), vec![Blog::default()]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_body_error_releases_file_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("async.db");

        let result: Result<()> = with_async_connection(&path, |db| async move {
            db.call(hold_file_lock).await?;
            Err(Error::Config("body failed".to_string()))
        })
        .await;
        assert!(matches!(result, Err(Error::Config(_))));
        assert!(is_released(&path));
    }

    #[tokio::test]
    async fn test_drop_without_close_releases() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("async.db");

        let db = AsyncConnection::open(&path).await.unwrap();
        assert_eq!(db.path(), path.as_path());
        let clone = db.clone();
        db.call(hold_file_lock).await.unwrap();

        drop(db);
        assert!(!is_released(&path));
        drop(clone);
        assert!(is_released(&path));
    }
}
