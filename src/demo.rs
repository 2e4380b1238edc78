//! The create / insert / read-back demo, once per lifecycle style.

use std::fmt;

use crate::blog::{self, Blog};
use crate::config::Settings;
use crate::error::Result;
use crate::lifecycle::{with_async_connection, with_connection, with_manual_close, with_session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Explicit open, explicit close on every path
    Manual,
    /// Custom guard type that commits and closes on exit
    Session,
    /// Function that produces a scoped connection
    Scoped,
    /// Async handle over the blocking pool
    Async,
}

impl Style {
    pub const ALL: [Style; 4] = [Style::Manual, Style::Session, Style::Scoped, Style::Async];
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Style::Manual => "manual",
            Style::Session => "session",
            Style::Scoped => "scoped",
            Style::Async => "async",
        };
        f.write_str(name)
    }
}

/// Run the demo in one style and log the rows it read back.
pub async fn run_style(style: Style, settings: &Settings) -> Result<Vec<Blog>> {
    let database = settings.database.as_str();
    let entry = settings.blog.clone();
    tracing::debug!("Running {} demo against {}", style, database);

    let rows = match style {
        Style::Manual => with_manual_close(database, |conn| blog::run_demo(conn, &entry))?,
        Style::Session => with_session(database, |conn| blog::run_demo(conn, &entry))?,
        Style::Scoped => with_connection(database, |conn| blog::run_demo(conn, &entry))?,
        Style::Async => {
            with_async_connection(database, |db| async move {
                db.create_blogs_table().await?;
                db.insert_blog(entry).await?;
                db.fetch_blogs().await
            })
            .await?
        }
    };

    tracing::info!(style = %style, "{:?}", rows);
    Ok(rows)
}

/// Run every style in turn, stopping at the first failure.
pub async fn run_all(settings: &Settings) -> Result<()> {
    for style in Style::ALL {
        run_style(style, settings).await?;
    }
    Ok(())
}
