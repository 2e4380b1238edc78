//! scopedb library root.
//!
//! Opens a SQLite database, creates the `blogs` table, inserts one row and
//! reads it back, in four connection lifecycle styles.

pub mod blog;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod lifecycle;
pub mod logging;

pub use blog::Blog;
pub use cli::Commands;
pub use config::{load_settings, load_settings_or_default, Settings};
pub use demo::{run_all, run_style, Style};
pub use error::{Error, Result};
pub use lifecycle::{AsyncConnection, Scoped, Session, SessionGuard};
