//! CLI commands for scopedb using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{load_settings, load_settings_or_default, Settings};
use crate::demo::{self, Style};

/// scopedb - SQLite connection lifecycle demos.
#[derive(Parser, Debug)]
#[command(name = "scopedb")]
#[command(version)]
#[command(about = "Open, use and release a SQLite connection in several lifecycle styles", long_about = None)]
pub struct Commands {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path; `:memory:` for an in-memory database
    #[arg(long, global = true, env = "SCOPEDB_DATABASE")]
    pub database: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SCOPEDB_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Explicit open, explicit close on every path
    Manual,
    /// Custom guard type that commits and closes on exit
    Session,
    /// Function that produces a scoped connection
    Scoped,
    /// Async handle over the blocking pool
    Async,
    /// Run every style in turn
    All,
}

impl Commands {
    /// Resolve settings: file first, then command-line overrides.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => load_settings_or_default(),
        };
        if let Some(database) = &self.database {
            settings.database = database.clone();
        }
        if let Some(level) = &self.log_level {
            settings.log_level = level.clone();
        }
        Ok(settings)
    }

    pub async fn run(&self, settings: &Settings) -> Result<()> {
        let style = match self.command {
            Command::Manual => Style::Manual,
            Command::Session => Style::Session,
            Command::Scoped => Style::Scoped,
            Command::Async => Style::Async,
            Command::All => {
                demo::run_all(settings).await?;
                return Ok(());
            }
        };
        demo::run_style(style, settings)
            .await
            .with_context(|| format!("{} demo failed", style))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = Commands::try_parse_from([
            "scopedb",
            "--database",
            "/tmp/x.db",
            "--log-level",
            "debug",
            "session",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Session);
        assert_eq!(args.database.as_deref(), Some("/tmp/x.db"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_settings_applies_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"database": "/tmp/from-file.db", "log_level": "warn"}"#).unwrap();

        let args = Commands::try_parse_from([
            "scopedb",
            "--config",
            path.to_str().unwrap(),
            "--database",
            ":memory:",
            "all",
        ])
        .unwrap();
        let settings = args.settings().unwrap();
        assert_eq!(settings.database, ":memory:");
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Commands::try_parse_from(["scopedb", "bogus"]).is_err());
    }
}
