//! The `blogs` table shared by every lifecycle demo.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const CREATE_TABLE_SQL: &str = "CREATE TABLE blogs (name text, url text)";
const INSERT_SQL: &str = "INSERT INTO blogs (name, url) VALUES (?1, ?2)";
const SELECT_SQL: &str = "SELECT name, url FROM blogs ORDER BY rowid";

/// A single row of the `blogs` table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Blog {
    pub name: String,
    pub url: String,
}

impl Blog {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl Default for Blog {
    fn default() -> Self {
        Self::new("The Python Standard Library", "https://docs.python.org/3/")
    }
}

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_TABLE_SQL, [])?;
    tracing::debug!("Created table blogs");
    Ok(())
}

/// Insert one row, returning the number of rows affected.
pub fn insert(conn: &Connection, blog: &Blog) -> Result<usize> {
    let changed = conn.execute(INSERT_SQL, params![blog.name, blog.url])?;
    tracing::debug!("Inserted blog {:?}", blog.name);
    Ok(changed)
}

pub fn fetch_all(conn: &Connection) -> Result<Vec<Blog>> {
    let mut stmt = conn.prepare(SELECT_SQL)?;
    let rows = stmt.query_map([], |row| {
        Ok(Blog {
            name: row.get(0)?,
            url: row.get(1)?,
        })
    })?;

    let mut blogs = Vec::new();
    for row in rows {
        blogs.push(row?);
    }
    Ok(blogs)
}

/// Create the table, insert `blog`, and read everything back.
pub fn run_demo(conn: &Connection, blog: &Blog) -> Result<Vec<Blog>> {
    create_table(conn)?;
    insert(conn, blog)?;
    fetch_all(conn)
}
