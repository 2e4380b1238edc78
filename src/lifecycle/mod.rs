//! Connection lifecycle styles.
//!
//! Every style guarantees the connection is released exactly once, however
//! the block that uses it exits.

pub mod async_conn;
pub mod manual;
pub mod scope;
pub mod scoped;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use async_conn::{with_async_connection, AsyncConnection};
pub use manual::with_manual_close;
pub use scope::Scoped;
pub use scoped::{scoped_connection, with_connection};
pub use session::{with_session, Session, SessionGuard};
