//! MySQL/MariaDB driver implementation
//!
//! `mysql_async` does the networking; [`MySqlConnection`] drives it from a
//! private Tokio runtime so the dump engine can stay synchronous.

mod config;
mod connection;

pub use config::ConnectionConfig;
pub use connection::MySqlConnection;
