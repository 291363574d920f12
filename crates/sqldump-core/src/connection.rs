//! Connection trait consumed by the dump engine

use crate::{QueryResult, Result, StatementResult, dialect};

/// A blocking, exclusively borrowed database connection.
///
/// Every method that talks to the server takes `&mut self`: a connection runs
/// one statement at a time and a dump generation holds it for its whole pass,
/// so two generations can never interleave on the same handle. Opening and
/// closing the connection is the caller's job; the engine only borrows it.
pub trait Connection {
    /// Get the driver name (e.g. "mysql")
    fn driver_name(&self) -> &str;

    /// Host the connection was opened against, as given by the caller
    fn host(&self) -> &str;

    /// The database (schema) the connection has selected
    fn database_name(&self) -> &str;

    /// Server version string as reported by the server, e.g. `8.0.36`
    fn server_version(&self) -> &str;

    /// Character set negotiated for the client side of the connection
    fn character_set_name(&self) -> &str;

    /// Execute a query that returns rows
    fn query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Execute a statement that returns no rows
    fn execute(&mut self, sql: &str) -> Result<StatementResult>;

    /// Escape text for inclusion in a single-quoted literal.
    ///
    /// Literals are read back by the session the dump script sets up, not by
    /// the source session, so this uses backslash escaping even when the
    /// source runs with `NO_BACKSLASH_ESCAPES`.
    fn escape_literal(&self, text: &str) -> String {
        dialect::escape_string(text)
    }

    /// List the tables (and views) of the selected database.
    ///
    /// Names are returned in the order the server reports them.
    fn list_objects(&mut self) -> Result<Vec<String>> {
        let result = self.query("SHOW TABLES")?;
        tracing::debug!(count = result.row_count(), "listed catalog objects");
        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).filter(|v| !v.is_null()).map(|v| v.to_string()))
            .collect())
    }

    /// Close the connection
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
