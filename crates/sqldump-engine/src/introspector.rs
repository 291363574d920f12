//! Catalog listing and schema definition retrieval

use sqldump_core::{Connection, Result, dialect::quote_identifier};

use crate::options::DumpOptions;

const CREATE_TABLE: &str = "CREATE TABLE";
const CREATE_TABLE_IF_NOT_EXISTS: &str = "CREATE TABLE IF NOT EXISTS";

/// Reads object names and definitions from the catalog and renders the
/// schema-level statements (drop/create) for them.
#[derive(Debug, Clone, Copy)]
pub struct SchemaIntrospector {
    safe_mode: bool,
}

impl SchemaIntrospector {
    pub fn new(options: &DumpOptions) -> Self {
        Self {
            safe_mode: options.safe_mode,
        }
    }

    /// Object names in the order the server reports them
    #[tracing::instrument(skip(self, connection))]
    pub fn list_objects<C: Connection + ?Sized>(&self, connection: &mut C) -> Result<Vec<String>> {
        connection.list_objects()
    }

    /// Raw `SHOW CREATE TABLE` output, or an empty string when the server
    /// reports none (views answer with `Create View` instead).
    #[tracing::instrument(skip(self, connection))]
    pub fn get_definition<C: Connection + ?Sized>(
        &self,
        connection: &mut C,
        name: &str,
    ) -> Result<String> {
        let result = connection.query(&format!("SHOW CREATE TABLE {}", quote_identifier(name)))?;
        let definition = result
            .rows
            .first()
            .and_then(|row| row.get_by_name("Create Table"))
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .unwrap_or_default();

        if definition.is_empty() {
            tracing::debug!(object = %name, "no table definition reported");
        }
        Ok(definition)
    }

    /// Make a definition safe to replay against an existing table.
    ///
    /// Best effort: splices `IF NOT EXISTS` after the first literal
    /// `CREATE TABLE` in the text without parsing it. The server always emits
    /// that keyword pair first, so the first match is the statement's own.
    /// Text without the keyword is returned unchanged.
    pub fn to_idempotent_create(&self, definition: &str) -> String {
        if !self.safe_mode {
            return definition.to_string();
        }
        replace_first(definition, CREATE_TABLE, CREATE_TABLE_IF_NOT_EXISTS)
    }

    /// The create statement to emit for an object, if it has a definition
    pub fn create_statement<C: Connection + ?Sized>(
        &self,
        connection: &mut C,
        name: &str,
    ) -> Result<Option<String>> {
        let definition = self.get_definition(connection, name)?;
        if definition.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{};", self.to_idempotent_create(&definition))))
    }

    pub fn drop_table_statement(&self, name: &str) -> String {
        format!("DROP TABLE{} {};", self.if_exists(), quote_identifier(name))
    }

    pub fn drop_database_statement(&self, database: &str) -> String {
        format!("DROP DATABASE{} {};", self.if_exists(), quote_identifier(database))
    }

    pub fn create_database_statement(&self, database: &str) -> String {
        let guard = if self.safe_mode { " IF NOT EXISTS" } else { "" };
        format!("CREATE DATABASE{} {};", guard, quote_identifier(database))
    }

    fn if_exists(&self) -> &'static str {
        if self.safe_mode { " IF EXISTS" } else { "" }
    }
}

/// Replace the first occurrence of `needle` in `haystack`
pub fn replace_first(haystack: &str, needle: &str, replacement: &str) -> String {
    match haystack.find(needle) {
        Some(pos) => {
            let mut out = String::with_capacity(haystack.len() + replacement.len());
            out.push_str(&haystack[..pos]);
            out.push_str(replacement);
            out.push_str(&haystack[pos + needle.len()..]);
            out
        }
        None => haystack.to_string(),
    }
}
