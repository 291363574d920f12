//! Dump options
//!
//! `DumpOptions` is built once, before any connection activity, and only ever
//! handed to the engine by shared reference.

use serde::{Deserialize, Serialize};
use sqldump_core::{Result, SqlDumpError};
use std::collections::BTreeSet;

/// Statement keyword used for row insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InsertMode {
    /// `INSERT`: fails on duplicate keys
    #[default]
    #[serde(rename = "INSERT", alias = "insert")]
    Insert,
    /// `INSERT IGNORE`: skips rows whose keys already exist
    #[serde(rename = "INSERT IGNORE", alias = "insert_ignore")]
    InsertIgnore,
    /// `REPLACE`: overwrites rows whose keys already exist
    #[serde(rename = "REPLACE", alias = "replace")]
    Replace,
}

impl InsertMode {
    pub fn keyword(&self) -> &'static str {
        match self {
            InsertMode::Insert => "INSERT",
            InsertMode::InsertIgnore => "INSERT IGNORE",
            InsertMode::Replace => "REPLACE",
        }
    }
}

impl std::fmt::Display for InsertMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl std::str::FromStr for InsertMode {
    type Err = SqlDumpError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "INSERT" => Ok(InsertMode::Insert),
            "INSERT IGNORE" | "IGNORE" => Ok(InsertMode::InsertIgnore),
            "REPLACE" => Ok(InsertMode::Replace),
            _ => Err(SqlDumpError::Configuration(format!(
                "Unknown insert mode '{}' (expected INSERT, INSERT IGNORE or REPLACE)",
                s
            ))),
        }
    }
}

/// Options for dump generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DumpOptions {
    /// Tables to include (empty = all tables)
    pub include_tables: BTreeSet<String>,
    /// Tables to exclude, applied after `include_tables`
    pub exclude_tables: BTreeSet<String>,
    /// Emit `CREATE TABLE` statements
    pub create_tables: bool,
    /// Emit a `CREATE DATABASE` statement
    pub create_database: bool,
    /// Emit `DROP TABLE` statements
    pub drop_tables: bool,
    /// Emit a `DROP DATABASE` statement
    pub drop_database: bool,
    /// Emit row data
    pub insert_data: bool,
    /// Emit `TRUNCATE TABLE` ahead of each non-empty insert block
    pub delete_data_first: bool,
    /// Keyword used for insert blocks
    pub insert_mode: InsertMode,
    /// Guard statements with `IF EXISTS` / `IF NOT EXISTS`
    pub safe_mode: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            include_tables: BTreeSet::new(),
            exclude_tables: BTreeSet::new(),
            create_tables: true,
            create_database: false,
            drop_tables: false,
            drop_database: false,
            insert_data: true,
            delete_data_first: false,
            insert_mode: InsertMode::Insert,
            safe_mode: true,
        }
    }
}

impl DumpOptions {
    pub fn schema_only() -> Self {
        Self {
            insert_data: false,
            ..Default::default()
        }
    }

    pub fn data_only() -> Self {
        Self {
            create_tables: false,
            ..Default::default()
        }
    }

    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_tables.extend(tables.into_iter().map(Into::into));
        self
    }

    pub fn with_insert_mode(mut self, mode: InsertMode) -> Self {
        self.insert_mode = mode;
        self
    }

    pub fn with_safe_mode(mut self, safe_mode: bool) -> Self {
        self.safe_mode = safe_mode;
        self
    }

    pub fn with_drop_statements(mut self, drop_database: bool, drop_tables: bool) -> Self {
        self.drop_database = drop_database;
        self.drop_tables = drop_tables;
        self
    }

    /// Whether a table passes the include whitelist and the exclude blacklist
    pub fn should_include_table(&self, table_name: &str) -> bool {
        if !self.include_tables.is_empty() && !self.include_tables.contains(table_name) {
            return false;
        }
        !self.exclude_tables.contains(table_name)
    }

    /// Filter a catalog listing, keeping the order it was reported in
    pub fn select_tables(&self, catalog: Vec<String>) -> Vec<String> {
        catalog
            .into_iter()
            .filter(|t| self.should_include_table(t))
            .collect()
    }

    /// Parse options from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source)
            .map_err(|e| SqlDumpError::Configuration(format!("Invalid dump options: {}", e)))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn catalog(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_dump_options_default() {
        let options = DumpOptions::default();
        assert!(options.create_tables);
        assert!(!options.create_database);
        assert!(!options.drop_tables);
        assert!(!options.drop_database);
        assert!(options.insert_data);
        assert!(!options.delete_data_first);
        assert!(options.safe_mode);
        assert_eq!(options.insert_mode, InsertMode::Insert);
        assert!(options.include_tables.is_empty());
        assert!(options.exclude_tables.is_empty());
    }

    #[test]
    fn test_dump_options_schema_only() {
        let options = DumpOptions::schema_only();
        assert!(options.create_tables);
        assert!(!options.insert_data);
    }

    #[test]
    fn test_dump_options_data_only() {
        let options = DumpOptions::data_only();
        assert!(!options.create_tables);
        assert!(options.insert_data);
    }

    #[test]
    fn test_select_tables_keeps_catalog_order() {
        let options = DumpOptions::default();
        let selected = options.select_tables(catalog(&["zebra", "apple", "mango"]));
        assert_eq!(selected, catalog(&["zebra", "apple", "mango"]));
    }

    #[test]
    fn test_include_is_whitelist() {
        let options = DumpOptions::default().with_tables(["mango", "zebra", "ghost"]);
        let selected = options.select_tables(catalog(&["zebra", "apple", "mango"]));
        assert_eq!(selected, catalog(&["zebra", "mango"]));
    }

    #[test]
    fn test_exclude_applies_after_include() {
        let options = DumpOptions::default()
            .with_tables(["zebra", "mango"])
            .exclude(["mango"]);
        let selected = options.select_tables(catalog(&["zebra", "apple", "mango"]));
        assert_eq!(selected, catalog(&["zebra"]));

        let only_exclude = DumpOptions::default().exclude(["apple"]);
        assert_eq!(
            only_exclude.select_tables(catalog(&["zebra", "apple", "mango"])),
            catalog(&["zebra", "mango"])
        );
    }

    #[test]
    fn test_insert_mode_parsing() {
        assert_eq!("insert".parse::<InsertMode>().unwrap(), InsertMode::Insert);
        assert_eq!(
            "INSERT IGNORE".parse::<InsertMode>().unwrap(),
            InsertMode::InsertIgnore
        );
        assert_eq!(
            "insert_ignore".parse::<InsertMode>().unwrap(),
            InsertMode::InsertIgnore
        );
        assert_eq!("Replace".parse::<InsertMode>().unwrap(), InsertMode::Replace);
        assert!(matches!(
            "upsert".parse::<InsertMode>(),
            Err(SqlDumpError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_toml_str() {
        let options = DumpOptions::from_toml_str(indoc! {r#"
            include_tables = ["users", "orders"]
            exclude_tables = ["orders"]
            drop_tables = true
            insert_mode = "REPLACE"
            safe_mode = false
        "#})
        .unwrap();

        assert_eq!(options.include_tables.len(), 2);
        assert!(options.exclude_tables.contains("orders"));
        assert!(options.drop_tables);
        assert!(options.create_tables, "unset keys keep their defaults");
        assert_eq!(options.insert_mode, InsertMode::Replace);
        assert!(!options.safe_mode);
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_keys() {
        let err = DumpOptions::from_toml_str("drop_everything = true").unwrap_err();
        assert!(matches!(err, SqlDumpError::Configuration(_)));
    }

    #[test]
    fn test_toml_round_trip_uses_keywords() {
        let options = DumpOptions::default().with_insert_mode(InsertMode::InsertIgnore);
        let text = toml::to_string(&options).unwrap();
        assert!(text.contains("insert_mode = \"INSERT IGNORE\""));
        assert_eq!(DumpOptions::from_toml_str(&text).unwrap(), options);
    }
}
