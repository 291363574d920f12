//! Config file loading and flag overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use sqldump_driver_mysql::ConnectionConfig;
use sqldump_engine::DumpOptions;
use std::path::{Path, PathBuf};

use crate::args::CliArgs;

/// Contents of `sqldump.toml`.
///
/// ```toml
/// [connection]
/// host = "db.internal"
/// database = "shop"
///
/// [dump]
/// exclude_tables = ["sessions"]
/// insert_mode = "INSERT IGNORE"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub connection: ConnectionConfig,
    pub dump: DumpOptions,
}

impl FileConfig {
    /// `<config dir>/sqldump/sqldump.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sqldump").join("sqldump.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&source)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// An explicit path must exist; the default location is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Apply command-line flags on top of the file's values
    pub fn with_overrides(mut self, args: &CliArgs) -> Self {
        let connection = &mut self.connection;
        if let Some(host) = &args.host {
            connection.host = host.clone();
        }
        if let Some(port) = args.port {
            connection.port = port;
        }
        if let Some(user) = &args.user {
            connection.user = user.clone();
        }
        if let Some(password) = &args.password {
            connection.password = password.clone();
        }
        if let Some(database) = &args.database {
            connection.database = database.clone();
        }
        if let Some(charset) = &args.charset {
            connection.charset = charset.clone();
        }

        let dump = &mut self.dump;
        if !args.tables.is_empty() {
            dump.include_tables = args.tables.iter().cloned().collect();
        }
        dump.exclude_tables.extend(args.exclude.iter().cloned());
        if args.no_create_tables {
            dump.create_tables = false;
        }
        if args.no_data {
            dump.insert_data = false;
        }
        if let Some(mode) = args.insert_mode {
            dump.insert_mode = mode;
        }
        if args.no_safe_mode {
            dump.safe_mode = false;
        }
        dump.drop_database |= args.drop_database;
        dump.create_database |= args.create_database;
        dump.drop_tables |= args.drop_tables;
        dump.delete_data_first |= args.delete_data;

        self
    }
}
