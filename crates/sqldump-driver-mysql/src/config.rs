//! Connection settings

use mysql_async::{Opts, OptsBuilder};
use serde::{Deserialize, Serialize};
use sqldump_core::{Result, SqlDumpError};

/// Where and how to connect.
///
/// Deserializes from the `[connection]` table of the CLI's config file; every
/// key is optional and falls back to the local development defaults.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Client character set, sent as `SET NAMES` when the session opens
    pub charset: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "app".to_string(),
            charset: "utf8".to_string(),
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("charset", &self.charset)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// `mysql://user@host:port/database`, password omitted
    pub fn display_url(&self) -> String {
        format!(
            "mysql://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }

    /// Build `mysql_async` options, including the `SET NAMES` init statement.
    pub(crate) fn to_opts(&self) -> Result<Opts> {
        validate_charset(&self.charset)?;
        if self.database.is_empty() {
            return Err(SqlDumpError::Configuration(
                "a database name is required".into(),
            ));
        }

        let mut opts_builder = OptsBuilder::from_opts(Opts::default())
            .ip_or_hostname(self.host.as_str())
            .tcp_port(self.port)
            .db_name(Some(self.database.as_str()))
            .user(Some(self.user.as_str()))
            .init(vec![format!("SET NAMES {}", self.charset)]);

        if !self.password.is_empty() {
            opts_builder = opts_builder.pass(Some(self.password.as_str()));
        }

        Ok(opts_builder.into())
    }
}

/// Character set names go into `SET NAMES` unquoted.
fn validate_charset(charset: &str) -> Result<()> {
    let valid = !charset.is_empty()
        && charset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SqlDumpError::Configuration(format!(
            "invalid character set name: {:?}",
            charset
        )))
    }
}
