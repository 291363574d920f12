//! Command-line arguments

use clap::Parser;
use sqldump_engine::InsertMode;
use std::path::PathBuf;

/// Dump a MySQL database as a replayable SQL script
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "sqldump",
    version,
    about = "Dump a MySQL database as a replayable SQL script",
    long_about = "Connects to a MySQL/MariaDB server, reads table definitions and rows,\n\
                  and writes a script of CREATE/INSERT statements wrapped in session pragmas.\n\n\
                  Settings are read from the config file first; flags override them.",
    after_help = "EXAMPLES:\n    \
        sqldump -d shop > shop.sql\n    \
        sqldump -d shop -o backups/shop.sql.gz --exclude sessions,cache\n    \
        sqldump -d shop --tables users,orders --no-create-tables --insert-mode replace\n    \
        sqldump -c ./sqldump.toml --drop-tables --delete-data"
)]
pub struct CliArgs {
    /// Config file (default: <config dir>/sqldump/sqldump.toml, if present)
    #[arg(short, long, value_name = "FILE", env = "SQLDUMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server host
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short = 'P', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// User name
    #[arg(short, long, value_name = "USER")]
    pub user: Option<String>,

    /// Password
    #[arg(short, long, value_name = "PASSWORD", env = "SQLDUMP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database to dump
    #[arg(short, long, value_name = "NAME")]
    pub database: Option<String>,

    /// Client character set
    #[arg(long, value_name = "CHARSET")]
    pub charset: Option<String>,

    /// Output file; `.gz` compresses. Writes to stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only dump these tables (repeatable or comma-separated)
    #[arg(long = "tables", value_name = "TABLE", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub tables: Vec<String>,

    /// Skip these tables (repeatable or comma-separated)
    #[arg(long = "exclude", value_name = "TABLE", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Do not emit CREATE TABLE statements
    #[arg(long)]
    pub no_create_tables: bool,

    /// Do not emit row data
    #[arg(long)]
    pub no_data: bool,

    /// Insert keyword: insert, insert-ignore or replace
    #[arg(long, value_name = "MODE")]
    pub insert_mode: Option<InsertMode>,

    /// Drop the IF EXISTS / IF NOT EXISTS guards
    #[arg(long)]
    pub no_safe_mode: bool,

    /// Emit DROP DATABASE
    #[arg(long)]
    pub drop_database: bool,

    /// Emit CREATE DATABASE
    #[arg(long)]
    pub create_database: bool,

    /// Emit DROP TABLE before each table
    #[arg(long)]
    pub drop_tables: bool,

    /// Emit TRUNCATE TABLE before each insert block
    #[arg(long)]
    pub delete_data: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_is_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_connection_flags() {
        let args = CliArgs::try_parse_from([
            "sqldump", "-H", "db.internal", "-P", "3307", "-u", "backup", "-d", "shop",
        ])
        .unwrap();
        assert_eq!(args.host.as_deref(), Some("db.internal"));
        assert_eq!(args.port, Some(3307));
        assert_eq!(args.user.as_deref(), Some("backup"));
        assert_eq!(args.database.as_deref(), Some("shop"));
        assert_eq!(args.output, None);
    }

    #[test]
    fn test_table_lists_split_on_commas() {
        let args = CliArgs::try_parse_from([
            "sqldump",
            "--tables",
            "users,orders",
            "--exclude",
            "sessions",
            "--exclude",
            "cache",
        ])
        .unwrap();
        assert_eq!(args.tables, vec!["users", "orders"]);
        assert_eq!(args.exclude, vec!["sessions", "cache"]);
    }

    #[test]
    fn test_insert_mode_values() {
        let args = CliArgs::try_parse_from(["sqldump", "--insert-mode", "insert-ignore"]).unwrap();
        assert_eq!(args.insert_mode, Some(InsertMode::InsertIgnore));

        let args = CliArgs::try_parse_from(["sqldump", "--insert-mode", "REPLACE"]).unwrap();
        assert_eq!(args.insert_mode, Some(InsertMode::Replace));

        assert!(CliArgs::try_parse_from(["sqldump", "--insert-mode", "upsert"]).is_err());
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(CliArgs::try_parse_from(["sqldump", "-P", "70000"]).is_err());
    }
}
