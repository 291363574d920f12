//! MySQL connection implementation

use mysql_async::{Conn, Row as MySqlRow, prelude::*};
use sqldump_core::{
    ColumnMeta, Connection, QueryResult, Result, Row, SqlDumpError, StatementResult, Value,
};
use std::sync::Arc;
use std::time::Instant;

use crate::config::ConnectionConfig;

/// Tokio runtime owned by one connection.
///
/// mysql_async needs a Tokio context for its networking; the dump engine is
/// synchronous, so every call blocks on this runtime.
fn build_mysql_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .thread_name("sqldump-mysql-runtime")
        .build()
        .map_err(|e| {
            SqlDumpError::Connection(format!("Failed to create Tokio runtime for MySQL: {}", e))
        })
}

/// A single blocking MySQL session.
///
/// Server facts the dump header needs (version, client charset) are read
/// once at connect time.
pub struct MySqlConnection {
    // Dropping without `close` releases the socket but never sends COM_QUIT.
    conn: Conn,
    runtime: tokio::runtime::Runtime,
    host: String,
    database: String,
    server_version: String,
    charset: String,
}

impl MySqlConnection {
    /// Connect to a MySQL database.
    ///
    /// Must not be called from inside an async runtime.
    #[tracing::instrument(skip(config), fields(host = %config.host, port = config.port, database = %config.database))]
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(SqlDumpError::Connection(
                "MySqlConnection blocks and cannot be opened inside an async runtime".into(),
            ));
        }

        tracing::info!(url = %config.display_url(), "connecting to MySQL database");
        let opts = config.to_opts()?;
        let runtime = build_mysql_runtime()?;

        let (conn, server_version, charset, sql_mode) = runtime.block_on(async move {
            let mut conn = Conn::new(opts)
                .await
                .map_err(|e| SqlDumpError::Connection(format!("Failed to connect to MySQL: {}", e)))?;

            let session: Option<(String, String, String)> = conn
                .query_first("SELECT VERSION(), @@character_set_client, @@SESSION.sql_mode")
                .await
                .map_err(|e| {
                    SqlDumpError::Connection(format!("Failed to read session variables: {}", e))
                })?;
            let (version, charset, sql_mode) = session.unwrap_or_default();
            Ok::<_, SqlDumpError>((conn, version, charset, sql_mode))
        })?;

        tracing::info!(
            server_version = %server_version,
            charset = %charset,
            "MySQL connection established"
        );
        if has_no_backslash_escapes(&sql_mode) {
            tracing::debug!(
                sql_mode = %sql_mode,
                "source session has NO_BACKSLASH_ESCAPES; dump literals still use backslash escapes"
            );
        }

        Ok(Self {
            conn,
            runtime,
            host: config.host.clone(),
            database: config.database.clone(),
            server_version,
            charset,
        })
    }
}

fn has_no_backslash_escapes(sql_mode: &str) -> bool {
    sql_mode
        .split(',')
        .any(|mode| mode.trim().eq_ignore_ascii_case("NO_BACKSLASH_ESCAPES"))
}

/// Server errors keep their numeric code; client-side failures report 0.
fn query_error(error: mysql_async::Error) -> SqlDumpError {
    match error {
        mysql_async::Error::Server(server) => SqlDumpError::Query {
            code: server.code,
            message: server.message,
        },
        other => SqlDumpError::query(0, other.to_string()),
    }
}

/// Convert a MySQL value into a dump value.
///
/// The text protocol delivers every column as bytes; they are kept as the
/// server's own rendering so decimals and temporal values survive verbatim.
/// The typed variants only arrive through the binary protocol.
fn mysql_value_to_value(val: mysql_async::Value) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        mysql_async::Value::Int(i) => Value::Int64(i),
        mysql_async::Value::UInt(u) => Value::UInt64(u),
        mysql_async::Value::Float(f) => Value::Float64(f as f64),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            let date = chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                match date {
                    Some(date) => Value::Date(date),
                    // Zero dates such as 0000-00-00 have no chrono form
                    None => Value::String(format!("{:04}-{:02}-{:02}", year, month, day)),
                }
            } else {
                match date.and_then(|d| {
                    d.and_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                }) {
                    Some(dt) => Value::DateTime(dt),
                    None => Value::String(format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                        year, month, day, hour, min, sec
                    )),
                }
            }
        }
        mysql_async::Value::Time(negative, days, hours, mins, secs, micros) => {
            let total_hours = days * 24 + hours as u32;
            let sign = if negative { "-" } else { "" };
            if micros == 0 {
                Value::String(format!("{}{:02}:{:02}:{:02}", sign, total_hours, mins, secs))
            } else {
                Value::String(format!(
                    "{}{:02}:{:02}:{:02}.{:06}",
                    sign, total_hours, mins, secs, micros
                ))
            }
        }
    }
}

fn convert_row(mut mysql_row: MySqlRow, columns: &Arc<[String]>) -> Row {
    let values = (0..columns.len())
        .map(|idx| {
            mysql_row
                .take::<mysql_async::Value, _>(idx)
                .map(mysql_value_to_value)
                .unwrap_or(Value::Null)
        })
        .collect();
    Row::new(columns.clone(), values)
}

impl Connection for MySqlConnection {
    fn driver_name(&self) -> &str {
        "mysql"
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    fn server_version(&self) -> &str {
        &self.server_version
    }

    fn character_set_name(&self) -> &str {
        &self.charset
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    fn query(&mut self, sql: &str) -> Result<QueryResult> {
        let start_time = Instant::now();

        let mysql_rows: Vec<MySqlRow> = self
            .runtime
            .block_on(self.conn.query(sql))
            .map_err(query_error)?;

        let mut columns = Vec::new();
        if let Some(first_row) = mysql_rows.first() {
            for (idx, col) in first_row.columns_ref().iter().enumerate() {
                columns.push(ColumnMeta {
                    name: col.name_str().to_string(),
                    ordinal: idx,
                });
            }
        }
        let column_names: Arc<[String]> = columns.iter().map(|c| c.name.clone()).collect();

        let rows: Vec<Row> = mysql_rows
            .into_iter()
            .map(|mysql_row| convert_row(mysql_row, &column_names))
            .collect();

        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(
            row_count = rows.len(),
            execution_time_ms = execution_time_ms,
            "query executed successfully"
        );

        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms,
        })
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    fn execute(&mut self, sql: &str) -> Result<StatementResult> {
        self.runtime
            .block_on(self.conn.query_drop(sql))
            .map_err(query_error)?;
        let affected_rows = self.conn.affected_rows();

        tracing::debug!(affected_rows = affected_rows, "statement executed");
        Ok(StatementResult { affected_rows })
    }

    fn close(self) -> Result<()> {
        tracing::info!(host = %self.host, "closing MySQL connection");
        let MySqlConnection { conn, runtime, .. } = self;
        runtime.block_on(conn.disconnect()).map_err(|e| {
            SqlDumpError::Connection(format!("Failed to close MySQL connection: {}", e))
        })
    }
}
