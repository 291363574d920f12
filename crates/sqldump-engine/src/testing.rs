//! In-memory connection used by the engine's tests

use sqldump_core::{
    ColumnMeta, Connection, QueryResult, Result, Row, SqlDumpError, StatementResult, Value,
};
use std::sync::Arc;

struct MockObject {
    name: String,
    is_view: bool,
    definition: Option<String>,
    columns: Arc<[String]>,
    rows: Vec<Vec<Value>>,
}

/// Answers the handful of catalog and data queries the engine issues
pub struct MockConnection {
    database: String,
    objects: Vec<MockObject>,
    failure: Option<(String, u16)>,
    queries: Vec<String>,
}

pub fn row(columns: &[&str], values: Vec<Value>) -> Row {
    Row::new(column_names(columns), values)
}

fn column_names(columns: &[&str]) -> Arc<[String]> {
    columns.iter().map(|c| c.to_string()).collect()
}

impl MockConnection {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            objects: Vec::new(),
            failure: None,
            queries: Vec::new(),
        }
    }

    pub fn with_table(
        mut self,
        name: &str,
        definition: Option<&str>,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Self {
        self.objects.push(MockObject {
            name: name.to_string(),
            is_view: false,
            definition: definition.map(str::to_string),
            columns: column_names(columns),
            rows,
        });
        self
    }

    /// A table with a canonical definition and the given rows
    pub fn with_simple_table(self, name: &str, rows: Vec<Vec<Value>>) -> Self {
        let definition = format!(
            "CREATE TABLE `{}` (\n  `id` int NOT NULL,\n  `name` varchar(50) DEFAULT NULL,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
            name
        );
        self.with_table(name, Some(&definition), &["id", "name"], rows)
    }

    pub fn with_view(mut self, name: &str) -> Self {
        self.objects.push(MockObject {
            name: name.to_string(),
            is_view: true,
            definition: Some(format!(
                "CREATE ALGORITHM=UNDEFINED DEFINER=`root`@`%` SQL SECURITY DEFINER VIEW `{}` AS select 1 AS `id`",
                name
            )),
            columns: column_names(&["id"]),
            rows: vec![vec![Value::Int64(1)]],
        });
        self
    }

    /// Fail any statement starting with `sql_prefix` with the given code
    pub fn fail_on(mut self, sql_prefix: &str, code: u16) -> Self {
        self.failure = Some((sql_prefix.to_string(), code));
        self
    }

    /// Every statement received so far, in order
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    fn object(&self, sql: &str, prefix: &str) -> Result<&MockObject> {
        let name = unquote(sql.trim_start_matches(prefix).trim());
        self.objects.iter().find(|o| o.name == name).ok_or_else(|| {
            SqlDumpError::query(
                1146,
                format!("Table '{}.{}' doesn't exist", self.database, name),
            )
        })
    }
}

fn unquote(identifier: &str) -> String {
    identifier
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
        .unwrap_or(identifier)
        .replace("``", "`")
}

fn result(columns: Arc<[String]>, rows: Vec<Vec<Value>>) -> QueryResult {
    QueryResult {
        columns: columns
            .iter()
            .enumerate()
            .map(|(ordinal, name)| ColumnMeta {
                name: name.clone(),
                ordinal,
            })
            .collect(),
        rows: rows
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect(),
        execution_time_ms: 0,
    }
}

impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "localhost"
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    fn server_version(&self) -> &str {
        "8.0.36-mock"
    }

    fn character_set_name(&self) -> &str {
        "utf8mb4"
    }

    fn query(&mut self, sql: &str) -> Result<QueryResult> {
        self.queries.push(sql.to_string());

        if let Some((prefix, code)) = &self.failure {
            if sql.starts_with(prefix.as_str()) {
                return Err(SqlDumpError::query(*code, format!("mock failure for {}", sql)));
            }
        }

        if sql == "SHOW TABLES" {
            let columns = column_names(&[&format!("Tables_in_{}", self.database)]);
            let rows = self
                .objects
                .iter()
                .map(|o| vec![Value::String(o.name.clone())])
                .collect();
            return Ok(result(columns, rows));
        }

        if sql.starts_with("SHOW CREATE TABLE ") {
            let object = self.object(sql, "SHOW CREATE TABLE ")?;
            let definition = object
                .definition
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null);
            let columns = if object.is_view {
                column_names(&["View", "Create View", "character_set_client", "collation_connection"])
            } else {
                column_names(&["Table", "Create Table"])
            };
            let mut values = vec![Value::String(object.name.clone()), definition];
            if object.is_view {
                values.push(Value::String("utf8mb4".into()));
                values.push(Value::String("utf8mb4_0900_ai_ci".into()));
            }
            return Ok(result(columns, vec![values]));
        }

        if sql.starts_with("SELECT * FROM ") {
            let object = self.object(sql, "SELECT * FROM ")?;
            return Ok(result(object.columns.clone(), object.rows.clone()));
        }

        Err(SqlDumpError::query(
            1064,
            format!("You have an error in your SQL syntax near '{}'", sql),
        ))
    }

    fn execute(&mut self, sql: &str) -> Result<StatementResult> {
        self.queries.push(sql.to_string());
        Ok(StatementResult::default())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
