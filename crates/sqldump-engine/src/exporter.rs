//! Row export and insert block rendering

use sqldump_core::{Connection, Result, Row, dialect::quote_identifier};

use crate::escaper::ValueEscaper;
use crate::options::{DumpOptions, InsertMode};

/// Reads every row of a table and renders it as one batched insert statement
#[derive(Debug, Clone, Copy)]
pub struct DataExporter {
    insert_mode: InsertMode,
}

impl DataExporter {
    pub fn new(options: &DumpOptions) -> Self {
        Self {
            insert_mode: options.insert_mode,
        }
    }

    #[tracing::instrument(skip(self, connection))]
    pub fn export_rows<C: Connection + ?Sized>(
        &self,
        connection: &mut C,
        table_name: &str,
    ) -> Result<Vec<Row>> {
        let sql = format!("SELECT * FROM {}", quote_identifier(table_name));
        let result = connection.query(&sql)?;
        tracing::debug!(
            table = %table_name,
            row_count = result.row_count(),
            execution_time_ms = result.execution_time_ms,
            "exported rows"
        );
        Ok(result.rows)
    }

    /// Render all rows into a single statement, or `None` if there are none.
    ///
    /// The column list comes from the first row. Rows of one result set share
    /// a schema, so every later row is rendered positionally against it.
    pub fn render_insert_block<C: Connection + ?Sized>(
        &self,
        escaper: &ValueEscaper<'_, C>,
        table_name: &str,
        rows: &[Row],
    ) -> Option<String> {
        let first = rows.first()?;

        let columns = first
            .columns()
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        let tuples = rows
            .iter()
            .map(|row| render_tuple(escaper, row))
            .collect::<Vec<_>>()
            .join(", \n");

        Some(format!(
            "{} INTO {} ({}) VALUES\n{};",
            self.insert_mode.keyword(),
            quote_identifier(table_name),
            columns,
            tuples
        ))
    }

    pub fn truncate_statement(&self, table_name: &str) -> String {
        format!("TRUNCATE TABLE {};", quote_identifier(table_name))
    }
}

fn render_tuple<C: Connection + ?Sized>(escaper: &ValueEscaper<'_, C>, row: &Row) -> String {
    let values = row
        .values
        .iter()
        .map(|v| escaper.escape(v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("  ({})", values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockConnection, row};
    use pretty_assertions::assert_eq;
    use sqldump_core::{SqlDumpError, Value};

    fn exporter(mode: InsertMode) -> DataExporter {
        DataExporter::new(&DumpOptions::default().with_insert_mode(mode))
    }

    fn users() -> Vec<Row> {
        vec![
            row(&["id", "name"], vec![Value::Int64(1), Value::String("Ann".into())]),
            row(&["id", "name"], vec![Value::Int64(2), Value::Null]),
        ]
    }

    #[test]
    fn test_render_insert_block() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        let block = exporter(InsertMode::Insert)
            .render_insert_block(&escaper, "users", &users())
            .unwrap();
        assert_eq!(
            block,
            "INSERT INTO `users` (`id`, `name`) VALUES\n  ('1', 'Ann'), \n  ('2', NULL);"
        );
    }

    #[test]
    fn test_render_insert_block_modes() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        let ignore = exporter(InsertMode::InsertIgnore)
            .render_insert_block(&escaper, "users", &users())
            .unwrap();
        assert!(ignore.starts_with("INSERT IGNORE INTO `users`"));

        let replace = exporter(InsertMode::Replace)
            .render_insert_block(&escaper, "users", &users())
            .unwrap();
        assert!(replace.starts_with("REPLACE INTO `users`"));
    }

    #[test]
    fn test_render_insert_block_empty_rows() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        assert_eq!(
            exporter(InsertMode::Insert).render_insert_block(&escaper, "users", &[]),
            None
        );
    }

    #[test]
    fn test_single_null_column_row() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        let rows = vec![row(&["note"], vec![Value::Null])];
        let block = exporter(InsertMode::Insert)
            .render_insert_block(&escaper, "notes", &rows)
            .unwrap();
        assert_eq!(block, "INSERT INTO `notes` (`note`) VALUES\n  (NULL);");
    }

    #[test]
    fn test_row_without_columns_renders_empty_tuple() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        let empty = row(&[], vec![]);
        assert_eq!(render_tuple(&escaper, &empty), "  ()");

        let block = exporter(InsertMode::Insert)
            .render_insert_block(&escaper, "t", &[empty])
            .unwrap();
        assert_eq!(block, "INSERT INTO `t` () VALUES\n  ();");
    }

    #[test]
    fn test_trailing_separators_in_data_survive() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        let rows = vec![row(
            &["a", "b"],
            vec![Value::String("(x), ".into()), Value::String(")".into())],
        )];
        let block = exporter(InsertMode::Insert)
            .render_insert_block(&escaper, "t", &rows)
            .unwrap();
        assert_eq!(block, "INSERT INTO `t` (`a`, `b`) VALUES\n  ('(x), ', ')');");
    }

    #[test]
    fn test_export_rows_issues_full_select() {
        let mut conn = MockConnection::new("app").with_table(
            "users",
            Some("CREATE TABLE `users` (`id` int)"),
            &["id", "name"],
            vec![vec![Value::Int64(1), Value::String("Ann".into())]],
        );
        let rows = exporter(InsertMode::Insert).export_rows(&mut conn, "users").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), ["id", "name"]);
        assert_eq!(conn.queries(), ["SELECT * FROM `users`"]);
    }

    #[test]
    fn test_export_rows_propagates_failure() {
        let mut conn = MockConnection::new("app").fail_on("SELECT * FROM `users`", 1146);
        let err = exporter(InsertMode::Insert)
            .export_rows(&mut conn, "users")
            .unwrap_err();
        assert!(matches!(err, SqlDumpError::Query { code: 1146, .. }));
    }

    #[test]
    fn test_truncate_statement() {
        assert_eq!(
            exporter(InsertMode::Insert).truncate_statement("users"),
            "TRUNCATE TABLE `users`;"
        );
    }
}
