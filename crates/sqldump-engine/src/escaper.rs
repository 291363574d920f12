//! Scalar value to SQL literal conversion

use sqldump_core::{Connection, Value, dialect};

/// Renders values as literals using the connection's escaping rules.
///
/// Everything that is not NULL is treated as text: the value's text
/// serialization is escaped and single-quoted, so `1` becomes `'1'`. Numbers
/// and dates get no type-specific formatting.
pub struct ValueEscaper<'c, C: Connection + ?Sized> {
    connection: &'c C,
}

impl<'c, C: Connection + ?Sized> ValueEscaper<'c, C> {
    pub fn new(connection: &'c C) -> Self {
        Self { connection }
    }

    pub fn escape(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::String(text) => self.quote(text),
            // A text document cannot carry invalid UTF-8; hex replays to the same bytes.
            Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => self.quote(text),
                Err(_) => dialect::hex_literal(bytes),
            },
            other => self.quote(&other.to_string()),
        }
    }

    fn quote(&self, text: &str) -> String {
        format!("'{}'", self.connection.escape_literal(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConnection;
    use chrono::NaiveDate;

    #[test]
    fn test_null_is_unquoted_keyword() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        assert_eq!(escaper.escape(&Value::Null), "NULL");
    }

    #[test]
    fn test_numbers_are_quoted_text() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        assert_eq!(escaper.escape(&Value::Int64(1)), "'1'");
        assert_eq!(escaper.escape(&Value::UInt64(7)), "'7'");
        assert_eq!(escaper.escape(&Value::Float64(2.5)), "'2.5'");
        assert_eq!(escaper.escape(&Value::Decimal("9.90".into())), "'9.90'");
        assert_eq!(escaper.escape(&Value::Bool(true)), "'1'");
    }

    #[test]
    fn test_dates_use_server_format() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        let date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(escaper.escape(&Value::Date(date)), "'2023-12-01'");
        assert_eq!(
            escaper.escape(&Value::DateTime(date.and_hms_opt(8, 0, 0).unwrap())),
            "'2023-12-01 08:00:00'"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        assert_eq!(
            escaper.escape(&Value::String("it's a\nline".into())),
            "'it\\'s a\\nline'"
        );
        assert_eq!(escaper.escape(&Value::String(String::new())), "''");
    }

    #[test]
    fn test_backslashes_survive_replay() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        assert_eq!(
            escaper.escape(&Value::String("C:\\temp\\new".into())),
            "'C:\\\\temp\\\\new'"
        );
        assert_eq!(
            escaper.escape(&Value::String("tab\\there".into())),
            "'tab\\\\there'"
        );
    }

    #[test]
    fn test_bytes() {
        let conn = MockConnection::new("app");
        let escaper = ValueEscaper::new(&conn);
        assert_eq!(escaper.escape(&Value::Bytes(b"plain".to_vec())), "'plain'");
        assert_eq!(escaper.escape(&Value::Bytes(vec![0xff, 0x00])), "X'ff00'");
    }
}
