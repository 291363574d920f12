//! Dump document assembly
//!
//! The document is always laid out as:
//!
//! ```text
//! header comment block
//! session pragmas (charset, time zone, FK checks, SQL mode, notes)
//! [DROP DATABASE] [CREATE DATABASE]
//! per table: [DROP TABLE] [CREATE TABLE] [TRUNCATE TABLE] [INSERT ...]
//! pragmas restoring the saved session variables
//! ```
//!
//! The pragmas come first so a replay never trips over foreign keys or strict
//! SQL modes regardless of the table order.

use chrono::{DateTime, Utc};
use sqldump_core::{Connection, Result, Row};

use crate::escaper::ValueEscaper;
use crate::exporter::DataExporter;
use crate::introspector::SchemaIntrospector;
use crate::options::DumpOptions;

const RULE: &str = "-- ----------------------------------------------------------------------------";

const POSTAMBLE: &str = "/*!40103 SET TIME_ZONE=IFNULL(@OLD_TIME_ZONE, 'system') */;\n\
/*!40101 SET SQL_MODE=IFNULL(@OLD_SQL_MODE, '') */;\n\
/*!40014 SET FOREIGN_KEY_CHECKS=IFNULL(@OLD_FOREIGN_KEY_CHECKS, 1) */;\n\
/*!40101 SET CHARACTER_SET_CLIENT=@OLD_CHARACTER_SET_CLIENT */;\n\
/*!40111 SET SQL_NOTES=IFNULL(@OLD_SQL_NOTES, 1) */;";

/// Progress callback for dump generation
pub type DumpProgressCallback = Box<dyn Fn(DumpProgress) + Send + Sync>;

/// Dump progress information
#[derive(Debug, Clone)]
pub struct DumpProgress {
    /// Current phase of the dump
    pub phase: DumpPhase,
    /// Object being dumped
    pub current_object: Option<String>,
    /// Number of objects selected for the dump
    pub total_objects: usize,
    /// Number of objects completed
    pub objects_completed: usize,
    /// Rows written for the current object, or in total once complete
    pub rows_written: u64,
    /// Log message
    pub message: Option<String>,
}

/// Phases of dump generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpPhase {
    Starting,
    ListingObjects,
    DumpingObject,
    Complete,
}

/// One catalog object, held only while it is being rendered
#[derive(Debug, Clone)]
pub struct ObjectDescriptor {
    pub name: String,
    /// Create statement, when table creation is enabled and one exists
    pub create_statement: Option<String>,
    /// Rows, fetched only when data insertion is enabled
    pub rows: Vec<Row>,
}

/// Orchestrates introspection and export into a single script
pub struct DumpAssembler<'o> {
    options: &'o DumpOptions,
    introspector: SchemaIntrospector,
    exporter: DataExporter,
    progress_callback: Option<DumpProgressCallback>,
}

impl<'o> DumpAssembler<'o> {
    pub fn new(options: &'o DumpOptions) -> Self {
        Self {
            options,
            introspector: SchemaIntrospector::new(options),
            exporter: DataExporter::new(options),
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn with_progress_callback(mut self, callback: DumpProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn report_progress(&self, progress: DumpProgress) {
        if let Some(ref callback) = self.progress_callback {
            callback(progress);
        }
    }

    /// Generate the dump, stamping the header with the current time
    pub fn generate<C: Connection + ?Sized>(&self, connection: &mut C) -> Result<String> {
        self.generate_at(connection, Utc::now())
    }

    /// Generate the dump with a fixed header timestamp.
    ///
    /// No snapshot is taken: each table is read by its own query, so a table
    /// dumped later may reflect writes made after an earlier one was read.
    #[tracing::instrument(skip_all, fields(database = %connection.database_name()))]
    pub fn generate_at<C: Connection + ?Sized>(
        &self,
        connection: &mut C,
        generated_at: DateTime<Utc>,
    ) -> Result<String> {
        self.report_progress(DumpProgress {
            phase: DumpPhase::Starting,
            current_object: None,
            total_objects: 0,
            objects_completed: 0,
            rows_written: 0,
            message: Some("Dump started".into()),
        });

        let mut document = String::new();
        document.push_str(&header(connection, generated_at));
        document.push_str(&preamble(connection.character_set_name()));

        let database = connection.database_name().to_string();
        if self.options.drop_database {
            push_section(
                &mut document,
                &format!("Deleting database {}", database),
                &self.introspector.drop_database_statement(&database),
            );
        }
        if self.options.create_database {
            push_section(
                &mut document,
                &format!("Creating database {}", database),
                &self.introspector.create_database_statement(&database),
            );
        }

        self.report_progress(DumpProgress {
            phase: DumpPhase::ListingObjects,
            current_object: None,
            total_objects: 0,
            objects_completed: 0,
            rows_written: 0,
            message: Some("Listing tables...".into()),
        });

        let catalog = self.introspector.list_objects(connection)?;
        let catalog_len = catalog.len();
        let selected = self.options.select_tables(catalog);
        tracing::info!(
            catalog = catalog_len,
            selected = selected.len(),
            "selected tables for dump"
        );

        let total_objects = selected.len();
        let mut total_rows = 0u64;
        for (idx, name) in selected.into_iter().enumerate() {
            let object = self.describe(connection, name)?;
            let row_count = object.rows.len() as u64;
            self.render_object(&mut document, &*connection, &object);
            total_rows += row_count;

            self.report_progress(DumpProgress {
                phase: DumpPhase::DumpingObject,
                current_object: Some(object.name.clone()),
                total_objects,
                objects_completed: idx + 1,
                rows_written: row_count,
                message: Some(format!("Dumped {} rows from [{}]", row_count, object.name)),
            });
        }

        document.push_str(POSTAMBLE);

        self.report_progress(DumpProgress {
            phase: DumpPhase::Complete,
            current_object: None,
            total_objects,
            objects_completed: total_objects,
            rows_written: total_rows,
            message: Some("Dump completed successfully".into()),
        });
        tracing::info!(
            tables = total_objects,
            rows = total_rows,
            bytes = document.len(),
            "dump generated"
        );

        Ok(document)
    }

    fn describe<C: Connection + ?Sized>(
        &self,
        connection: &mut C,
        name: String,
    ) -> Result<ObjectDescriptor> {
        let create_statement = if self.options.create_tables {
            self.introspector.create_statement(connection, &name)?
        } else {
            None
        };

        let rows = if self.options.insert_data {
            self.exporter.export_rows(connection, &name)?
        } else {
            Vec::new()
        };

        Ok(ObjectDescriptor {
            name,
            create_statement,
            rows,
        })
    }

    fn render_object<C: Connection + ?Sized>(
        &self,
        document: &mut String,
        connection: &C,
        object: &ObjectDescriptor,
    ) {
        let name = &object.name;
        tracing::debug!(table = %name, rows = object.rows.len(), "rendering table");

        if self.options.drop_tables {
            push_section(
                document,
                &format!("Deleting table {}", name),
                &self.introspector.drop_table_statement(name),
            );
        }

        if let Some(create) = &object.create_statement {
            push_section(document, &format!("Creating table {}", name), create);
        }

        let escaper = ValueEscaper::new(connection);
        // An empty table gets neither the insert block nor the truncate.
        if let Some(insert) = self.exporter.render_insert_block(&escaper, name, &object.rows) {
            if self.options.delete_data_first {
                push_section(
                    document,
                    &format!("Deleting data from {}", name),
                    &self.exporter.truncate_statement(name),
                );
            }
            push_section(document, &format!("Inserting data into {}", name), &insert);
        }
    }
}

/// Generate a dump of the connection's database.
///
/// Tables are dumped in the order the server lists them; no dependency
/// ordering is attempted, the preamble disables foreign key checks instead.
pub fn generate_dump<C: Connection + ?Sized>(
    connection: &mut C,
    options: &DumpOptions,
) -> Result<String> {
    DumpAssembler::new(options).generate(connection)
}

fn push_section(document: &mut String, comment: &str, statement: &str) {
    document.push_str("-- ");
    document.push_str(comment);
    document.push('\n');
    document.push_str(statement);
    document.push_str("\n\n");
}

fn header<C: Connection + ?Sized>(connection: &C, generated_at: DateTime<Utc>) -> String {
    format!(
        "{rule}\n\
         -- Host:              {host}\n\
         -- Server version:    {version}\n\
         -- Generated in:      {at}\n\
         -- Dump generated by: sqldump {tool}\n\
         {rule}\n\n",
        rule = RULE,
        host = connection.host(),
        version = connection.server_version(),
        at = generated_at.format("%m/%d/%Y %H:%M:%S %:z UTC"),
        tool = env!("CARGO_PKG_VERSION"),
    )
}

fn preamble(charset: &str) -> String {
    format!(
        "/*!40101 SET @OLD_CHARACTER_SET_CLIENT=@@CHARACTER_SET_CLIENT */;\n\
         /*!40101 SET NAMES {charset} */;\n\
         /*!40103 SET @OLD_TIME_ZONE=@@TIME_ZONE */;\n\
         /*!40103 SET TIME_ZONE='+00:00' */;\n\
         /*!40014 SET @OLD_FOREIGN_KEY_CHECKS=@@FOREIGN_KEY_CHECKS, FOREIGN_KEY_CHECKS=0 */;\n\
         /*!40101 SET @OLD_SQL_MODE=@@SQL_MODE, SQL_MODE='NO_AUTO_VALUE_ON_ZERO' */;\n\
         /*!40111 SET @OLD_SQL_NOTES=@@SQL_NOTES, SQL_NOTES=0 */;\n\n",
        charset = charset,
    )
}
