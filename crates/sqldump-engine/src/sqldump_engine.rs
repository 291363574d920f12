//! sqldump engine
//!
//! Turns a live MySQL database into a replayable SQL script: table
//! definitions from the catalog, row data as batched inserts, wrapped in the
//! session pragmas `mysqldump`-compatible tooling expects.
//!
//! # Architecture
//!
//! ```text
//! DumpOptions ─► DumpAssembler ─► SchemaIntrospector  (SHOW TABLES / SHOW CREATE TABLE)
//!                     │        └► DataExporter        (SELECT * ─► INSERT ... VALUES)
//!                     │                 └► ValueEscaper
//!                     └► String ─► dump_to_writer / dump_to_file
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let mut conn = MySqlConnection::connect(&ConnectionConfig::default())?;
//! let options = DumpOptions::default().exclude(["sessions"]);
//! let sql = generate_dump(&mut conn, &options)?;
//! conn.close()?;
//! ```

mod assembler;
mod escaper;
mod exporter;
mod introspector;
mod options;
mod writer;

#[cfg(test)]
mod testing;

pub use assembler::{
    DumpAssembler, DumpPhase, DumpProgress, DumpProgressCallback, ObjectDescriptor, generate_dump,
};
pub use escaper::ValueEscaper;
pub use exporter::DataExporter;
pub use introspector::{SchemaIntrospector, replace_first};
pub use options::{DumpOptions, InsertMode};
pub use writer::{dump_to_file, dump_to_writer};

pub use sqldump_core::{Connection, Result, SqlDumpError};
