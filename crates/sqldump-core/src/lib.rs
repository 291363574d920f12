//! sqldump Core - Core abstractions shared by the dump engine and drivers
//!
//! This crate provides the fundamental traits and types that all other
//! sqldump crates depend on. It defines:
//!
//! - `Connection` - The blocking database handle the engine drives
//! - `Value`, `Row`, `QueryResult` - Scalar values and result sets
//! - `SqlDumpError` - The error kinds surfaced to callers
//! - `dialect` - MySQL literal and identifier escaping primitives

mod connection;
pub mod dialect;
mod error;
mod types;

pub use connection::*;
pub use error::*;
pub use types::*;
