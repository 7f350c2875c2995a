//! Schema-driven record assembly for Parquet files
//!
//! `parquet-records` reads records stored under a nested Parquet schema and
//! rebuilds each one as a schema-less [`Value`] tree: maps keyed by field
//! name, arrays, scalars and nil. Page decoding is left to the `parquet`
//! crate; this crate owns what happens between decoded levels and values.
//!
//! # Key Components
//!
//! - **Converters**: one per schema node, compiled once per file
//!   - [`converter::ConverterFactory`] walks the schema and builds the tree
//!   - Leaf converters cover decimals, INT96 timestamps, narrowed integers and strings
//!   - Lists and maps accept the legacy 2-level layouts as well as the standard ones
//!
//! - **Assembly**: [`source::ColumnAssembler`] replays definition and
//!   repetition levels as `start`/`end`/`add` events, one record at a time
//!
//! - **Sources**: [`source::ParquetFileSource`] reads real files,
//!   [`source::MemorySource`] serves pre-decoded row groups
//!
//! - **Reader**: [`RowReader`] loads row groups on demand, skips corrupt
//!   records up to a configured budget, and iterates over records
//!
//! # Example Usage
//!
//! ```no_run
//! use parquet_records::{ReaderOptions, RowReader};
//!
//! let reader = RowReader::open("data.parquet", ReaderOptions::default())?;
//! for record in reader {
//!     let record = record?;
//!     println!("{:?}", record.get("id"));
//! }
//! # Ok::<(), parquet_records::ParquetError>(())
//! ```

pub mod converter;
pub mod error;
pub mod materializer;
pub mod options;
pub mod reader;
pub mod schema;
pub mod source;
pub mod value;

#[cfg(test)]
pub mod test_utils;

pub use error::{ParquetError, RecordError, Result, SchemaError};
pub use materializer::RecordMaterializer;
pub use options::{ConversionOptions, ReaderOptions, ReaderOptionsBuilder};
pub use reader::{ReaderState, RowReader, UnmaterializableRecordCounter};
pub use schema::{OriginalType, PhysicalType, Repetition, Schema, SchemaBuilder, SchemaNode};
pub use value::Value;
