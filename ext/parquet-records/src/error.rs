use thiserror::Error;

/// Errors raised while compiling a converter tree from a schema.
///
/// These are never retried: a file whose schema produces one of these cannot
/// be read by this engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Parquet type not supported: {0}")]
    Unsupported(String),

    #[error("Parquet type not yet supported: {0}")]
    NotYetSupported(String),

    #[error("Illegal Parquet type: {0}")]
    Illegal(String),

    #[error("Unrecognized Parquet type: {0}")]
    Unrecognized(String),

    #[error("Invalid list type {0}")]
    InvalidList(String),

    #[error("Invalid map type: {0}")]
    InvalidMap(String),

    #[error("Map key type is expected to be a primitive type, but found: {0}")]
    MapKeyNotPrimitive(String),

    #[error("Invalid decimal precision: {name} cannot store {precision} digits (max {max})")]
    InvalidDecimalPrecision {
        name: String,
        precision: u32,
        max: u32,
    },

    #[error("INT96 is not supported unless it's interpreted as timestamp. Please try to set assume_int96_is_timestamp to true.")]
    Int96NotTimestamp,

    #[error("Group {0} has no leaf columns")]
    EmptyGroup(String),
}

/// Errors raised while converting a single value of a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record cannot be materialized but the file can still be read.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Timestamps (with nanoseconds) are expected to be stored in 12-byte long binaries, but got a {0}-byte binary.")]
    Int96Length(usize),

    #[error("INT96 timestamp at Julian day {julian_day} plus {nanos_of_day}ns does not fit in microseconds since the epoch")]
    Int96Overflow { julian_day: i32, nanos_of_day: i64 },

    #[error("Decimal value {unscaled} does not fit in precision {precision}")]
    DecimalOverflow { unscaled: String, precision: u32 },

    #[error("Malformed decimal: {0}-byte binary cannot hold an unscaled value")]
    MalformedDecimal(usize),

    #[error("Converter for {converter} cannot accept {event}")]
    UnexpectedEvent {
        converter: &'static str,
        event: &'static str,
    },

    #[error("Dictionary id {id} is out of range (dictionary size {size})")]
    DictionaryId { id: u32, size: usize },

    #[error("Value from dictionary requested before a dictionary was set")]
    MissingDictionary,
}

impl RecordError {
    /// Create a new corrupt-record error
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        RecordError::Corrupt(msg.into())
    }

    /// Whether the reader may skip the record and carry on with the file.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RecordError::Corrupt(_))
    }
}

/// Core error type for reading Parquet records
#[derive(Error, Debug)]
pub enum ParquetError {
    /// IO errors from file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parquet format errors
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Fatal value conversion errors
    #[error("Conversion error: {0}")]
    Record(#[from] RecordError),

    /// The decoder and the file metadata disagree about the data
    #[error("{0}")]
    DecoderInconsistency(String),

    /// Too many records failed to materialize
    #[error("Decoding error rate of at least {errors}/{total} crosses configured threshold of {threshold}")]
    BadRecordThreshold {
        errors: u64,
        total: u64,
        threshold: f64,
    },

    /// Any fatal error raised while reading, with the position it happened at
    #[error("Can not read value at {row} in block {row_group} in file {file}: {source}")]
    Decoding {
        row: u64,
        row_group: i64,
        file: String,
        #[source]
        source: Box<ParquetError>,
    },

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal errors that shouldn't happen
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Parquet operations
pub type Result<T> = std::result::Result<T, ParquetError>;

impl ParquetError {
    /// Create a new decoder inconsistency error
    pub fn decoder_inconsistency<S: Into<String>>(msg: S) -> Self {
        ParquetError::DecoderInconsistency(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ParquetError::InvalidArgument(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        ParquetError::Internal(msg.into())
    }

    /// Wrap with the row, row group and file the error happened at
    pub fn at_position<S: Into<String>>(self, row: u64, row_group: i64, file: S) -> Self {
        ParquetError::Decoding {
            row,
            row_group,
            file: file.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_messages() {
        let err = SchemaError::Unsupported("INT32 (UINT_8)".to_string());
        assert_eq!(err.to_string(), "Parquet type not supported: INT32 (UINT_8)");

        let err = SchemaError::InvalidDecimalPrecision {
            name: "price".to_string(),
            precision: 12,
            max: 9,
        };
        assert_eq!(
            err.to_string(),
            "Invalid decimal precision: price cannot store 12 digits (max 9)"
        );
    }

    #[test]
    fn test_record_error_recoverability() {
        assert!(RecordError::corrupt("bad utf8").is_recoverable());
        assert!(!RecordError::Int96Length(8).is_recoverable());
        assert!(!RecordError::MalformedDecimal(0).is_recoverable());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ParquetError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_at_position() {
        let err = ParquetError::decoder_inconsistency("expecting more rows")
            .at_position(3, 1, "data.parquet");
        assert_eq!(
            err.to_string(),
            "Can not read value at 3 in block 1 in file data.parquet: expecting more rows"
        );
        assert!(matches!(err, ParquetError::Decoding { row: 3, .. }));
    }
}
