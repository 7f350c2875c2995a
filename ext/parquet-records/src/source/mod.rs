//! Boundary between column-chunk decoding and record assembly.
//!
//! A [`ColumnChunkSource`] yields one row group of decoded columns at a time
//! and builds a [`RecordPuller`] over it. The pullers in this crate are
//! [`ColumnAssembler`]s, which replay definition and repetition levels as
//! converter events.

pub mod assembler;
pub mod memory;
pub mod file;

pub use self::assembler::ColumnAssembler;
pub use self::memory::MemorySource;
pub use self::file::ParquetFileSource;

use bytes::Bytes;

use crate::error::{RecordError, Result};
use crate::materializer::RecordMaterializer;
use crate::schema::Schema;
use crate::value::Value;

/// A decoded physical value. INT96 and fixed-length values arrive as `Bytes`.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Bytes(Bytes),
}

/// Values of one column chunk; only entries at the maximum definition level carry one
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Plain(Vec<Primitive>),
    Dictionary {
        dictionary: Vec<Primitive>,
        ids: Vec<u32>,
    },
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Plain(values) => values.len(),
            ColumnValues::Dictionary { ids, .. } => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One leaf column of a row group.
///
/// Empty definition levels mean every entry is at the column's maximum;
/// empty repetition levels mean every entry starts a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunk {
    pub def_levels: Vec<i16>,
    pub rep_levels: Vec<i16>,
    pub values: ColumnValues,
}

impl ColumnChunk {
    pub fn plain(values: Vec<Primitive>) -> Self {
        Self {
            def_levels: Vec::new(),
            rep_levels: Vec::new(),
            values: ColumnValues::Plain(values),
        }
    }

    pub fn dictionary(dictionary: Vec<Primitive>, ids: Vec<u32>) -> Self {
        Self {
            def_levels: Vec::new(),
            rep_levels: Vec::new(),
            values: ColumnValues::Dictionary { dictionary, ids },
        }
    }

    pub fn with_def_levels(mut self, levels: Vec<i16>) -> Self {
        self.def_levels = levels;
        self
    }

    pub fn with_rep_levels(mut self, levels: Vec<i16>) -> Self {
        self.rep_levels = levels;
        self
    }
}

/// A loaded row group that knows how many records it holds
pub trait RowGroup {
    fn row_count(&self) -> u64;
}

/// All leaf columns of one row group, in depth-first leaf order
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroupPages {
    pub row_count: u64,
    pub columns: Vec<ColumnChunk>,
}

impl RowGroup for RowGroupPages {
    fn row_count(&self) -> u64 {
        self.row_count
    }
}

/// Outcome of pulling one record
#[derive(Debug, Clone, PartialEq)]
pub enum Pulled {
    Record(Value),
    /// The record's entries were consumed but a value could not be converted
    Corrupt(RecordError),
    EndOfRowGroup,
}

/// Pulls records out of one loaded row group
pub trait RecordPuller {
    fn pull(&mut self, materializer: &mut RecordMaterializer) -> Result<Pulled>;

    /// Whether a filter rejected the record just pulled
    fn should_skip_current_record(&self) -> bool {
        false
    }

    /// Called once the reader has taken every row it expects from this row group
    fn finish_row_group(&self) -> Result<()> {
        Ok(())
    }
}

/// Supplies file metadata and decoded row groups
pub trait ColumnChunkSource {
    type Pages: RowGroup;
    type Puller: RecordPuller;

    fn schema(&self) -> &Schema;

    fn row_group_row_counts(&self) -> Vec<u64>;

    /// Name used in error messages, usually the file path
    fn identity(&self) -> String;

    /// Decode the next row group, or `None` once every row group was read
    fn read_next_row_group(&mut self) -> Result<Option<Self::Pages>>;

    fn record_puller(
        &self,
        pages: Self::Pages,
        requested_schema: &Schema,
        materializer: &mut RecordMaterializer,
    ) -> Result<Self::Puller>;
}
