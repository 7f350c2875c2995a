use std::collections::VecDeque;

use super::{ColumnAssembler, ColumnChunkSource, RowGroupPages};
use crate::error::Result;
use crate::materializer::RecordMaterializer;
use crate::schema::Schema;

/// Row groups that were decoded ahead of time
#[derive(Debug, Clone)]
pub struct MemorySource {
    schema: Schema,
    row_counts: Vec<u64>,
    row_groups: VecDeque<RowGroupPages>,
    identity: String,
}

impl MemorySource {
    pub fn new(schema: Schema, row_groups: Vec<RowGroupPages>) -> Self {
        Self {
            schema,
            row_counts: row_groups.iter().map(|rg| rg.row_count).collect(),
            row_groups: row_groups.into(),
            identity: "<memory>".to_string(),
        }
    }

    /// Override the row counts reported as file metadata
    pub fn with_row_counts(mut self, row_counts: Vec<u64>) -> Self {
        self.row_counts = row_counts;
        self
    }

    pub fn with_identity<S: Into<String>>(mut self, identity: S) -> Self {
        self.identity = identity.into();
        self
    }
}

impl ColumnChunkSource for MemorySource {
    type Pages = RowGroupPages;
    type Puller = ColumnAssembler;

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn row_group_row_counts(&self) -> Vec<u64> {
        self.row_counts.clone()
    }

    fn identity(&self) -> String {
        self.identity.clone()
    }

    fn read_next_row_group(&mut self) -> Result<Option<RowGroupPages>> {
        Ok(self.row_groups.pop_front())
    }

    fn record_puller(
        &self,
        pages: RowGroupPages,
        requested_schema: &Schema,
        materializer: &mut RecordMaterializer,
    ) -> Result<ColumnAssembler> {
        ColumnAssembler::new(pages, requested_schema, materializer)
    }
}
