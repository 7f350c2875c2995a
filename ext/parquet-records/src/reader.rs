//! Row-at-a-time record driver

use log::{debug, info, warn};
use std::fs::File;
use std::path::Path;

use crate::converter::ConverterFactory;
use crate::error::{ParquetError, Result};
use crate::materializer::RecordMaterializer;
use crate::options::ReaderOptions;
use crate::schema::Schema;
use crate::source::{ColumnChunkSource, ParquetFileSource, Pulled, RecordPuller, RowGroup};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Initialized,
    RowGroupLoaded,
    Exhausted,
}

/// Tracks records that could not be materialized against a tolerated fraction
#[derive(Debug, Clone)]
pub struct UnmaterializableRecordCounter {
    threshold: f64,
    total: u64,
    errors: u64,
}

impl UnmaterializableRecordCounter {
    pub fn new(threshold: f64, total: u64) -> Self {
        Self {
            threshold,
            total,
            errors: 0,
        }
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Count one bad record, failing once the error rate crosses the threshold
    pub fn increment(&mut self) -> Result<()> {
        self.errors += 1;
        warn!(
            "Error while reading an input record ({} out of {})",
            self.errors, self.total
        );

        let error_rate = self.errors as f64 / self.total.max(1) as f64;
        if error_rate > self.threshold {
            return Err(ParquetError::BadRecordThreshold {
                errors: self.errors,
                total: self.total,
                threshold: self.threshold,
            });
        }
        Ok(())
    }
}

/// Reads records one at a time from a [`ColumnChunkSource`].
///
/// A new row group is loaded exactly when every row of the previous one has
/// been handed out. Any fatal error leaves the reader exhausted.
pub struct RowReader<S: ColumnChunkSource> {
    source: S,
    materializer: RecordMaterializer,
    puller: Option<S::Puller>,
    counter: UnmaterializableRecordCounter,
    identity: String,
    total: u64,
    current: u64,
    loaded_so_far: u64,
    row_group: i64,
    state: ReaderState,
}

impl RowReader<ParquetFileSource<File>> {
    /// Open a Parquet file and prepare to read its records
    pub fn open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Self> {
        Self::new(ParquetFileSource::open(path)?, options)
    }
}

impl<S: ColumnChunkSource> RowReader<S> {
    /// Read metadata and compile the converter tree; no row group is loaded yet
    pub fn new(source: S, options: ReaderOptions) -> Result<Self> {
        options.validate()?;

        let materializer = ConverterFactory::new(options.conversion).compile(source.schema())?;
        let total: u64 = source.row_group_row_counts().iter().sum();
        let identity = source.identity();
        info!(
            "RecordReader initialized will read a total of {} records from {}",
            total, identity
        );

        Ok(Self {
            source,
            materializer,
            puller: None,
            counter: UnmaterializableRecordCounter::new(options.bad_record_threshold, total),
            identity,
            total,
            current: 0,
            loaded_so_far: 0,
            row_group: -1,
            state: ReaderState::Initialized,
        })
    }

    pub fn schema(&self) -> &Schema {
        self.source.schema()
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn total_rows(&self) -> u64 {
        self.total
    }

    /// Rows consumed so far, including skipped ones
    pub fn current_row(&self) -> u64 {
        self.current
    }

    pub fn error_count(&self) -> u64 {
        self.counter.errors()
    }

    /// Next record, or `None` once every row was read
    pub fn read(&mut self) -> Result<Option<Value>> {
        if self.state == ReaderState::Exhausted {
            return Ok(None);
        }

        match self.read_next() {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => {
                self.finish();
                Ok(None)
            }
            Err(e) => {
                self.finish();
                Err(e.at_position(self.current, self.row_group, self.identity.clone()))
            }
        }
    }

    fn finish(&mut self) {
        self.state = ReaderState::Exhausted;
        self.puller = None;
    }

    /// Drop the current row group once its entries are all accounted for
    fn release_row_group(&mut self) -> Result<()> {
        match self.puller.take() {
            Some(puller) => puller.finish_row_group(),
            None => Ok(()),
        }
    }

    fn read_next(&mut self) -> Result<Option<Value>> {
        loop {
            if self.current >= self.total {
                self.release_row_group()?;
                return Ok(None);
            }
            self.check_read()?;
            self.current += 1;

            let puller = self
                .puller
                .as_mut()
                .ok_or_else(|| ParquetError::internal("no row group loaded"))?;
            let pulled = puller.pull(&mut self.materializer)?;

            if let Pulled::Corrupt(error) = &pulled {
                debug!("skipping a corrupt record: {}", error);
                self.counter.increment()?;
                continue;
            }
            if puller.should_skip_current_record() {
                debug!("skipping record");
                continue;
            }

            match pulled {
                Pulled::Record(record) => return Ok(Some(record)),
                _ => {
                    debug!(
                        "row group {} ended before its declared row count",
                        self.row_group
                    );
                    self.current = self.loaded_so_far;
                }
            }
        }
    }

    fn check_read(&mut self) -> Result<()> {
        if self.current != self.loaded_so_far {
            return Ok(());
        }

        self.release_row_group()?;
        debug!("at row {}. reading next block", self.current);
        let pages = self.source.read_next_row_group()?.ok_or_else(|| {
            ParquetError::decoder_inconsistency(format!(
                "expecting more rows but reached last block. Read {} out of {}",
                self.current, self.total
            ))
        })?;

        let rows = pages.row_count();
        self.puller = Some(self.source.record_puller(
            pages,
            self.source.schema(),
            &mut self.materializer,
        )?);
        self.loaded_so_far += rows;
        self.row_group += 1;
        self.state = ReaderState::RowGroupLoaded;
        debug!("block read in memory. row count = {}", rows);
        Ok(())
    }
}

impl<S: ColumnChunkSource> Iterator for RowReader<S> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}
