use bytes::Bytes;
use log::debug;
use parquet::basic::{ConvertedType, Repetition as ParquetRepetition, Type as ParquetPhysicalType};
use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::data_type::DataType;
use parquet::file::reader::{ChunkReader, FileReader, RowGroupReader, SerializedFileReader};
use parquet::schema::types::{ColumnDescriptor, Type};
use std::fs::File;
use std::path::Path;

use super::{
    ColumnAssembler, ColumnChunk, ColumnChunkSource, ColumnValues, Primitive, RowGroupPages,
};
use crate::error::{ParquetError, Result};
use crate::materializer::RecordMaterializer;
use crate::schema::{OriginalType, PhysicalType, Repetition, Schema, SchemaNode};

/// Maximum records requested from a column reader per call
const BATCH_SIZE: usize = 1024;

/// Reads row groups of a Parquet file with the `parquet` crate's column readers
///
/// The column readers expand dictionary pages, so every chunk arrives as
/// [`ColumnValues::Plain`] and leaf converters never run in dictionary mode.
/// Use [`super::MemorySource`] to feed dictionary-encoded chunks.
pub struct ParquetFileSource<R: ChunkReader> {
    reader: SerializedFileReader<R>,
    schema: Schema,
    identity: String,
    next_row_group: usize,
}

impl ParquetFileSource<File> {
    /// Open a Parquet file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::new(file)?.with_identity(path.display().to_string()))
    }
}

impl<R: ChunkReader + 'static> ParquetFileSource<R> {
    /// Read the footer of any chunk reader, e.g. `bytes::Bytes`
    pub fn new(reader: R) -> Result<Self> {
        let reader = SerializedFileReader::new(reader)?;
        let file_metadata = reader.metadata().file_metadata();
        let schema = Schema {
            root: convert_type(file_metadata.schema())?,
        };

        let num_columns = file_metadata.schema_descr().num_columns();
        if schema.leaf_count() != num_columns {
            return Err(ParquetError::decoder_inconsistency(format!(
                "schema has {} leaves but the file has {} columns",
                schema.leaf_count(),
                num_columns
            )));
        }

        Ok(Self {
            reader,
            schema,
            identity: "<stream>".to_string(),
            next_row_group: 0,
        })
    }

    pub fn with_identity<S: Into<String>>(mut self, identity: S) -> Self {
        self.identity = identity.into();
        self
    }

    fn read_row_group(&self, index: usize) -> Result<RowGroupPages> {
        let row_group = self.reader.get_row_group(index)?;
        let metadata = row_group.metadata();

        let mut columns = Vec::with_capacity(metadata.num_columns());
        for i in 0..metadata.num_columns() {
            let descr = metadata.column(i).column_descr();
            let chunk = match row_group.get_column_reader(i)? {
                ColumnReader::BoolColumnReader(r) => read_column(r, descr, |v| Primitive::Boolean(*v)),
                ColumnReader::Int32ColumnReader(r) => read_column(r, descr, |v| Primitive::Int32(*v)),
                ColumnReader::Int64ColumnReader(r) => read_column(r, descr, |v| Primitive::Int64(*v)),
                ColumnReader::Int96ColumnReader(r) => read_column(r, descr, |v| {
                    // nanos of day as two little-endian words, then the Julian day
                    let bytes: Vec<u8> = v.data().iter().flat_map(|w| w.to_le_bytes()).collect();
                    Primitive::Bytes(Bytes::from(bytes))
                }),
                ColumnReader::FloatColumnReader(r) => read_column(r, descr, |v| Primitive::Float(*v)),
                ColumnReader::DoubleColumnReader(r) => read_column(r, descr, |v| Primitive::Double(*v)),
                ColumnReader::ByteArrayColumnReader(r) => read_column(r, descr, |v| {
                    Primitive::Bytes(Bytes::copy_from_slice(v.data()))
                }),
                ColumnReader::FixedLenByteArrayColumnReader(r) => read_column(r, descr, |v| {
                    Primitive::Bytes(Bytes::copy_from_slice(v.data()))
                }),
            }?;
            columns.push(chunk);
        }

        Ok(RowGroupPages {
            row_count: metadata.num_rows().max(0) as u64,
            columns,
        })
    }
}

fn read_column<T: DataType>(
    mut reader: ColumnReaderImpl<T>,
    descr: &ColumnDescriptor,
    convert: impl Fn(&T::T) -> Primitive,
) -> Result<ColumnChunk> {
    let max_def = descr.max_def_level();
    let max_rep = descr.max_rep_level();

    let mut chunk = ColumnChunk::plain(Vec::new());
    let mut values = Vec::new();
    let mut defs: Option<Vec<i16>> = (max_def > 0).then(|| Vec::with_capacity(BATCH_SIZE));
    let mut reps: Option<Vec<i16>> = (max_rep > 0).then(|| Vec::with_capacity(BATCH_SIZE));
    let mut batch: Vec<T::T> = Vec::with_capacity(BATCH_SIZE);

    loop {
        batch.clear();
        if let Some(defs) = defs.as_mut() {
            defs.clear();
        }
        if let Some(reps) = reps.as_mut() {
            reps.clear();
        }

        let (records_read, values_read, levels_read) =
            reader.read_records(BATCH_SIZE, defs.as_mut(), reps.as_mut(), &mut batch)?;
        if records_read == 0 && values_read == 0 && levels_read == 0 {
            break;
        }

        values.extend(batch[..values_read].iter().map(&convert));
        if let Some(defs) = defs.as_ref() {
            chunk.def_levels.extend_from_slice(&defs[..levels_read]);
        }
        if let Some(reps) = reps.as_ref() {
            chunk.rep_levels.extend_from_slice(&reps[..levels_read]);
        }
    }

    chunk.values = ColumnValues::Plain(values);
    Ok(chunk)
}

fn convert_type(ty: &Type) -> Result<SchemaNode> {
    let info = ty.get_basic_info();
    let name = info.name().to_string();
    let repetition = if info.has_repetition() {
        match info.repetition() {
            ParquetRepetition::REQUIRED => Repetition::Required,
            ParquetRepetition::OPTIONAL => Repetition::Optional,
            ParquetRepetition::REPEATED => Repetition::Repeated,
        }
    } else {
        Repetition::Required
    };

    let node = match ty {
        Type::PrimitiveType {
            physical_type,
            type_length,
            ..
        } => SchemaNode::primitive(name, repetition, convert_physical_type(*physical_type, *type_length)),
        Type::GroupType { fields, .. } => SchemaNode::group(
            name,
            repetition,
            fields
                .iter()
                .map(|field| convert_type(field))
                .collect::<Result<Vec<_>>>()?,
        ),
    };

    Ok(match convert_original_type(ty) {
        Some(original_type) => node.with_original_type(original_type),
        None => node,
    })
}

#[allow(unreachable_patterns)]
fn convert_physical_type(physical_type: ParquetPhysicalType, type_length: i32) -> PhysicalType {
    match physical_type {
        ParquetPhysicalType::BOOLEAN => PhysicalType::Boolean,
        ParquetPhysicalType::INT32 => PhysicalType::Int32,
        ParquetPhysicalType::INT64 => PhysicalType::Int64,
        ParquetPhysicalType::INT96 => PhysicalType::Int96,
        ParquetPhysicalType::FLOAT => PhysicalType::Float,
        ParquetPhysicalType::DOUBLE => PhysicalType::Double,
        ParquetPhysicalType::FIXED_LEN_BYTE_ARRAY => PhysicalType::FixedLenByteArray(type_length),
        _ => PhysicalType::ByteArray,
    }
}

#[allow(unreachable_patterns)]
fn convert_original_type(ty: &Type) -> Option<OriginalType> {
    let original_type = match ty.get_basic_info().converted_type() {
        ConvertedType::NONE => return None,
        ConvertedType::UTF8 => OriginalType::Utf8,
        ConvertedType::MAP => OriginalType::Map,
        ConvertedType::MAP_KEY_VALUE => OriginalType::MapKeyValue,
        ConvertedType::LIST => OriginalType::List,
        ConvertedType::ENUM => OriginalType::Enum,
        ConvertedType::DECIMAL => {
            let (precision, scale) = match ty {
                Type::PrimitiveType {
                    precision, scale, ..
                } => (*precision, *scale),
                Type::GroupType { .. } => (0, 0),
            };
            OriginalType::Decimal {
                precision: precision.max(0) as u32,
                scale: scale.max(0) as u32,
            }
        }
        ConvertedType::DATE => OriginalType::Date,
        ConvertedType::TIME_MILLIS => OriginalType::TimeMillis,
        ConvertedType::TIME_MICROS => OriginalType::TimeMicros,
        ConvertedType::TIMESTAMP_MILLIS => OriginalType::TimestampMillis,
        ConvertedType::TIMESTAMP_MICROS => OriginalType::TimestampMicros,
        ConvertedType::UINT_8 => OriginalType::UInt8,
        ConvertedType::UINT_16 => OriginalType::UInt16,
        ConvertedType::UINT_32 => OriginalType::UInt32,
        ConvertedType::UINT_64 => OriginalType::UInt64,
        ConvertedType::INT_8 => OriginalType::Int8,
        ConvertedType::INT_16 => OriginalType::Int16,
        ConvertedType::INT_32 => OriginalType::Int32,
        ConvertedType::INT_64 => OriginalType::Int64,
        ConvertedType::JSON => OriginalType::Json,
        ConvertedType::BSON => OriginalType::Bson,
        ConvertedType::INTERVAL => OriginalType::Interval,
        _ => return None,
    };
    Some(original_type)
}

impl<R: ChunkReader + 'static> ColumnChunkSource for ParquetFileSource<R> {
    type Pages = RowGroupPages;
    type Puller = ColumnAssembler;

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn row_group_row_counts(&self) -> Vec<u64> {
        self.reader
            .metadata()
            .row_groups()
            .iter()
            .map(|rg| rg.num_rows().max(0) as u64)
            .collect()
    }

    fn identity(&self) -> String {
        self.identity.clone()
    }

    fn read_next_row_group(&mut self) -> Result<Option<RowGroupPages>> {
        if self.next_row_group >= self.reader.num_row_groups() {
            return Ok(None);
        }

        let pages = self.read_row_group(self.next_row_group)?;
        debug!(
            "Loaded row group {} of {} with {} rows",
            self.next_row_group, self.identity, pages.row_count
        );
        self.next_row_group += 1;
        Ok(Some(pages))
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

#[cfg(test)]
mod tests {
    use super::*;
    use parquet::schema::parser::parse_message_type;

    fn convert(message: &str) -> SchemaNode {
        convert_type(&parse_message_type(message).unwrap()).unwrap()
    }

    #[test]
    fn test_convert_schema() {
        let root = convert(
            "message spark_schema {
                required int64 id;
                optional binary name (UTF8);
                optional fixed_len_byte_array(16) amount (DECIMAL(20,4));
                optional group tags (LIST) {
                    repeated group list {
                        optional int32 element (INT_8);
                    }
                }
            }",
        );

        assert_eq!(root.name(), "spark_schema");
        let fields = root.fields();
        assert_eq!(fields[0].repetition(), Repetition::Required);
        assert_eq!(fields[1].original_type(), Some(OriginalType::Utf8));
        assert_eq!(
            fields[2],
            SchemaNode::primitive("amount", Repetition::Optional, PhysicalType::FixedLenByteArray(16))
                .with_original_type(OriginalType::Decimal {
                    precision: 20,
                    scale: 4
                })
        );
        assert_eq!(fields[3].original_type(), Some(OriginalType::List));
        let element = &fields[3].fields()[0].fields()[0];
        assert_eq!(element.original_type(), Some(OriginalType::Int8));
        assert!(fields[3].fields()[0].is_repeated());
    }
}
