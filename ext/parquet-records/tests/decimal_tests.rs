use test_helpers::*;

use bytes::Bytes;
use parquet::data_type::ByteArray;
use parquet_records::source::{ColumnChunk, MemorySource, RowGroupPages};
use parquet_records::*;

fn decimal(name: &str, physical: PhysicalType, precision: u32, scale: u32) -> SchemaNode {
    SchemaNode::primitive(name, Repetition::Required, physical)
        .with_original_type(OriginalType::Decimal { precision, scale })
}

fn single_column_reader(node: SchemaNode, column: ColumnChunk, rows: u64) -> RowReader<MemorySource> {
    let source = MemorySource::new(
        message(vec![node]),
        vec![RowGroupPages {
            row_count: rows,
            columns: vec![column],
        }],
    );
    RowReader::new(source, ReaderOptions::default()).unwrap()
}

#[test]
fn test_int_backed_decimals() {
    let message = "message root {
        required int32 a (DECIMAL(9,2));
        required int64 b (DECIMAL(18,4));
    }";

    let records = roundtrip(
        message,
        vec![
            int32s(vec![12345, -1]),
            int64s(vec![123456789012345678, 0]),
        ],
    );

    assert_eq!(records[0].get("a"), Some(&Value::float(123.45)));
    assert_eq!(records[1].get("a"), Some(&Value::float(-0.01)));
    assert_eq!(
        records[0].get("b"),
        Some(&Value::float(12345678901234.5678))
    );
    assert_eq!(records[1].get("b"), Some(&Value::float(0.0)));
}

#[test]
fn test_byte_backed_decimals() {
    let message = "message root {
        required fixed_len_byte_array(16) wide (DECIMAL(38,10));
        required binary narrow (DECIMAL(10,2));
    }";

    let wide = 12345678901234567890123_i128.to_be_bytes().to_vec();
    let negative = (-5_i128).to_be_bytes().to_vec();
    let records = roundtrip(
        message,
        vec![
            TestColumn::new(ColumnData::Fixed(vec![
                ByteArray::from(wide).into(),
                ByteArray::from(negative).into(),
            ])),
            TestColumn::new(ColumnData::Bytes(vec![
                ByteArray::from(vec![0x04u8, 0xD2]),
                ByteArray::from(vec![0xFFu8]),
            ])),
        ],
    );

    assert_eq!(
        records[0].get("wide"),
        Some(&Value::float(1234567890123.4567890123))
    );
    assert_eq!(records[1].get("wide"), Some(&Value::float(-0.0000000005)));
    assert_eq!(records[0].get("narrow"), Some(&Value::float(12.34)));
    assert_eq!(records[1].get("narrow"), Some(&Value::float(-0.01)));
}

#[test]
fn test_precision_bound_is_checked_at_open() {
    let source = MemorySource::new(
        message(vec![decimal("price", PhysicalType::Int32, 10, 2)]),
        vec![],
    );
    let err = RowReader::new(source, ReaderOptions::default()).err().unwrap();
    assert_eq!(
        err.to_string(),
        "Schema error: Invalid decimal precision: price cannot store 10 digits (max 9)"
    );

    let source = MemorySource::new(
        message(vec![decimal("price", PhysicalType::Int64, 19, 2)]),
        vec![],
    );
    assert!(RowReader::new(source, ReaderOptions::default()).is_err());
}

#[test]
fn test_overflowing_unscaled_value_is_fatal() {
    let mut reader = single_column_reader(
        decimal("d", PhysicalType::Int32, 3, 0),
        ColumnChunk::plain(vec![source::Primitive::Int32(1000)]),
        1,
    );

    let err = reader.read().unwrap_err();
    match err {
        ParquetError::Decoding { row, source, .. } => {
            assert_eq!(row, 1);
            assert!(matches!(
                *source,
                ParquetError::Record(RecordError::DecimalOverflow { precision: 3, .. })
            ));
        }
        other => panic!("unexpected error {}", other),
    }
    assert_eq!(reader.state(), ReaderState::Exhausted);
    assert!(reader.read().unwrap().is_none());
}

#[test]
fn test_empty_decimal_binary_is_fatal() {
    let mut reader = single_column_reader(
        decimal("d", PhysicalType::ByteArray, 10, 0),
        ColumnChunk::plain(vec![source::Primitive::Bytes(Bytes::new())]),
        1,
    );

    let err = reader.read().unwrap_err();
    assert!(err.to_string().contains("0-byte binary cannot hold an unscaled value"));
}

#[test]
fn test_fixed_wider_than_precision_needs() {
    let message = "message root {
        required fixed_len_byte_array(16) amount (DECIMAL(10,2));
    }";

    let records = roundtrip(
        message,
        vec![TestColumn::new(ColumnData::Fixed(vec![
            ByteArray::from(100_i128.to_be_bytes().to_vec()).into(),
            ByteArray::from((-1_i128).to_be_bytes().to_vec()).into(),
            ByteArray::from(9_999_999_999_i128.to_be_bytes().to_vec()).into(),
        ]))],
    );

    assert_eq!(
        records,
        vec![
            record(vec![("amount", Value::float(1.0))]),
            record(vec![("amount", Value::float(-0.01))]),
            record(vec![("amount", Value::float(99_999_999.99))]),
        ]
    );
}

#[test]
fn test_wide_binary_beyond_precision_is_fatal() {
    let mut reader = single_column_reader(
        decimal("d", PhysicalType::ByteArray, 10, 0),
        ColumnChunk::plain(vec![source::Primitive::Bytes(Bytes::from_static(&[1; 9]))]),
        1,
    );

    let err = reader.read().unwrap_err();
    assert!(err.to_string().contains("does not fit in precision 10"));
}
