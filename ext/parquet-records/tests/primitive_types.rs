use test_helpers::*;

use parquet::data_type::ByteArray;
use parquet_records::*;

#[test]
fn test_passthrough_types() {
    let message = "message root {
        required boolean flag;
        required int32 small;
        required int64 big;
        required float ratio;
        required double score;
    }";

    let records = roundtrip(
        message,
        vec![
            TestColumn::new(ColumnData::Bool(vec![true, false])),
            int32s(vec![i32::MIN, 7]),
            int64s(vec![i64::MAX, -1]),
            TestColumn::new(ColumnData::Float(vec![1.5, -0.25])),
            TestColumn::new(ColumnData::Double(vec![2.75, 1e300])),
        ],
    );

    assert_eq!(
        records,
        vec![
            record(vec![
                ("flag", Value::Boolean(true)),
                ("small", Value::Integer(i32::MIN as i64)),
                ("big", Value::Integer(i64::MAX)),
                ("ratio", Value::float(1.5)),
                ("score", Value::float(2.75)),
            ]),
            record(vec![
                ("flag", Value::Boolean(false)),
                ("small", Value::Integer(7)),
                ("big", Value::Integer(-1)),
                ("ratio", Value::float(-0.25)),
                ("score", Value::float(1e300)),
            ]),
        ]
    );
}

#[test]
fn test_narrowed_integers() {
    let message = "message root {
        required int32 tiny (INT_8);
        required int32 short (INT_16);
        required int32 plain (INT_32);
        required int64 long (INT_64);
    }";

    let records = roundtrip(
        message,
        vec![
            int32s(vec![200, -3]),
            int32s(vec![40000, 12]),
            int32s(vec![1, 2]),
            int64s(vec![3, 4]),
        ],
    );

    assert_eq!(records[0].get("tiny"), Some(&Value::Integer(-56)));
    assert_eq!(records[0].get("short"), Some(&Value::Integer(-25536)));
    assert_eq!(records[1].get("tiny"), Some(&Value::Integer(-3)));
    assert_eq!(records[1].get("plain"), Some(&Value::Integer(2)));
    assert_eq!(records[1].get("long"), Some(&Value::Integer(4)));
}

#[test]
fn test_date_is_days_since_epoch() {
    let records = roundtrip(
        "message root { optional int32 day (DATE); }",
        vec![int32s(vec![0, 19000, -1]).defs(vec![1, 1, 1, 0])],
    );

    let days: Vec<_> = records.iter().map(|r| r.get("day").cloned()).collect();
    assert_eq!(
        days,
        vec![
            Some(Value::Integer(0)),
            Some(Value::Integer(19000)),
            Some(Value::Integer(-1)),
            Some(Value::Nil),
        ]
    );
}

#[test]
fn test_string_annotations() {
    let message = "message root {
        required binary name (UTF8);
        required binary kind (ENUM);
        required binary doc (JSON);
        required binary raw;
        required binary blob (BSON);
    }";

    let records = roundtrip(
        message,
        vec![
            strings(&["héllo"]),
            strings(&["RED"]),
            strings(&["{\"a\":1}"]),
            TestColumn::new(ColumnData::Bytes(vec![ByteArray::from(vec![0u8, 159, 146])])),
            TestColumn::new(ColumnData::Bytes(vec![ByteArray::from(vec![5u8, 0, 0, 0, 0])])),
        ],
    );

    let record = &records[0];
    assert_eq!(record.get("name"), Some(&Value::string("héllo")));
    assert_eq!(record.get("kind"), Some(&Value::string("RED")));
    assert_eq!(record.get("doc"), Some(&Value::string("{\"a\":1}")));
    assert_eq!(
        record.get("raw"),
        Some(&Value::Binary(bytes::Bytes::from_static(&[0, 159, 146])))
    );
    assert_eq!(
        record.get("blob"),
        Some(&Value::Binary(bytes::Bytes::from_static(&[5, 0, 0, 0, 0])))
    );
}

#[test]
fn test_assume_binary_is_string() {
    let file = write_parquet(
        "message root { required binary raw; }",
        vec![vec![strings(&["plain text"])]],
    );
    let options = ReaderOptions::builder()
        .with_assume_binary_is_string(true)
        .build()
        .unwrap();

    let records = read_all(file_reader_with_options(file, options).unwrap());
    assert_eq!(records[0].get("raw"), Some(&Value::string("plain text")));
}

#[test]
fn test_int96_timestamps() {
    let records = roundtrip(
        "message root { required int96 ts; }",
        vec![TestColumn::new(ColumnData::Int96(vec![
            int96(2_440_588, 0),
            int96(2_440_589, 0),
            int96(2_440_587, 1_000_000),
        ]))],
    );

    let micros: Vec<_> = records.iter().map(|r| r.get("ts").cloned()).collect();
    assert_eq!(
        micros,
        vec![
            Some(Value::Integer(0)),
            Some(Value::Integer(86_400_000_000)),
            Some(Value::Integer(-86_400_000_000 + 1_000)),
        ]
    );
}

#[test]
fn test_int96_rejected_when_not_timestamp() {
    let file = write_parquet(
        "message root { required int96 ts; }",
        vec![vec![TestColumn::new(ColumnData::Int96(vec![int96(2_440_588, 0)]))]],
    );
    let options = ReaderOptions::builder()
        .with_assume_int96_is_timestamp(false)
        .build()
        .unwrap();

    let err = file_reader_with_options(file, options).err().unwrap();
    assert!(matches!(
        err,
        ParquetError::Schema(SchemaError::Int96NotTimestamp)
    ));
}

fn schema_error(message: &str, column: TestColumn) -> String {
    let file = write_parquet(message, vec![vec![column]]);
    match file_reader(file) {
        Err(ParquetError::Schema(e)) => e.to_string(),
        Err(other) => panic!("expected a schema error, got {}", other),
        Ok(_) => panic!("expected a schema error"),
    }
}

#[test]
fn test_unsupported_types_fail_at_open() {
    assert_eq!(
        schema_error("message root { required int32 u (UINT_8); }", int32s(vec![1])),
        "Parquet type not supported: INT32 (UINT_8)"
    );
    assert_eq!(
        schema_error("message root { required int64 u (UINT_64); }", int64s(vec![1])),
        "Parquet type not supported: INT64 (UINT_64)"
    );
    assert_eq!(
        schema_error(
            "message root { required int64 ts (TIMESTAMP_MILLIS); }",
            int64s(vec![1])
        ),
        "Parquet type not yet supported: INT64 (TIMESTAMP_MILLIS)"
    );
    assert_eq!(
        schema_error(
            "message root { required int32 t (TIME_MILLIS); }",
            int32s(vec![1])
        ),
        "Parquet type not yet supported: INT32 (TIME_MILLIS)"
    );
}

#[test]
fn test_illegal_fixed_len_without_annotation() {
    let column = TestColumn::new(ColumnData::Fixed(vec![ByteArray::from(vec![1u8, 2]).into()]));
    assert_eq!(
        schema_error(
            "message root { required fixed_len_byte_array(2) f; }",
            column
        ),
        "Illegal Parquet type: FIXED_LEN_BYTE_ARRAY"
    );
}

#[test]
fn test_invalid_utf8_is_a_corrupt_record() {
    let message = "message root { required binary name (UTF8); }";
    let column = TestColumn::new(ColumnData::Bytes(vec![
        ByteArray::from("fine"),
        ByteArray::from(vec![0xffu8, 0xfe]),
        ByteArray::from("also fine"),
    ]));
    let file = write_parquet(message, vec![vec![column]]);

    let options = ReaderOptions::builder()
        .with_bad_record_threshold(0.5)
        .build()
        .unwrap();
    let mut reader = file_reader_with_options(file, options).unwrap();
    let records: Vec<Value> = reader.by_ref().collect::<Result<_>>().unwrap();

    assert_eq!(
        records,
        vec![
            record(vec![("name", Value::string("fine"))]),
            record(vec![("name", Value::string("also fine"))]),
        ]
    );
    assert_eq!(reader.error_count(), 1);
}
