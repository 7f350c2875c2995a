use bytes::Bytes;
use std::sync::Arc;

use super::decimal::{DecimalType, MAX_INT_DIGITS, MAX_LONG_DIGITS};
use super::updater::{ContainerUpdater, Updater};
use crate::error::{RecordError, SchemaError};
use crate::options::ConversionOptions;
use crate::schema::{OriginalType, PhysicalType, SchemaNode};
use crate::source::Primitive;
use crate::value::Value;

/// Julian day number of 1970-01-01
const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;
const MICROS_PER_DAY: i64 = 86_400 * 1_000_000;

#[cfg(test)]
thread_local! {
    pub(crate) static UTF8_DECODES: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// How a leaf column's decoded primitives become values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    /// INT32 narrowed to 8 bits
    Int8,
    /// INT32 narrowed to 16 bits
    Int16,
    /// Days since the Unix epoch
    Date,
    Decimal(DecimalType),
    /// Legacy 12-byte timestamp, read as microseconds since the epoch
    Int96Timestamp,
    String,
    Binary,
}

impl LeafKind {
    /// Pick the conversion for a primitive schema node
    pub fn for_node(node: &SchemaNode, options: &ConversionOptions) -> Result<Self, SchemaError> {
        let SchemaNode::Primitive {
            physical_type,
            original_type,
            ..
        } = node
        else {
            return Err(SchemaError::Illegal(node.type_string()));
        };

        let type_string = node.type_string();
        let kind = match (physical_type, original_type) {
            (PhysicalType::Boolean, _) => LeafKind::Boolean,
            (PhysicalType::Float, _) => LeafKind::Float,
            (PhysicalType::Double, _) => LeafKind::Double,

            (PhysicalType::Int32, None | Some(OriginalType::Int32)) => LeafKind::Int32,
            (PhysicalType::Int32, Some(OriginalType::Int8)) => LeafKind::Int8,
            (PhysicalType::Int32, Some(OriginalType::Int16)) => LeafKind::Int16,
            (PhysicalType::Int32, Some(OriginalType::Date)) => LeafKind::Date,
            (PhysicalType::Int32, Some(OriginalType::Decimal { .. })) => {
                LeafKind::Decimal(DecimalType::resolve(node, Some(MAX_INT_DIGITS))?)
            }
            (
                PhysicalType::Int32,
                Some(OriginalType::UInt8 | OriginalType::UInt16 | OriginalType::UInt32),
            ) => return Err(SchemaError::Unsupported(type_string)),
            (PhysicalType::Int32, Some(OriginalType::TimeMillis)) => {
                return Err(SchemaError::NotYetSupported(type_string))
            }

            (PhysicalType::Int64, None | Some(OriginalType::Int64)) => LeafKind::Int64,
            (PhysicalType::Int64, Some(OriginalType::Decimal { .. })) => {
                LeafKind::Decimal(DecimalType::resolve(node, Some(MAX_LONG_DIGITS))?)
            }
            (PhysicalType::Int64, Some(OriginalType::UInt64)) => {
                return Err(SchemaError::Unsupported(type_string))
            }
            (PhysicalType::Int64, Some(OriginalType::TimestampMillis)) => {
                return Err(SchemaError::NotYetSupported(type_string))
            }

            (PhysicalType::Int96, _) => {
                if !options.assume_int96_is_timestamp {
                    return Err(SchemaError::Int96NotTimestamp);
                }
                LeafKind::Int96Timestamp
            }

            (PhysicalType::ByteArray, None) if options.assume_binary_is_string => LeafKind::String,
            (PhysicalType::ByteArray, None) => LeafKind::Binary,
            (
                PhysicalType::ByteArray,
                Some(OriginalType::Utf8 | OriginalType::Enum | OriginalType::Json),
            ) => LeafKind::String,
            (PhysicalType::ByteArray, Some(OriginalType::Bson)) => LeafKind::Binary,
            (
                PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_),
                Some(OriginalType::Decimal { .. }),
            ) => LeafKind::Decimal(DecimalType::resolve(node, None)?),
            (PhysicalType::FixedLenByteArray(_), Some(OriginalType::Interval)) => {
                return Err(SchemaError::NotYetSupported(type_string))
            }

            _ => return Err(SchemaError::Illegal(type_string)),
        };
        Ok(kind)
    }

    fn name(&self) -> &'static str {
        match self {
            LeafKind::Boolean => "BOOLEAN",
            LeafKind::Int32 => "INT32",
            LeafKind::Int64 => "INT64",
            LeafKind::Float => "FLOAT",
            LeafKind::Double => "DOUBLE",
            LeafKind::Int8 => "INT_8",
            LeafKind::Int16 => "INT_16",
            LeafKind::Date => "DATE",
            LeafKind::Decimal(_) => "DECIMAL",
            LeafKind::Int96Timestamp => "INT96",
            LeafKind::String => "UTF8",
            LeafKind::Binary => "BINARY",
        }
    }
}

/// Converts the primitive events of one leaf column
#[derive(Debug)]
pub struct PrimitiveConverter {
    kind: LeafKind,
    pub(crate) updater: Updater,
    // `None` entries could not be decoded and fail the record that references them
    dictionary: Option<Vec<Option<Value>>>,
}

impl PrimitiveConverter {
    pub fn new(kind: LeafKind, updater: Updater) -> Self {
        Self {
            kind,
            updater,
            dictionary: None,
        }
    }

    fn unexpected(&self, event: &'static str) -> RecordError {
        RecordError::UnexpectedEvent {
            converter: self.kind.name(),
            event,
        }
    }

    pub fn add_boolean(&mut self, value: bool) -> Result<(), RecordError> {
        match self.kind {
            LeafKind::Boolean => self.updater.set_boolean(value),
            _ => return Err(self.unexpected("boolean")),
        }
        Ok(())
    }

    pub fn add_int32(&mut self, value: i32) -> Result<(), RecordError> {
        match self.kind {
            LeafKind::Int32 | LeafKind::Date => self.updater.set_int(value),
            LeafKind::Int8 => self.updater.set_byte(value as i8),
            LeafKind::Int16 => self.updater.set_short(value as i16),
            LeafKind::Decimal(decimal) => {
                let converted = decimal.convert_unscaled(value as i64)?;
                self.updater.set(converted)
            }
            _ => return Err(self.unexpected("int32")),
        }
        Ok(())
    }

    pub fn add_int64(&mut self, value: i64) -> Result<(), RecordError> {
        match self.kind {
            LeafKind::Int64 => self.updater.set_long(value),
            LeafKind::Decimal(decimal) => {
                let converted = decimal.convert_unscaled(value)?;
                self.updater.set(converted)
            }
            _ => return Err(self.unexpected("int64")),
        }
        Ok(())
    }

    pub fn add_float(&mut self, value: f32) -> Result<(), RecordError> {
        match self.kind {
            LeafKind::Float => self.updater.set_float(value),
            _ => return Err(self.unexpected("float")),
        }
        Ok(())
    }

    pub fn add_double(&mut self, value: f64) -> Result<(), RecordError> {
        match self.kind {
            LeafKind::Double => self.updater.set_double(value),
            _ => return Err(self.unexpected("double")),
        }
        Ok(())
    }

    pub fn add_bytes(&mut self, value: &Bytes) -> Result<(), RecordError> {
        match self.kind {
            LeafKind::String => {
                let converted = decode_utf8(value)?;
                self.updater.set(converted)
            }
            LeafKind::Binary => self.updater.set(Value::Binary(value.clone())),
            LeafKind::Decimal(decimal) => {
                let converted = decimal.convert_bytes(value)?;
                self.updater.set(converted)
            }
            LeafKind::Int96Timestamp => self.updater.set_long(int96_to_micros(value)?),
            _ => return Err(self.unexpected("binary")),
        }
        Ok(())
    }

    /// Dispatch a decoded primitive to the matching `add_*` event
    pub fn add(&mut self, value: &Primitive) -> Result<(), RecordError> {
        match value {
            Primitive::Boolean(v) => self.add_boolean(*v),
            Primitive::Int32(v) => self.add_int32(*v),
            Primitive::Int64(v) => self.add_int64(*v),
            Primitive::Float(v) => self.add_float(*v),
            Primitive::Double(v) => self.add_double(*v),
            Primitive::Bytes(v) => self.add_bytes(v),
        }
    }

    pub fn has_dictionary_support(&self) -> bool {
        matches!(self.kind, LeafKind::String | LeafKind::Decimal(_))
    }

    /// Convert every dictionary entry once; later lookups clone the cached value
    pub fn set_dictionary(&mut self, dictionary: &[Primitive]) -> Result<(), RecordError> {
        let mut cache = Vec::with_capacity(dictionary.len());
        for entry in dictionary {
            let converted = match (self.kind, entry) {
                (LeafKind::String, Primitive::Bytes(bytes)) => decode_utf8(bytes).ok(),
                (LeafKind::Decimal(decimal), Primitive::Bytes(bytes)) => {
                    Some(decimal.convert_bytes(bytes)?)
                }
                (LeafKind::Decimal(decimal), Primitive::Int32(v)) => {
                    Some(decimal.convert_unscaled(*v as i64)?)
                }
                (LeafKind::Decimal(decimal), Primitive::Int64(v)) => {
                    Some(decimal.convert_unscaled(*v)?)
                }
                _ => return Err(self.unexpected("dictionary")),
            };
            cache.push(converted);
        }
        self.dictionary = Some(cache);
        Ok(())
    }

    pub fn add_value_from_dictionary(&mut self, id: u32) -> Result<(), RecordError> {
        let dictionary = self
            .dictionary
            .as_ref()
            .ok_or(RecordError::MissingDictionary)?;
        let entry = dictionary.get(id as usize).ok_or(RecordError::DictionaryId {
            id,
            size: dictionary.len(),
        })?;
        match entry {
            Some(value) => {
                let value = value.clone();
                self.updater.set(value);
                Ok(())
            }
            None => Err(RecordError::corrupt(format!(
                "dictionary entry {} is not valid UTF-8",
                id
            ))),
        }
    }
}

fn decode_utf8(bytes: &Bytes) -> Result<Value, RecordError> {
    #[cfg(test)]
    UTF8_DECODES.with(|count| count.set(count.get() + 1));

    std::str::from_utf8(bytes)
        .map(|s| Value::String(Arc::from(s)))
        .map_err(|e| RecordError::corrupt(format!("invalid UTF-8 in string column: {}", e)))
}

fn int96_to_micros(bytes: &[u8]) -> Result<i64, RecordError> {
    let bytes: &[u8; 12] = bytes
        .try_into()
        .map_err(|_| RecordError::Int96Length(bytes.len()))?;

    let mut nanos = [0u8; 8];
    nanos.copy_from_slice(&bytes[..8]);
    let mut julian_day = [0u8; 4];
    julian_day.copy_from_slice(&bytes[8..]);

    let nanos_of_day = i64::from_le_bytes(nanos);
    let julian_day = i32::from_le_bytes(julian_day);
    (julian_day as i64 - JULIAN_DAY_OF_EPOCH)
        .checked_mul(MICROS_PER_DAY)
        .and_then(|micros| micros.checked_add(nanos_of_day / 1000))
        .ok_or(RecordError::Int96Overflow {
            julian_day,
            nanos_of_day,
        })
}
