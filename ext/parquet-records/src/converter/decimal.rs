use num::BigInt;

use crate::error::{RecordError, SchemaError};
use crate::schema::{OriginalType, SchemaNode};
use crate::value::Value;

/// Largest precision an INT32-backed decimal can hold
pub const MAX_INT_DIGITS: u32 = 9;
/// Largest precision an INT64-backed decimal can hold
pub const MAX_LONG_DIGITS: u32 = 18;

/// Precision and scale of a decimal leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalType {
    pub precision: u32,
    pub scale: u32,
}

impl DecimalType {
    /// Read the decimal annotation of `node`, checking it against the storage bound.
    ///
    /// `max_precision` is `None` for byte-array storage, which has no bound.
    pub fn resolve(node: &SchemaNode, max_precision: Option<u32>) -> Result<Self, SchemaError> {
        let Some(OriginalType::Decimal { precision, scale }) = node.original_type() else {
            return Err(SchemaError::Illegal(node.type_string()));
        };

        if let Some(max) = max_precision {
            if !(1..=max).contains(&precision) {
                return Err(SchemaError::InvalidDecimalPrecision {
                    name: node.name().to_string(),
                    precision,
                    max,
                });
            }
        }

        Ok(Self { precision, scale })
    }

    /// Bytes-backed decimals below this precision fit the 64-bit fast path
    fn fits_in_long(&self) -> bool {
        self.precision < MAX_LONG_DIGITS
    }

    /// Convert an unscaled integer stored in INT32/INT64
    pub fn convert_unscaled(&self, unscaled: i64) -> Result<Value, RecordError> {
        let magnitude = unscaled.unsigned_abs();
        let digits = magnitude.checked_ilog10().map_or(1, |d| d + 1);
        if digits > self.precision {
            return Err(RecordError::DecimalOverflow {
                unscaled: unscaled.to_string(),
                precision: self.precision,
            });
        }

        // Both operands are exact here, so the one division rounds correctly
        match EXACT_POWERS_OF_TEN.get(self.scale as usize) {
            Some(power) if magnitude <= MAX_EXACT_INTEGER => {
                Ok(Value::float(unscaled as f64 / power))
            }
            _ => self.parse_scaled(unscaled < 0, &magnitude.to_string()),
        }
    }

    /// Convert a big-endian two's-complement unscaled integer
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<Value, RecordError> {
        if bytes.is_empty() {
            return Err(RecordError::MalformedDecimal(0));
        }

        // Fixed-length columns may be wider than the precision needs
        let bytes = strip_sign_extension(bytes);
        if self.fits_in_long() && bytes.len() <= 8 {
            return self.convert_unscaled(sign_extend(bytes));
        }

        let unscaled = BigInt::from_signed_bytes_be(bytes);
        let text = unscaled.to_string();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, text.as_str()),
        };
        if digits.len() as u32 > self.precision {
            return Err(RecordError::DecimalOverflow {
                unscaled: text.clone(),
                precision: self.precision,
            });
        }
        self.parse_scaled(negative, digits)
    }

    /// Parsing the decimal literal gives a correctly rounded double
    fn parse_scaled(&self, negative: bool, digits: &str) -> Result<Value, RecordError> {
        let sign = if negative { "-" } else { "" };
        format!("{}{}e-{}", sign, digits, self.scale)
            .parse::<f64>()
            .map(Value::float)
            .map_err(|e| RecordError::corrupt(format!("Invalid decimal {}: {}", digits, e)))
    }
}

/// Integers up to 2^53 convert to `f64` without rounding
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Powers of ten that `f64` represents exactly
const EXACT_POWERS_OF_TEN: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Drop leading bytes that only repeat the sign, keeping at least one byte
fn strip_sign_extension(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let fill = if bytes[start + 1] & 0x80 != 0 { 0xFF } else { 0x00 };
        if bytes[start] != fill {
            break;
        }
        start += 1;
    }
    &bytes[start..]
}

fn sign_extend(bytes: &[u8]) -> i64 {
    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut buf = [fill; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    i64::from_be_bytes(buf)
}
