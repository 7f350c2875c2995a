use serde::Deserialize;

use crate::error::{ParquetError, Result};

/// Settings that change how leaf values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Treat byte arrays without annotation as UTF-8 text
    pub assume_binary_is_string: bool,
    /// Read INT96 columns as legacy timestamps; when false INT96 is rejected
    pub assume_int96_is_timestamp: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            assume_binary_is_string: false,
            assume_int96_is_timestamp: true,
        }
    }
}

/// Settings for a [`crate::RowReader`]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    #[serde(flatten)]
    pub conversion: ConversionOptions,
    /// Fraction of the total row count that may fail to materialize, in `[0, 1]`
    pub bad_record_threshold: f64,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            conversion: ConversionOptions::default(),
            bad_record_threshold: 0.0,
        }
    }
}

impl ReaderOptions {
    pub fn builder() -> ReaderOptionsBuilder {
        ReaderOptionsBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.bad_record_threshold) {
            return Err(ParquetError::invalid_argument(format!(
                "bad_record_threshold must be between 0 and 1, got {}",
                self.bad_record_threshold
            )));
        }
        Ok(())
    }
}

/// Builder for [`ReaderOptions`]
#[derive(Debug, Default)]
pub struct ReaderOptionsBuilder {
    options: ReaderOptions,
}

impl ReaderOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat unannotated byte arrays as UTF-8 strings
    pub fn with_assume_binary_is_string(mut self, enabled: bool) -> Self {
        self.options.conversion.assume_binary_is_string = enabled;
        self
    }

    /// Interpret INT96 as a timestamp
    pub fn with_assume_int96_is_timestamp(mut self, enabled: bool) -> Self {
        self.options.conversion.assume_int96_is_timestamp = enabled;
        self
    }

    /// Set the tolerated fraction of unreadable records
    pub fn with_bad_record_threshold(mut self, threshold: f64) -> Self {
        self.options.bad_record_threshold = threshold;
        self
    }

    pub fn build(self) -> Result<ReaderOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReaderOptions::default();
        assert!(!options.conversion.assume_binary_is_string);
        assert!(options.conversion.assume_int96_is_timestamp);
        assert_eq!(options.bad_record_threshold, 0.0);
    }

    #[test]
    fn test_builder() {
        let options = ReaderOptions::builder()
            .with_assume_binary_is_string(true)
            .with_bad_record_threshold(0.25)
            .build()
            .unwrap();
        assert!(options.conversion.assume_binary_is_string);
        assert_eq!(options.bad_record_threshold, 0.25);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = ReaderOptions::builder()
            .with_bad_record_threshold(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, ParquetError::InvalidArgument(_)));
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ReaderOptions =
            serde_json::from_str(r#"{"assume_int96_is_timestamp": false, "bad_record_threshold": 0.1}"#)
                .unwrap();
        assert!(!options.conversion.assume_int96_is_timestamp);
        assert!(!options.conversion.assume_binary_is_string);
        assert_eq!(options.bad_record_threshold, 0.1);
    }
}
