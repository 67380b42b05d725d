//! Output format selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoding used for curated artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Indented JSON array.
    #[default]
    Json,
    /// Gzip-compressed CSV with a header row.
    CsvGzip,
    /// Parquet with block compression.
    Parquet,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Json,
        OutputFormat::CsvGzip,
        OutputFormat::Parquet,
    ];

    /// File extension appended to the artifact base name (no leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::CsvGzip => "csv.gz",
            OutputFormat::Parquet => "parquet",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::CsvGzip => "text/csv",
            OutputFormat::Parquet => "application/octet-stream",
        }
    }

    pub fn content_encoding(self) -> Option<&'static str> {
        match self {
            OutputFormat::CsvGzip => Some("gzip"),
            OutputFormat::Json | OutputFormat::Parquet => None,
        }
    }

    /// Infer the format of a stored artifact from its key suffix.
    ///
    /// Keys with no recognized suffix are read as JSON.
    pub fn from_key(key: &str) -> Self {
        if key.ends_with(".csv.gz") {
            OutputFormat::CsvGzip
        } else if key.ends_with(".parquet") {
            OutputFormat::Parquet
        } else {
            OutputFormat::Json
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::CsvGzip => write!(f, "csv_gzip"),
            OutputFormat::Parquet => write!(f, "parquet"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv_gzip" | "csv-gzip" | "csv.gz" | "csv" => Ok(OutputFormat::CsvGzip),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!(
                "unknown output format '{other}' (expected json, csv_gzip or parquet)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_recognizes_extensions() {
        assert_eq!(
            OutputFormat::from_key("validated/year=2024/month=01/day=15/a.csv.gz"),
            OutputFormat::CsvGzip
        );
        assert_eq!(OutputFormat::from_key("validated/x/a.parquet"), OutputFormat::Parquet);
        assert_eq!(OutputFormat::from_key("validated/x/a.json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_key("validated/x/a"), OutputFormat::Json);
    }

    #[test]
    fn test_parse_and_display_agree() {
        for format in OutputFormat::ALL {
            assert_eq!(format.to_string().parse::<OutputFormat>(), Ok(format));
        }
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&OutputFormat::CsvGzip).unwrap(),
            "\"csv_gzip\""
        );
    }
}
