//! Declarative encoder configuration.
//!
//! [`EncoderConfig`] is the serde-friendly description of a schema and its
//! format. It is usually loaded from JSON and handed to
//! [`RowEncoderBuilder::from_config`](crate::encoder::row_encoder::RowEncoderBuilder::from_config).
//! Virtual columns are code, so they are registered on the builder instead.
//!
//! ```
//! use csv_builder_rs::encoder::config::{EncoderConfig, Headers};
//!
//! let config = EncoderConfig::from_json(
//!     r#"{"headers": "Name Age", "alias": {"Name": "user.name"}, "delimiter": ";"}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.headers, Some(Headers::from("Name Age")));
//! assert_eq!(config.delimiter, ";");
//! assert!(config.quoted);
//! ```

use std::collections::HashMap;

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    BuilderError,
    encoder::format::{DEFAULT_DELIMITER, DEFAULT_TERMINATOR},
};

/// Column list, either as one space-separated string or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Headers {
    Spaced(String),
    List(Vec<String>),
}

impl Headers {
    /// Splits a spaced header string on single spaces, dropping empty pieces.
    pub fn into_columns(self) -> Vec<String> {
        match self {
            Headers::Spaced(spaced) => spaced
                .split(' ')
                .filter(|column| !column.is_empty())
                .map(str::to_string)
                .collect(),
            Headers::List(columns) => columns,
        }
    }
}

impl From<&str> for Headers {
    fn from(spaced: &str) -> Self {
        Headers::Spaced(spaced.to_string())
    }
}

impl From<String> for Headers {
    fn from(spaced: String) -> Self {
        Headers::Spaced(spaced)
    }
}

impl From<Vec<String>> for Headers {
    fn from(columns: Vec<String>) -> Self {
        Headers::List(columns)
    }
}

impl From<Vec<&str>> for Headers {
    fn from(columns: Vec<&str>) -> Self {
        Headers::List(columns.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Headers {
    fn from(columns: [&str; N]) -> Self {
        Headers::List(columns.iter().map(|c| c.to_string()).collect())
    }
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

fn default_terminator() -> String {
    DEFAULT_TERMINATOR.to_string()
}

fn default_quoted() -> bool {
    true
}

/// Serializable construction options of a
/// [`RowEncoder`](crate::encoder::row_encoder::RowEncoder).
///
/// `constraints` and `set` are deprecated spellings of `alias`; they are
/// still honoured, with `alias` entries winning on conflict.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EncoderConfig {
    #[serde(default)]
    pub headers: Option<Headers>,
    #[serde(default)]
    pub alias: HashMap<String, String>,
    #[serde(default)]
    pub constraints: Option<HashMap<String, String>>,
    #[serde(default)]
    pub set: Option<HashMap<String, String>>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_terminator")]
    pub terminator: String,
    #[serde(default = "default_quoted")]
    pub quoted: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            headers: None,
            alias: HashMap::new(),
            constraints: None,
            set: None,
            delimiter: default_delimiter(),
            terminator: default_terminator(),
            quoted: default_quoted(),
        }
    }
}

impl EncoderConfig {
    pub fn from_json(json: &str) -> Result<EncoderConfig, BuilderError> {
        serde_json::from_str(json).map_err(|error| BuilderError::InvalidArgument(error.to_string()))
    }

    pub fn from_value(value: Value) -> Result<EncoderConfig, BuilderError> {
        serde_json::from_value(value)
            .map_err(|error| BuilderError::InvalidArgument(error.to_string()))
    }
}

/// Receives non-fatal notices, such as the use of a deprecated option.
pub trait DiagnosticSink: Send + Sync {
    fn deprecated(&self, notice: &str);
}

/// Default sink, forwarding notices to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn deprecated(&self, notice: &str) {
        warn!("CsvBuilder: {}", notice);
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn deprecated(&self, notice: &str) {
        self(notice)
    }
}
