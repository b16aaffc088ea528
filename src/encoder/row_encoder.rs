use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::{
    BuilderError,
    encoder::{
        config::{DiagnosticSink, EncoderConfig, Headers, LogDiagnostics},
        format::Format,
        path::AccessPath,
        value::{RecordKind, field_text},
    },
};

/// A computed column: a pure function of the whole record.
pub type VirtualFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

const CONSTRAINTS_DEPRECATED: &str = "\"constraints\" is deprecated, please use \"alias\"";
const SET_DEPRECATED: &str = "\"set()\" is deprecated. Please use \"alias()\".";

/// Turns records into delimited text rows following an ordered column schema.
///
/// Every column is resolved the same way: a registered virtual function
/// wins, otherwise the column's access path (its alias, or the column name
/// itself) is looked up in the record, and a path that leads nowhere gives
/// an empty field.
///
/// # Examples
///
/// ```
/// use csv_builder_rs::encoder::row_encoder::RowEncoderBuilder;
/// use serde_json::json;
///
/// let encoder = RowEncoderBuilder::new().headers("foo bar bang").build();
///
/// let row = encoder
///     .encode_record(&json!({"foo": "foo \"bar\" bang", "bar": "bang,baz", "bang": 42}))
///     .unwrap();
///
/// assert_eq!(encoder.encode_header(), "\"foo\",\"bar\",\"bang\"\n");
/// assert_eq!(row, "\"foo \"\"bar\"\" bang\",\"bang,baz\",\"42\"\n");
/// ```
#[derive(Clone)]
pub struct RowEncoder {
    columns: Vec<String>,
    resolution: HashMap<String, AccessPath>,
    virtuals: HashMap<String, VirtualFn>,
    format: Format,
    // One access path per column, rebuilt whenever columns or aliases change.
    plan: Vec<AccessPath>,
    diagnostics: Arc<dyn DiagnosticSink>,
    warned: HashSet<&'static str>,
}

impl fmt::Debug for RowEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut virtuals: Vec<&String> = self.virtuals.keys().collect();
        virtuals.sort();
        f.debug_struct("RowEncoder")
            .field("columns", &self.columns)
            .field("resolution", &self.resolution)
            .field("virtuals", &virtuals)
            .field("format", &self.format)
            .finish()
    }
}

impl RowEncoder {
    pub fn from_config(config: EncoderConfig) -> RowEncoder {
        RowEncoderBuilder::from_config(config).build()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Returns the access path used for `column`, alias or default.
    pub fn path_of(&self, column: &str) -> Option<&AccessPath> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|index| &self.plan[index])
    }

    pub fn set_headers(&mut self, headers: impl Into<Headers>) -> &mut Self {
        self.columns = headers.into().into_columns();
        self.rebuild_plan();
        self
    }

    pub fn alias(&mut self, column: &str, path: &str) -> &mut Self {
        self.resolution
            .insert(column.to_string(), AccessPath::parse(path));
        self.rebuild_plan();
        self
    }

    /// Merges several `column -> path` entries into the alias table.
    pub fn alias_all<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (column, path) in entries {
            self.resolution
                .insert(column.into(), AccessPath::parse(path.as_ref()));
        }
        self.rebuild_plan();
        self
    }

    #[deprecated(note = "use `alias` instead")]
    pub fn set(&mut self, column: &str, path: &str) -> &mut Self {
        self.deprecate(SET_DEPRECATED);
        self.alias(column, path)
    }

    #[deprecated(note = "use `alias_all` instead")]
    pub fn constraints<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.deprecate(CONSTRAINTS_DEPRECATED);
        self.alias_all(entries)
    }

    /// Registers a computed column, replacing any previous one of that name.
    pub fn virtual_column<F, T>(&mut self, column: &str, f: F) -> &mut Self
    where
        F: Fn(&Value) -> T + Send + Sync + 'static,
        T: Into<Value>,
    {
        self.virtuals
            .insert(column.to_string(), Arc::new(move |record| f(record).into()));
        self
    }

    /// Encodes the column names themselves as a row.
    pub fn encode_header(&self) -> String {
        self.format.join_row(&self.columns)
    }

    /// Encodes a record, either a mapping resolved through the schema or a
    /// sequence taken positionally.
    ///
    /// A sequence shorter than the schema is padded with empty fields and
    /// extra positions are ignored, so the row always has one field per
    /// column.
    ///
    /// # Errors
    ///
    /// [`BuilderError::InvalidRecordKind`] when `record` is a scalar or null.
    pub fn encode_record(&self, record: &Value) -> Result<String, BuilderError> {
        match record {
            Value::Object(_) => Ok(self.encode_mapping(record)),
            Value::Array(values) => {
                let fields = (0..self.columns.len())
                    .map(|index| values.get(index).map(field_text).unwrap_or_default());
                Ok(self.format.join_row(fields))
            }
            other => Err(BuilderError::InvalidRecordKind {
                kind: RecordKind::of(other).to_string(),
            }),
        }
    }

    /// Encodes values that are already in their final column order.
    ///
    /// No schema is involved and no padding happens: the row has exactly
    /// `values.len()` fields.
    pub fn encode_raw_array(&self, values: &[Value]) -> String {
        self.format.join_row(values.iter().map(field_text))
    }

    /// Encodes any serializable record by going through `serde_json::Value`.
    pub fn encode_serialize<T: Serialize + ?Sized>(
        &self,
        record: &T,
    ) -> Result<String, BuilderError> {
        let value = serde_json::to_value(record)
            .map_err(|error| BuilderError::Serialization(error.to_string()))?;
        self.encode_record(&value)
    }

    /// Encodes a whole batch: the header followed by one row per record.
    ///
    /// An empty batch gives an empty string, not a lone header.
    pub fn encode_all<'r, I>(&self, records: I) -> Result<String, BuilderError>
    where
        I: IntoIterator<Item = &'r Value>,
    {
        let mut out = String::new();
        let mut header_written = false;
        for record in records {
            if !header_written {
                out.push_str(&self.encode_header());
                header_written = true;
            }
            out.push_str(&self.encode_record(record)?);
        }
        Ok(out)
    }

    fn encode_mapping(&self, record: &Value) -> String {
        let fields = self
            .columns
            .iter()
            .zip(&self.plan)
            .map(|(column, path)| match self.virtuals.get(column) {
                Some(compute) => field_text(&compute(record)),
                None => path.resolve(record).map(field_text).unwrap_or_default(),
            });
        self.format.join_row(fields)
    }

    fn rebuild_plan(&mut self) {
        self.plan = self
            .columns
            .iter()
            .map(|column| match self.resolution.get(column) {
                Some(path) => path.clone(),
                None => AccessPath::parse(column),
            })
            .collect();
    }

    fn deprecate(&mut self, notice: &'static str) {
        if self.warned.insert(notice) {
            self.diagnostics.deprecated(notice);
        }
    }
}

/// Builder for [`RowEncoder`].
pub struct RowEncoderBuilder {
    headers: Option<Headers>,
    alias: HashMap<String, String>,
    legacy_alias: HashMap<String, String>,
    virtuals: Vec<(String, VirtualFn)>,
    format: Format,
    diagnostics: Arc<dyn DiagnosticSink>,
    deprecations: Vec<&'static str>,
}

impl Default for RowEncoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RowEncoderBuilder {
    pub fn new() -> RowEncoderBuilder {
        RowEncoderBuilder {
            headers: None,
            alias: HashMap::new(),
            legacy_alias: HashMap::new(),
            virtuals: Vec::new(),
            format: Format::default(),
            diagnostics: Arc::new(LogDiagnostics),
            deprecations: Vec::new(),
        }
    }

    pub fn from_config(config: EncoderConfig) -> RowEncoderBuilder {
        let mut builder = RowEncoderBuilder::new()
            .delimiter(&config.delimiter)
            .terminator(&config.terminator)
            .quoted(config.quoted)
            .alias_all(config.alias);

        if let Some(headers) = config.headers {
            builder = builder.headers(headers);
        }
        if let Some(constraints) = config.constraints {
            builder = builder.constraints(constraints);
        }
        if let Some(set) = config.set {
            builder.deprecations.push(SET_DEPRECATED);
            builder.legacy_alias.extend(set);
        }
        builder
    }

    pub fn headers(mut self, headers: impl Into<Headers>) -> RowEncoderBuilder {
        self.headers = Some(headers.into());
        self
    }

    pub fn alias(mut self, column: &str, path: &str) -> RowEncoderBuilder {
        self.alias.insert(column.to_string(), path.to_string());
        self
    }

    pub fn alias_all<I, K, V>(mut self, entries: I) -> RowEncoderBuilder
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.alias
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Deprecated spelling of [`RowEncoderBuilder::alias_all`]; entries given
    /// through `alias` win on conflict.
    pub fn constraints<I, K, V>(mut self, entries: I) -> RowEncoderBuilder
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.deprecations.push(CONSTRAINTS_DEPRECATED);
        self.legacy_alias
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn virtual_column<F, T>(mut self, column: &str, f: F) -> RowEncoderBuilder
    where
        F: Fn(&Value) -> T + Send + Sync + 'static,
        T: Into<Value>,
    {
        let compute: VirtualFn = Arc::new(move |record| f(record).into());
        self.virtuals.push((column.to_string(), compute));
        self
    }

    pub fn delimiter(mut self, delimiter: &str) -> RowEncoderBuilder {
        self.format.delimiter = delimiter.to_string();
        self
    }

    pub fn terminator(mut self, terminator: &str) -> RowEncoderBuilder {
        self.format.terminator = terminator.to_string();
        self
    }

    pub fn quoted(mut self, quoted: bool) -> RowEncoderBuilder {
        self.format.quoted = quoted;
        self
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> RowEncoderBuilder {
        self.diagnostics = Arc::new(sink);
        self
    }

    pub fn build(self) -> RowEncoder {
        let mut encoder = RowEncoder {
            columns: self.headers.map(Headers::into_columns).unwrap_or_default(),
            resolution: HashMap::new(),
            virtuals: self.virtuals.into_iter().collect(),
            format: self.format,
            plan: Vec::new(),
            diagnostics: self.diagnostics,
            warned: HashSet::new(),
        };

        for notice in self.deprecations {
            encoder.deprecate(notice);
        }

        let entries = self.legacy_alias.into_iter().chain(self.alias);
        encoder.alias_all(entries);

        debug!(
            "RowEncoder built with {} columns: {:?}",
            encoder.columns.len(),
            encoder.columns
        );
        encoder
    }
}
