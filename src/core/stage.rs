use std::{iter::FusedIterator, ops::Deref};

use log::debug;
use serde_json::Value;

use crate::{
    BuilderError,
    core::item::ItemReader,
    encoder::{row_encoder::RowEncoder, value::RecordKind},
    item::memory::VecItemReader,
};

/// An item entering the stage, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// UTF-8 bytes holding JSON text.
    Bytes(Vec<u8>),
    /// JSON text.
    Text(String),
    /// An in-memory record, used as is.
    Structured(Value),
}

impl Payload {
    /// Normalizes the payload into a structured value.
    ///
    /// # Errors
    ///
    /// [`BuilderError::MalformedPayload`] when the text, or the bytes decoded
    /// as UTF-8, are not valid JSON. Invalid UTF-8 sequences are replaced
    /// with U+FFFD rather than rejected.
    pub fn into_value(self) -> Result<Value, BuilderError> {
        let parsed: Result<Value, serde_json::Error> = match self {
            Payload::Structured(value) => return Ok(value),
            Payload::Text(text) => serde_json::from_str(&text),
            Payload::Bytes(bytes) => serde_json::from_str(&String::from_utf8_lossy(&bytes)),
        };
        parsed.map_err(|error| BuilderError::MalformedPayload(error.to_string()))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

/// Output of one accepted item: the header on the first item only, then the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub header: Option<String>,
    pub row: String,
}

impl Emitted {
    pub fn into_chunks(self) -> impl Iterator<Item = String> {
        self.header.into_iter().chain(std::iter::once(self.row))
    }
}

/// Stateful adapter applying a [`RowEncoder`] to a sequence of items.
///
/// The header is emitted lazily, right before the first data row, so an
/// empty input yields no output at all. The first failure halts the stage:
/// it never emits a partial row and refuses every later item with
/// [`BuilderError::StageHalted`].
///
/// `E` is any handle to an encoder, typically `&RowEncoder` or
/// `Arc<RowEncoder>`.
///
/// # Examples
///
/// ```
/// use csv_builder_rs::core::stage::EncodeStage;
/// use csv_builder_rs::encoder::row_encoder::RowEncoderBuilder;
///
/// let encoder = RowEncoderBuilder::new().headers("foo bar").build();
/// let mut stage = EncodeStage::new(&encoder);
///
/// let first = stage.accept(r#"{"foo": "42", "bar": "bang"}"#).unwrap();
/// assert_eq!(first.header.as_deref(), Some("\"foo\",\"bar\"\n"));
/// assert_eq!(first.row, "\"42\",\"bang\"\n");
///
/// let second = stage.accept(r#"{"foo": "43", "bar": "baz"}"#).unwrap();
/// assert_eq!(second.header, None);
///
/// assert!(stage.accept("not json").is_err());
/// assert!(stage.is_halted());
/// ```
pub struct EncodeStage<E> {
    encoder: E,
    header_emitted: bool,
    halted: bool,
    accepted: usize,
}

impl<E> EncodeStage<E>
where
    E: Deref<Target = RowEncoder>,
{
    pub fn new(encoder: E) -> Self {
        EncodeStage {
            encoder,
            header_emitted: false,
            halted: false,
            accepted: 0,
        }
    }

    pub fn encoder(&self) -> &RowEncoder {
        &self.encoder
    }

    pub fn header_emitted(&self) -> bool {
        self.header_emitted
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Number of items successfully turned into rows.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Decodes, validates and encodes one item.
    ///
    /// # Errors
    ///
    /// - [`BuilderError::MalformedPayload`] for undecodable text or bytes
    /// - [`BuilderError::UnexpectedPayloadKind`] for scalars and null
    /// - [`BuilderError::StageHalted`] once any earlier item failed
    pub fn accept(&mut self, item: impl Into<Payload>) -> Result<Emitted, BuilderError> {
        if self.halted {
            return Err(BuilderError::StageHalted);
        }
        self.encode(item.into()).inspect_err(|error| {
            debug!("Encode stage halted after {} rows: {}", self.accepted, error);
            self.halted = true;
        })
    }

    fn encode(&mut self, item: Payload) -> Result<Emitted, BuilderError> {
        let value = item.into_value()?;

        let kind = RecordKind::of(&value);
        if !kind.is_encodable() {
            return Err(BuilderError::UnexpectedPayloadKind {
                kind: kind.to_string(),
            });
        }

        let row = self.encoder.encode_record(&value)?;

        let header = if self.header_emitted {
            None
        } else {
            self.header_emitted = true;
            Some(self.encoder.encode_header())
        };

        self.accepted += 1;
        Ok(Emitted { header, row })
    }
}

/// Demand-driven stream of encoded chunks pulled from an [`ItemReader`].
///
/// The reader is only asked for an item when no chunk is pending, and at
/// most one chunk (the first row, queued behind the header) is ever held.
/// A failure is yielded once, after which the stream is exhausted; chunks
/// yielded before it stay valid.
pub struct EncodeStream<E, R> {
    stage: EncodeStage<E>,
    reader: R,
    pending: Option<String>,
    finished: bool,
}

impl<E, R> EncodeStream<E, R>
where
    E: Deref<Target = RowEncoder>,
    R: ItemReader<Payload>,
{
    pub fn new(encoder: E, reader: R) -> Self {
        EncodeStream {
            stage: EncodeStage::new(encoder),
            reader,
            pending: None,
            finished: false,
        }
    }

    pub fn stage(&self) -> &EncodeStage<E> {
        &self.stage
    }

    pub fn into_reader(self) -> R {
        self.reader
    }
}

impl<E, R> Iterator for EncodeStream<E, R>
where
    E: Deref<Target = RowEncoder>,
    R: ItemReader<Payload>,
{
    type Item = Result<String, BuilderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(chunk) = self.pending.take() {
            return Some(Ok(chunk));
        }
        if self.finished {
            return None;
        }

        let item = match self.reader.read() {
            Ok(Some(item)) => item,
            Ok(None) => {
                debug!("End of encode stream: {} rows", self.stage.accepted());
                self.finished = true;
                return None;
            }
            Err(error) => {
                self.finished = true;
                return Some(Err(error));
            }
        };

        match self.stage.accept(item) {
            Ok(Emitted {
                header: Some(header),
                row,
            }) => {
                self.pending = Some(row);
                Some(Ok(header))
            }
            Ok(Emitted { header: None, row }) => Some(Ok(row)),
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

impl<E, R> FusedIterator for EncodeStream<E, R>
where
    E: Deref<Target = RowEncoder>,
    R: ItemReader<Payload>,
{
}

/// Builds a stream over an in-memory list of items.
///
/// ```
/// use csv_builder_rs::core::stage::read_stream;
/// use csv_builder_rs::encoder::row_encoder::RowEncoderBuilder;
/// use serde_json::json;
///
/// let encoder = RowEncoderBuilder::new().headers("foo bar").build();
/// let csv: String = read_stream(&encoder, vec![json!({"foo": 1}), json!(["x", "y"])])
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(csv, "\"foo\",\"bar\"\n\"1\",\"\"\n\"x\",\"y\"\n");
/// ```
pub fn read_stream<E, I, T>(encoder: E, items: I) -> EncodeStream<E, VecItemReader<Payload>>
where
    E: Deref<Target = RowEncoder>,
    I: IntoIterator<Item = T>,
    T: Into<Payload>,
{
    let reader = VecItemReader::new(items.into_iter().map(Into::into).collect());
    EncodeStream::new(encoder, reader)
}
