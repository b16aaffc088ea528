use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
/// Errors raised while building, encoding or streaming CSV rows.
pub enum BuilderError {
    /// A text or byte item could not be decoded into a structured value.
    #[error("failed to parse structured payload: {0}")]
    MalformedPayload(String),

    /// A decoded stream item was neither a mapping nor a sequence.
    #[error("received \"{kind}\" from stream, expected an object or an array")]
    UnexpectedPayloadKind { kind: String },

    /// `encode_record` was handed a scalar or null.
    #[error("cannot encode a record of kind \"{kind}\", expected an object or an array")]
    InvalidRecordKind { kind: String },

    /// Malformed construction configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A typed record could not be converted into a structured value.
    #[error("failed to serialize record: {0}")]
    Serialization(String),

    /// An item was offered to a stage that already failed.
    #[error("encode stage halted after a previous failure")]
    StageHalted,

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),
}
