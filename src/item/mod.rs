#[cfg(feature = "logger")]
/// A writer logging each encoded row, useful for debugging.
pub mod logger;

/// Newline-delimited JSON reader feeding raw lines to the encode stage.
pub mod lines;

/// In-memory reader over a list of items.
pub mod memory;

/// Writer sending encoded rows to any `io::Write` or file.
pub mod text_writer;
