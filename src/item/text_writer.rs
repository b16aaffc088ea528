use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    BuilderError,
    core::item::{ItemWriter, ItemWriterResult},
};

/// Writes encoded chunks, unchanged, to any [`Write`] sink.
pub struct TextItemWriter<W: Write> {
    stream: RefCell<BufWriter<W>>,
}

impl<W: Write> ItemWriter<String> for TextItemWriter<W> {
    fn write(&self, item: &String) -> ItemWriterResult {
        self.stream
            .borrow_mut()
            .write_all(item.as_bytes())
            .map_err(|error| BuilderError::ItemWriter(error.to_string()))
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.stream
            .borrow_mut()
            .flush()
            .map_err(|error| BuilderError::ItemWriter(error.to_string()))
    }
}

impl<W: Write> TextItemWriter<W> {
    pub fn into_inner(self) -> Result<W, BuilderError> {
        self.stream
            .into_inner()
            .into_inner()
            .map_err(|error| BuilderError::ItemWriter(error.to_string()))
    }
}

pub struct TextItemWriterBuilder {
    capacity: usize,
    append: bool,
}

impl Default for TextItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextItemWriterBuilder {
    pub fn new() -> TextItemWriterBuilder {
        TextItemWriterBuilder {
            capacity: 8 * 1024,
            append: false,
        }
    }

    /// Size of the internal buffer; `0` writes every chunk straight through.
    pub fn capacity(mut self, capacity: usize) -> TextItemWriterBuilder {
        self.capacity = capacity;
        self
    }

    /// Appends to an existing file instead of truncating it.
    pub fn append(mut self, yes: bool) -> TextItemWriterBuilder {
        self.append = yes;
        self
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<TextItemWriter<File>, BuilderError> {
        let file = File::options()
            .write(true)
            .create(true)
            .append(self.append)
            .truncate(!self.append)
            .open(path)
            .map_err(|error| BuilderError::ItemWriter(error.to_string()))?;

        Ok(self.from_writer(file))
    }

    /// Wraps any writer.
    ///
    /// ```
    /// # use std::error::Error;
    /// # use csv_builder_rs::{core::item::ItemWriter, item::text_writer::TextItemWriterBuilder};
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let wtr = TextItemWriterBuilder::new().from_writer(vec![]);
    ///
    ///     wtr.write(&"\"city\",\"pop\"\n".to_string())?;
    ///     wtr.write(&"\"Boston\",\"4628910\"\n".to_string())?;
    ///
    ///     let data = String::from_utf8(wtr.into_inner()?)?;
    ///     assert_eq!(data, "\"city\",\"pop\"\n\"Boston\",\"4628910\"\n");
    ///     Ok(())
    /// }
    /// ```
    pub fn from_writer<W: Write>(self, wtr: W) -> TextItemWriter<W> {
        TextItemWriter {
            stream: RefCell::new(BufWriter::with_capacity(self.capacity, wtr)),
        }
    }
}
