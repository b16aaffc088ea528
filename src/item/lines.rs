use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use log::debug;

use crate::{
    BuilderError,
    core::{
        item::{ItemReader, ItemReaderResult},
        stage::Payload,
    },
};

/// Reads newline-delimited JSON, one [`Payload::Bytes`] item per non-blank line.
///
/// Lines are not parsed here: decoding happens in the encode stage, so a
/// malformed line surfaces there as a malformed payload. `\r\n` endings are
/// accepted.
pub struct LinesItemReader<R> {
    reader: RefCell<BufReader<R>>,
    line: Cell<usize>,
}

impl<R: Read> LinesItemReader<R> {
    fn new(rdr: R, capacity: usize) -> Self {
        Self {
            reader: RefCell::new(BufReader::with_capacity(capacity, rdr)),
            line: Cell::new(0),
        }
    }

    /// Number of lines consumed so far, blank ones included.
    pub fn line_count(&self) -> usize {
        self.line.get()
    }
}

impl<R: Read> ItemReader<Payload> for LinesItemReader<R> {
    fn read(&self) -> ItemReaderResult<Payload> {
        let mut reader = self.reader.borrow_mut();

        loop {
            let mut buffer = Vec::new();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|error| BuilderError::ItemReader(error.to_string()))?;

            if read == 0 {
                return Ok(None);
            }
            self.line.set(self.line.get() + 1);

            while matches!(buffer.last(), Some(b'\n' | b'\r')) {
                buffer.pop();
            }
            if buffer.iter().all(u8::is_ascii_whitespace) {
                debug!("Skipping blank line {}", self.line_count());
                continue;
            }

            return Ok(Some(Payload::Bytes(buffer)));
        }
    }
}

pub struct LinesItemReaderBuilder {
    capacity: usize,
}

impl Default for LinesItemReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LinesItemReaderBuilder {
    pub fn new() -> LinesItemReaderBuilder {
        Self {
            capacity: 8 * 1024,
        }
    }

    pub fn capacity(mut self, capacity: usize) -> LinesItemReaderBuilder {
        self.capacity = capacity;
        self
    }

    pub fn from_reader<R: Read>(self, rdr: R) -> LinesItemReader<R> {
        LinesItemReader::new(rdr, self.capacity)
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<LinesItemReader<File>, BuilderError> {
        let file = File::open(path).map_err(|error| BuilderError::ItemReader(error.to_string()))?;
        Ok(LinesItemReader::new(file, self.capacity))
    }
}
