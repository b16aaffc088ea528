use std::cell::Cell;

use log::info;

use crate::core::item::{ItemWriter, ItemWriterResult};

/// Logs every encoded chunk at `info` level instead of writing it anywhere.
#[derive(Default)]
pub struct LoggerWriter {
    count: Cell<usize>,
}

impl LoggerWriter {
    pub fn count(&self) -> usize {
        self.count.get()
    }
}

impl ItemWriter<String> for LoggerWriter {
    fn write(&self, item: &String) -> ItemWriterResult {
        self.count.set(self.count.get() + 1);
        info!("Row {}: {}", self.count.get(), item.trim_end_matches(['\r', '\n']));
        Ok(())
    }
}
