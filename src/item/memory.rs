use std::{cell::RefCell, collections::VecDeque};

use crate::core::item::{ItemReader, ItemReaderResult};

/// Producer backed by an in-memory list, handing items out in order.
///
/// # Examples
///
/// ```
/// use csv_builder_rs::core::item::ItemReader;
/// use csv_builder_rs::item::memory::VecItemReader;
///
/// let reader = VecItemReader::new(vec!["a", "b"]);
/// assert_eq!(reader.read().unwrap(), Some("a"));
/// assert_eq!(reader.remaining(), 1);
/// assert_eq!(reader.read().unwrap(), Some("b"));
/// assert_eq!(reader.read().unwrap(), None);
/// ```
pub struct VecItemReader<T> {
    items: RefCell<VecDeque<T>>,
}

impl<T> VecItemReader<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(VecDeque::from(items)),
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.borrow().len()
    }
}

impl<T> From<Vec<T>> for VecItemReader<T> {
    fn from(items: Vec<T>) -> Self {
        VecItemReader::new(items)
    }
}

impl<T> ItemReader<T> for VecItemReader<T> {
    fn read(&self) -> ItemReaderResult<T> {
        Ok(self.items.borrow_mut().pop_front())
    }
}
