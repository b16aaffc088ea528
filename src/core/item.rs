use crate::error::BuilderError;

/// Result of one pull on a producer: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<R> = Result<Option<R>, BuilderError>;

pub type ItemWriterResult = Result<(), BuilderError>;

/// Upstream producer of items, pulled one item at a time on demand.
pub trait ItemReader<R> {
    fn read(&self) -> ItemReaderResult<R>;
}

impl<R, T> ItemReader<R> for &T
where
    T: ItemReader<R> + ?Sized,
{
    fn read(&self) -> ItemReaderResult<R> {
        (**self).read()
    }
}

/// Downstream consumer of items.
///
/// An error from any method means the consumer no longer accepts input.
pub trait ItemWriter<W> {
    fn write(&self, item: &W) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
