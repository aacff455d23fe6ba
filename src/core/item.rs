use crate::error::BatchError;

/// Result of a single read attempt.
///
/// - `Ok(Some(item))`: the next item was produced.
/// - `Ok(None)`: end of input, no more items will follow.
/// - `Err(error)`: a fatal read failure; see [`BatchError`].
pub type ItemReaderResult<T> = Result<Option<T>, BatchError>;

/// An abstraction for retrieving input, one item at a time.
///
/// Readers take `&self` and use interior mutability, so one reader instance
/// can be shared by reference with the surrounding step machinery while it
/// advances through its input.
pub trait ItemReader<T> {
    /// Reads the next item, or `Ok(None)` once the input is exhausted.
    fn read(&self) -> ItemReaderResult<T>;
}

/// An [`ItemReader`] bound to an external resource with an explicit
/// lifecycle.
///
/// The host opens the reader once per execution attempt, reads until the
/// end-of-input sentinel, and closes it exactly once, even when opening or
/// reading failed.
pub trait ItemStreamReader<T>: ItemReader<T> {
    /// Acquires the underlying resource and prepares for reading.
    ///
    /// `already_read` is the number of items fully processed by previous
    /// execution attempts, as persisted by the host. When it is greater than
    /// zero the reader advances past that many items before the first
    /// [`read`](ItemReader::read) call returns anything.
    fn open(&self, already_read: usize) -> Result<(), BatchError>;

    /// Releases the underlying resource. Idempotent; legal in every state.
    fn close(&self) -> Result<(), BatchError>;
}
