use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
///
/// Every failure a reader can surface is one of these variants, so callers
/// can tell a broken input stream from a broken restart state without
/// inspecting message strings.
pub enum BatchError {
    /// The reader was wired together with missing or invalid settings.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The input resource is absent or could not be opened.
    #[error("Cannot access input resource: {0}")]
    Resource(String),

    /// The underlying XML stream failed while scanning or extracting.
    #[error("Error while reading from XML stream: {0}")]
    StreamRead(String),

    /// The persisted item count does not match the fragments in the input.
    #[error("Restart count mismatch: {0}")]
    RestartMismatch(String),

    /// A fragment could not be converted into the target item type.
    #[error("Cannot map fragment: {0}")]
    Mapping(String),

    /// Lifecycle misuse, for example reading before `open` or after `close`.
    #[error("Reader is not usable: {0}")]
    IllegalState(String),
}
