use thiserror::Error;

/// Broken deck bookkeeping. These are programming errors, not runtime
/// conditions a caller should retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("item `{0}` is already in an outcome collection")]
    DuplicateOutcome(String),
    #[error("item `{0}` does not belong to the current deck")]
    UnknownItem(String),
}

/// Failure reading a bundled resource from disk.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("failed to read resource: {0}")]
    Io(String),
    #[error("failed to parse resource: {0}")]
    Parse(String),
}

impl DataError {
    pub(crate) fn io<E: std::fmt::Display>(err: E) -> Self {
        Self::Io(err.to_string())
    }

    pub(crate) fn parse<E: std::fmt::Display>(err: E) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Reads a whole file, mapping a missing file to [`DataError::NotFound`].
pub(crate) fn read_resource(path: &std::path::Path) -> Result<String, DataError> {
    std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            DataError::NotFound(path.display().to_string())
        } else {
            DataError::io(err)
        }
    })
}
