use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DialError {
    /// Upload or download rejected by the bucket service.
    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    /// Transport, authentication or backend-reported failure of a completion call.
    #[error("Invocation failed: {0}")]
    Invocation(String),

    #[error("Local I/O failure on {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Some attachments of a batch could not be written. Files in `written` stay on disk.
    #[error(
        "Failed to materialize {} of {} attachment(s)",
        .failures.len(),
        .failures.len() + .written.len()
    )]
    Materialization {
        written: Vec<PathBuf>,
        failures: Vec<AttachmentFailure>,
    },
}

impl DialError {
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DialError::LocalIo {
            path: path.into(),
            source,
        }
    }
}

/// A single attachment that failed during materialization, by its position in the batch.
#[derive(Debug)]
pub struct AttachmentFailure {
    pub index: usize,
    pub error: Box<DialError>,
}

impl fmt::Display for AttachmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attachment {}: {}", self.index, self.error)
    }
}

pub type DialResult<T> = Result<T, DialError>;
