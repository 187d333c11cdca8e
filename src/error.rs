use crate::domain::DigestResult;
use std::io;
use thiserror::Error;

/// Errors surfaced by digest computation.
#[derive(Error, Debug)]
pub enum DigestError {
    /// A caller-supplied argument cannot be used, e.g. an expected size of zero.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// The progress sink returned an error and the computation was aborted.
    #[error("progress callback failed: {0}")]
    Progress(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Stopped between two chunk reads. `partial` covers exactly the bytes read so far.
    #[error("computation cancelled after {} bytes", .partial.size())]
    Cancelled { partial: DigestResult },

    #[error("manifest error: {0}")]
    Manifest(String),
}

pub type Result<T> = std::result::Result<T, DigestError>;
