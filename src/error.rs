use thiserror::Error;

/// The error taxonomy surfaced by the decode pipeline.
///
/// Any error aborts the current [`crate::read_map`] call; all intermediate
/// allocations are released as the error unwinds (ordinary `Drop`), and no
/// `Map` is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying byte source failed or ended prematurely.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A wire-format violation: bad varint, wire type out of range, length
    /// overrun, embedded message length mismatch, unsupported compression,
    /// or a required field missing.
    #[error("malformed pbf stream: {0}")]
    Malformed(String),

    /// zlib reported a non-success status while inflating a blob.
    #[error("zlib decompression failed: {0}")]
    Decompress(String),

    /// An allocation failed.
    #[error("allocation failed")]
    Oom,
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::Malformed(msg.into())
    }

    pub(crate) fn decompress(msg: impl Into<String>) -> Self {
        Error::Decompress(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
