//! Crate-specific error types for mmap-view.

use std::io;
use thiserror::Error;

/// Result alias for mmap-view operations.
pub type Result<T> = std::result::Result<T, MmapViewError>;

/// Error type covering every step of the mapping lifecycle.
///
/// Each failure aborts the operation that raised it and is reported to the
/// immediate caller; nothing is retried internally, and a failed open never
/// leaves a partially initialized view behind.
#[derive(Debug, Error)]
pub enum MmapViewError {
    /// The backing file could not be opened or created.
    #[error("file open failed: {0}")]
    FileOpen(#[source] io::Error),

    /// Size metadata could not be retrieved for an existing file.
    #[error("file stat failed: {0}")]
    FileStat(#[source] io::Error),

    /// The backing file could not be resized to the requested byte length.
    #[error("resize failed: {0}")]
    Resize(#[source] io::Error),

    /// The kernel declined to establish the mapping.
    #[error("mapping failed: {0}")]
    Mapping(#[source] io::Error),

    /// The access-pattern hint could not be applied.
    #[error("advise failed: {0}")]
    Advise(#[source] io::Error),

    /// Releasing the mapping failed during close.
    #[error("unmap failed: {0}")]
    Unmap(#[source] io::Error),
}
