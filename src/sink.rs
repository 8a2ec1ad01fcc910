//! Writable typed view backed by a newly created memory-mapped file.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::marker::PhantomData;
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::slice;

use bytemuck::Pod;

use crate::errors::{MmapViewError, Result};
use crate::raw::{Prot, RawMapping};
use crate::utils::{byte_len, element_count};

/// Everything an open view owns. Held in one `Option` so the view is
/// either fully open or fully closed, never in between.
struct Open {
    map: RawMapping,
    file: File,
    path: PathBuf,
}

/// Read-write view over a freshly created file, mapped into memory and
/// exposed as a flat, mutable sequence of `T` elements.
///
/// Creating a sink always recreates the backing file: an existing file at
/// the same path is truncated and its previous contents are lost. The file
/// is sized to exactly `element_count * size_of::<T>()` bytes and starts
/// zero-filled.
///
/// The mapping is shared, so writes become visible to other mappers of the
/// same file; no sync to disk is forced at any point, including close —
/// durability policy belongs to the caller.
///
/// # Examples
///
/// ```no_run
/// use mmap_view::MmapSink;
///
/// let mut sink = MmapSink::<u64>::create("table.bin", 1024)?;
/// sink.as_mut_slice()[0] = 7;
/// sink.close()?;
/// # Ok::<(), mmap_view::MmapViewError>(())
/// ```
pub struct MmapSink<T> {
    inner: Option<Open>,
    _elem: PhantomData<T>,
}

// SAFETY: the view exclusively owns its descriptor and mapping; mutation
// requires `&mut self`.
unsafe impl<T: Send> Send for MmapSink<T> {}
// SAFETY: shared references expose read-only access.
unsafe impl<T: Sync> Sync for MmapSink<T> {}

impl<T: Pod> MmapSink<T> {
    /// Create (or truncate) `path` with owner-only permission, size it to
    /// exactly `len * size_of::<T>()` bytes, and map it read-write.
    ///
    /// The new region reads back as zeroes until written. No access hint
    /// is applied on the write path.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::FileOpen` if the file cannot be created or
    /// opened, `MmapViewError::Resize` if the byte length overflows or the
    /// resize fails, and `MmapViewError::Mapping` if the mapping request
    /// fails (a zero-element sink always does). On any failure no view is
    /// produced.
    pub fn create<P: AsRef<Path>>(path: P, len: usize) -> Result<Self> {
        let path = path.as_ref();
        let byte_len = byte_len::<T>(len)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(MmapViewError::FileOpen)?;
        file.set_len(byte_len as u64)
            .map_err(MmapViewError::Resize)?;
        let map = RawMapping::map(&file, byte_len as u64, Prot::ReadWrite)?;
        log::debug!("mapped {} read-write, {} bytes", path.display(), map.len());
        Ok(Self {
            inner: Some(Open {
                map,
                file,
                path: path.to_path_buf(),
            }),
            _elem: PhantomData,
        })
    }

    /// Number of `T` elements in the mapping. 0 when closed.
    #[must_use]
    pub fn len(&self) -> usize {
        element_count::<T>(self.bytes())
    }

    /// Whether the view holds no accessible elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mapped elements as a read-only slice. Empty when closed.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match &self.inner {
            Some(open) => {
                let ptr = open.map.as_ptr().cast::<T>();
                debug_assert_eq!(ptr as usize % mem::align_of::<T>(), 0);
                // SAFETY: the mapping holds at least len() * size_of::<T>()
                // live bytes, T is Pod, and mmap bases are page-aligned.
                unsafe { slice::from_raw_parts(ptr, self.len()) }
            }
            None => &[],
        }
    }

    /// The mapped elements as a mutable slice. Empty when closed.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &self.inner {
            Some(open) => {
                let ptr = open.map.as_ptr().cast::<T>();
                debug_assert_eq!(ptr as usize % mem::align_of::<T>(), 0);
                let len = element_count::<T>(open.map.len());
                // SAFETY: as for as_slice, plus the region is mapped
                // read-write and `&mut self` makes this the only live
                // borrow of it.
                unsafe { slice::from_raw_parts_mut(ptr, len) }
            }
            None => &mut [],
        }
    }
}

impl<T> MmapSink<T> {
    /// Whether the view currently owns a mapping.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Total mapped size in bytes. 0 when closed.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.inner.as_ref().map_or(0, |open| open.map.len())
    }

    /// Path of the backing file while the view is open.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.as_ref().map(|open| open.path.as_path())
    }

    /// Unmap the region and release the descriptor, leaving the view
    /// closed. A no-op on an already-closed view.
    ///
    /// Writes made through the mapping stay visible to other openers of
    /// the file; no sync to disk is forced here.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::Unmap` if `munmap` fails. The descriptor is
    /// released and the view resets to closed even then, so a retried
    /// close is a safe no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(open) = self.inner.take() else {
            return Ok(());
        };
        log::debug!("unmapping {}", open.path.display());
        let unmapped = open.map.unmap();
        drop(open.file);
        unmapped
    }
}

impl<T> Default for MmapSink<T> {
    /// A closed, inert view.
    fn default() -> Self {
        Self {
            inner: None,
            _elem: PhantomData,
        }
    }
}

impl<T> Drop for MmapSink<T> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("close during drop failed: {err}");
        }
    }
}

impl<T> fmt::Debug for MmapSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmapSink")
            .field("path", &self.path())
            .field("bytes", &self.bytes())
            .field("open", &self.is_open())
            .finish()
    }
}
