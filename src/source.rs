//! Read-only typed view over an existing memory-mapped file.

use std::fmt;
use std::fs::File;
use std::marker::PhantomData;
use std::mem;
use std::path::{Path, PathBuf};
use std::slice;

use bytemuck::Pod;

#[cfg(feature = "advise")]
use crate::advise::MmapAdvice;
use crate::errors::{MmapViewError, Result};
use crate::raw::{Prot, RawMapping};
use crate::utils::element_count;

/// Everything an open view owns. Held in one `Option` so the view is
/// either fully open or fully closed, never in between.
struct Open {
    map: RawMapping,
    file: File,
    path: PathBuf,
}

/// Read-only view of an existing file, mapped into memory and exposed as a
/// flat sequence of `T` elements.
///
/// The file's bytes are interpreted as the host, in-memory representation
/// of `T` — no header, padding, or endianness handling. If the file's byte
/// length is not a multiple of `size_of::<T>()`, the trailing partial
/// element stays mapped but is unreachable through typed access.
///
/// The view exclusively owns its descriptor and mapping; both are released
/// together when the view is closed or dropped, unmap first.
///
/// # Examples
///
/// ```no_run
/// use mmap_view::MmapSource;
///
/// let source = MmapSource::<u32>::open("values.bin")?;
/// assert_eq!(source.len(), source.bytes() / 4);
/// let first = source.as_slice().first().copied();
/// # Ok::<(), mmap_view::MmapViewError>(())
/// ```
pub struct MmapSource<T> {
    inner: Option<Open>,
    _elem: PhantomData<T>,
}

// SAFETY: the view exclusively owns its descriptor and mapping, and typed
// access only ever copies elements out of the region.
unsafe impl<T: Send> Send for MmapSource<T> {}
// SAFETY: shared references expose read-only access.
unsafe impl<T: Sync> Sync for MmapSource<T> {}

impl<T: Pod> MmapSource<T> {
    /// Open `path` read-only, map its full current length, and apply the
    /// `Normal` access hint.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::FileOpen` if the path cannot be opened,
    /// `MmapViewError::FileStat` if its size cannot be retrieved,
    /// `MmapViewError::Mapping` if the mapping request fails, and
    /// `MmapViewError::Advise` if the hint cannot be applied. On any
    /// failure no view is produced and the descriptor and mapping are
    /// released.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = Self::map_path(path.as_ref())?;
        #[cfg(feature = "advise")]
        source.advise(MmapAdvice::Normal)?;
        Ok(source)
    }

    /// Open `path` read-only with an explicit access-pattern hint.
    ///
    /// # Errors
    ///
    /// Same contract as [`open`](Self::open).
    #[cfg(feature = "advise")]
    pub fn open_with_advice<P: AsRef<Path>>(path: P, advice: MmapAdvice) -> Result<Self> {
        let source = Self::map_path(path.as_ref())?;
        source.advise(advice)?;
        Ok(source)
    }

    fn map_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(MmapViewError::FileOpen)?;
        let len = file.metadata().map_err(MmapViewError::FileStat)?.len();
        let map = RawMapping::map(&file, len, Prot::Read)?;
        log::debug!("mapped {} read-only, {} bytes", path.display(), map.len());
        Ok(Self {
            inner: Some(Open {
                map,
                file,
                path: path.to_path_buf(),
            }),
            _elem: PhantomData,
        })
    }

    /// Re-apply an access-pattern hint to the open mapping. No effect on a
    /// closed view.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::Advise` when the kernel rejects the hint.
    #[cfg(feature = "advise")]
    pub fn advise(&self, advice: MmapAdvice) -> Result<()> {
        match &self.inner {
            Some(open) => open.map.advise(advice),
            None => Ok(()),
        }
    }

    /// Number of whole `T` elements in the mapping, truncating toward
    /// zero. 0 when closed.
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
}

impl<T> MmapSource<T> {
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

impl<T> Default for MmapSource<T> {
    /// A closed, inert view.
    fn default() -> Self {
        Self {
            inner: None,
            _elem: PhantomData,
        }
    }
}

impl<T> Drop for MmapSource<T> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("close during drop failed: {err}");
        }
    }
}

impl<T> fmt::Debug for MmapSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmapSource")
            .field("path", &self.path())
            .field("bytes", &self.bytes())
            .field("open", &self.is_open())
            .finish()
    }
}
