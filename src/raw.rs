//! Shared POSIX mapping primitive backing both typed views.
//!
//! `RawMapping` owns exactly one `mmap` region and is the only place in the
//! crate that talks to the mapping syscalls. The views layer descriptor
//! ownership and typed access on top of it.

use std::fs::File;
use std::io;
use std::mem::ManuallyDrop;
use std::os::unix::io::AsRawFd;
use std::ptr::{self, NonNull};

#[cfg(feature = "advise")]
use crate::advise::MmapAdvice;
use crate::errors::{MmapViewError, Result};

/// Protection requested for a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prot {
    Read,
    ReadWrite,
}

impl Prot {
    fn as_flags(self) -> libc::c_int {
        match self {
            Prot::Read => libc::PROT_READ,
            Prot::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        }
    }
}

/// An owned, always-shared `mmap` region.
///
/// Dropping the mapping unmaps it; callers that need to observe an unmap
/// failure use [`RawMapping::unmap`] instead.
pub(crate) struct RawMapping {
    ptr: NonNull<libc::c_void>,
    len: usize,
}

impl RawMapping {
    /// Map `len` bytes of `file` from offset zero as a shared mapping.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::Mapping` when the length does not fit the
    /// address space or the kernel declines the mapping (zero-length
    /// requests included).
    pub(crate) fn map(file: &File, len: u64, prot: Prot) -> Result<Self> {
        let len = usize::try_from(len).map_err(|_| {
            MmapViewError::Mapping(io::Error::new(
                io::ErrorKind::InvalidInput,
                "file length exceeds the address space",
            ))
        })?;

        // SAFETY: the descriptor is open with at least the requested
        // protection and the kernel validates `len` against it. MAP_SHARED
        // keeps writes visible to every mapper of the same file.
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                prot.as_flags(),
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(MmapViewError::Mapping(io::Error::last_os_error()));
        }

        // SAFETY: a successful mmap never returns a null address.
        let ptr = unsafe { NonNull::new_unchecked(ptr) };
        Ok(Self { ptr, len })
    }

    /// Base address of the mapped region.
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr().cast()
    }

    /// Size of the mapped region in bytes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Forward an access-pattern hint to the paging subsystem, covering
    /// the whole mapped region.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::Advise` when the kernel rejects the hint.
    #[cfg(feature = "advise")]
    pub(crate) fn advise(&self, advice: MmapAdvice) -> Result<()> {
        // posix_madvise reports the error number in its return value
        // rather than through errno.
        let rc = unsafe { libc::posix_madvise(self.ptr.as_ptr(), self.len, advice.as_posix()) };
        if rc != 0 {
            return Err(MmapViewError::Advise(io::Error::from_raw_os_error(rc)));
        }
        Ok(())
    }

    /// Release the mapping, reporting a failed `munmap` to the caller.
    pub(crate) fn unmap(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `ptr`/`len` describe a live mapping owned by `this`;
        // ManuallyDrop keeps Drop from unmapping it a second time.
        let rc = unsafe { libc::munmap(this.ptr.as_ptr(), this.len) };
        if rc != 0 {
            return Err(MmapViewError::Unmap(io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl Drop for RawMapping {
    fn drop(&mut self) {
        // SAFETY: the same region handed out by mmap in `map`.
        let rc = unsafe { libc::munmap(self.ptr.as_ptr(), self.len) };
        if rc != 0 {
            log::warn!("munmap failed during drop: {}", io::Error::last_os_error());
        }
    }
}
