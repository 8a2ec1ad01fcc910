//! Helpers translating between byte lengths and typed element counts.

use std::io;
use std::mem;

use crate::errors::{MmapViewError, Result};

/// Number of whole `T` elements contained in `bytes`, truncating toward
/// zero. A trailing partial element stays mapped but is never reachable
/// through typed access.
#[must_use]
pub(crate) fn element_count<T>(bytes: usize) -> usize {
    let size = mem::size_of::<T>();
    if size == 0 {
        // Zero-sized elements occupy no mapped bytes; expose none.
        return 0;
    }
    bytes / size
}

/// Byte length backing `count` elements of `T`.
///
/// # Errors
///
/// Returns `MmapViewError::Resize` when the product overflows `usize`.
pub(crate) fn byte_len<T>(count: usize) -> Result<usize> {
    count.checked_mul(mem::size_of::<T>()).ok_or_else(|| {
        MmapViewError::Resize(io::Error::new(
            io::ErrorKind::InvalidInput,
            "element count overflows the mappable byte length",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_count_truncates_toward_zero() {
        assert_eq!(element_count::<u32>(0), 0);
        assert_eq!(element_count::<u32>(3), 0);
        assert_eq!(element_count::<u32>(4), 1);
        assert_eq!(element_count::<u32>(10), 2);
        assert_eq!(element_count::<u8>(10), 10);
    }

    #[test]
    fn element_count_of_zero_sized_type_is_zero() {
        assert_eq!(element_count::<()>(4096), 0);
    }

    #[test]
    fn byte_len_multiplies_exactly() {
        assert_eq!(byte_len::<u32>(4).expect("fits"), 16);
        assert_eq!(byte_len::<u8>(10).expect("fits"), 10);
        assert_eq!(byte_len::<u64>(0).expect("fits"), 0);
    }

    #[test]
    fn byte_len_overflow_is_a_resize_error() {
        let err = byte_len::<u64>(usize::MAX).expect_err("overflow");
        assert!(matches!(err, MmapViewError::Resize(_)));
    }
}
