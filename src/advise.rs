//! Access-pattern hints forwarded to the OS paging subsystem.

/// Expected access pattern for a mapped source.
///
/// Applied through `posix_madvise` when a source is opened (and on demand
/// via [`MmapSource::advise`](crate::MmapSource::advise)). The hint tunes
/// readahead only; it never changes what the mapping contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MmapAdvice {
    /// No particular access order (the kernel default).
    #[default]
    Normal,
    /// Accesses arrive in arbitrary order; readahead is wasted effort.
    Random,
    /// A front-to-back scan; aggressive readahead pays off.
    Sequential,
}

impl MmapAdvice {
    pub(crate) fn as_posix(self) -> libc::c_int {
        match self {
            MmapAdvice::Normal => libc::POSIX_MADV_NORMAL,
            MmapAdvice::Random => libc::POSIX_MADV_RANDOM,
            MmapAdvice::Sequential => libc::POSIX_MADV_SEQUENTIAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MmapSource;
    use std::fs;
    use std::path::PathBuf;

    fn tmp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("mmap_view_advise_test_{}_{}", name, std::process::id()));
        p
    }

    #[test]
    fn advice_maps_to_posix_constants() {
        assert_eq!(MmapAdvice::Normal.as_posix(), libc::POSIX_MADV_NORMAL);
        assert_eq!(MmapAdvice::Random.as_posix(), libc::POSIX_MADV_RANDOM);
        assert_eq!(
            MmapAdvice::Sequential.as_posix(),
            libc::POSIX_MADV_SEQUENTIAL
        );
    }

    #[test]
    fn every_advice_opens_and_reapplies() {
        let path = tmp_path("every_advice");
        fs::write(&path, [0u8; 4096]).expect("write fixture");

        for advice in [MmapAdvice::Normal, MmapAdvice::Random, MmapAdvice::Sequential] {
            let source = MmapSource::<u8>::open_with_advice(&path, advice).expect("open");
            source.advise(advice).expect("re-advise");
        }

        fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn advise_on_closed_source_is_a_no_op() {
        let source = MmapSource::<u8>::default();
        source.advise(MmapAdvice::Sequential).expect("closed advise");
    }
}
