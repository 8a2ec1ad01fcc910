//! Element-size boundaries: byte lengths that are not a whole number of
//! elements, and element types wider than the file.

use mmap_view::MmapSource;
use std::fs;
use tempfile::tempdir;

#[test]
fn trailing_partial_element_is_unreachable() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("partial.bin");

    // Two whole u32 values plus two stray bytes.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&10u32.to_ne_bytes());
    bytes.extend_from_slice(&20u32.to_ne_bytes());
    bytes.extend_from_slice(&[0xAA, 0xBB]);
    fs::write(&path, &bytes).expect("write fixture");

    let source = MmapSource::<u32>::open(&path).expect("open");
    assert_eq!(source.bytes(), 10);
    assert_eq!(source.len(), 2);
    assert_eq!(source.as_slice(), &[10, 20]);

    #[cfg(feature = "iterator")]
    {
        let visited: Vec<u32> = source.iter().collect();
        assert_eq!(visited, vec![10, 20]);
    }
}

#[test]
fn byte_elements_see_the_whole_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bytes.bin");
    fs::write(&path, [1u8, 2, 3, 4, 5, 6, 7]).expect("write fixture");

    let source = MmapSource::<u8>::open(&path).expect("open");
    assert_eq!(source.bytes(), 7);
    assert_eq!(source.len(), 7);
    assert_eq!(source.as_slice(), &[1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn element_wider_than_the_file_yields_nothing() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("narrow.bin");
    fs::write(&path, [9u8, 9, 9]).expect("write fixture");

    let source = MmapSource::<u32>::open(&path).expect("open");
    assert_eq!(source.bytes(), 3);
    assert_eq!(source.len(), 0);
    assert!(source.is_empty());
    assert!(source.as_slice().is_empty());

    #[cfg(feature = "iterator")]
    assert_eq!(source.iter().count(), 0);
}

#[test]
#[cfg(feature = "advise")]
fn every_advice_variant_opens() {
    use mmap_view::MmapAdvice;

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("advised.bin");
    fs::write(&path, [0u8; 8192]).expect("write fixture");

    for advice in [MmapAdvice::Normal, MmapAdvice::Random, MmapAdvice::Sequential] {
        let source = MmapSource::<u64>::open_with_advice(&path, advice).expect("open");
        assert_eq!(source.len(), 1024);
    }
}
