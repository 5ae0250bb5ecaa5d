use std::fs;
use std::io::Cursor;

use grid::image::Image;
use grid::{ImageError, ImagePath};
use tempfile::TempDir;

use crate::integration::support::{build_bytes, scenario_tree};

fn scenario_bytes() -> Vec<u8> {
    let temp = TempDir::new().unwrap();
    scenario_tree(temp.path());
    build_bytes(temp.path())
}

fn table_size(bytes: &[u8]) -> usize {
    u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize
}

#[test]
fn images_shorter_than_header_are_rejected() {
    let bytes = scenario_bytes();
    for len in 0..8 {
        let result = Image::from_reader(Cursor::new(bytes[..len].to_vec()));
        assert!(
            matches!(result, Err(ImageError::Corrupted(_))),
            "length {len} should be rejected"
        );
    }
}

#[test]
fn images_shorter_than_declared_index_are_rejected() {
    let bytes = scenario_bytes();
    let index_end = 8 + table_size(&bytes);
    for len in [8, index_end / 2, index_end - 1] {
        let result = Image::from_reader(Cursor::new(bytes[..len].to_vec()));
        assert!(
            matches!(result, Err(ImageError::Corrupted(_))),
            "length {len} should be rejected"
        );
    }
}

#[test]
fn truncated_payload_region_fails_only_the_read() {
    let bytes = scenario_bytes();
    let index_end = 8 + table_size(&bytes);

    let mut image = Image::from_reader(Cursor::new(bytes[..index_end].to_vec())).unwrap();
    assert!(image.exists(&ImagePath::parse("/a.txt")));
    assert!(matches!(
        image.read(&ImagePath::parse("/a.txt")),
        Err(ImageError::TruncatedPayload { .. })
    ));
}

#[test]
fn truncated_image_file_fails_to_open() {
    let temp = TempDir::new().unwrap();
    let bytes = scenario_bytes();
    let path = temp.path().join("short.grid");
    fs::write(&path, &bytes[..5]).unwrap();

    assert!(matches!(Image::open(&path), Err(ImageError::Corrupted(_))));
    assert!(matches!(
        Image::open(temp.path().join("absent.grid")),
        Err(ImageError::Open { .. })
    ));
}
