use std::fs;
use std::io::Cursor;

use grid::codec::{write_entry, write_u64, EntryKind, NAME_SCAN_CHUNK};
use grid::{Image, ImagePath};
use tempfile::TempDir;

use crate::integration::support::{build_bytes, open_bytes};

#[test]
fn names_around_scan_chunk_size_decode_identically() {
    assert_eq!(NAME_SCAN_CHUNK, 64);
    let temp = TempDir::new().unwrap();
    let lengths = [1usize, 62, 63, 64, 65, 127, 128, 129];
    for len in lengths {
        let name = format!("{}", char::from(b'a' + (len % 26) as u8)).repeat(len);
        fs::write(temp.path().join(&name), format!("len={len}")).unwrap();
        fs::create_dir(temp.path().join(format!("{name}_d"))).unwrap();
    }

    let mut image = open_bytes(build_bytes(temp.path()));
    for len in lengths {
        let name = format!("{}", char::from(b'a' + (len % 26) as u8)).repeat(len);
        let content = image.read(&ImagePath::parse(&name)).unwrap();
        assert_eq!(content, Some(format!("len={len}").into_bytes()), "name length {len}");
        assert!(image.is_directory(&ImagePath::parse(&format!("{name}_d"))));
    }
}

#[test]
fn synthetic_names_ending_on_chunk_boundary() {
    // entries packed back to back so later names start mid-chunk
    let names: Vec<String> = [63usize, 64, 65, 1, 63]
        .iter()
        .enumerate()
        .map(|(i, len)| format!("{i}{}", "x".repeat(len - 1)))
        .collect();

    let table_size: u64 = 8 + names.iter().map(|n| 1 + n.len() as u64 + 1 + 8).sum::<u64>();
    let mut bytes = Vec::new();
    write_u64(&mut bytes, table_size).unwrap();
    write_u64(&mut bytes, names.len() as u64).unwrap();
    for (i, name) in names.iter().enumerate() {
        write_entry(&mut bytes, EntryKind::File, name, 1000 + i as u64).unwrap();
    }

    let image = Image::from_reader(Cursor::new(bytes)).unwrap();
    assert_eq!(image.root().len(), names.len());
    for (i, name) in names.iter().enumerate() {
        assert_eq!(
            image.find_file(&ImagePath::parse(name)),
            Some(1000 + i as u64),
            "name {name:?}"
        );
    }
}
