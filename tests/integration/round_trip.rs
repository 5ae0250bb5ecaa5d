use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use grid::ImagePath;
use proptest::prelude::*;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::integration::support::{build_bytes, open_bytes};

type Entry = (Vec<String>, Vec<u8>);

/// Write each entry as a file, skipping ones that clash with an existing
/// file or directory. Returns the files that ended up on disk.
fn materialize(root: &Path, entries: &[Entry]) -> BTreeMap<String, Vec<u8>> {
    let mut written = BTreeMap::new();
    for (segments, content) in entries {
        let relative = segments.join("/");
        let target = root.join(&relative);
        if target.is_dir() {
            continue;
        }
        if let Some(parent) = target.parent() {
            if fs::create_dir_all(parent).is_err() {
                continue;
            }
        }
        if fs::write(&target, content).is_ok() {
            written.insert(format!("/{relative}"), content.clone());
        }
    }
    written
}

fn directories_on_disk(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap();
            format!("/{}", relative.to_string_lossy())
        })
        .collect()
}

fn entries() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(
        (
            prop::collection::vec("[a-z]{1,6}(\\.[a-z]{1,3})?", 1..4),
            prop::collection::vec(any::<u8>(), 0..600),
        ),
        0..16,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn build_then_decode_reproduces_tree(entries in entries()) {
        let temp = TempDir::new().unwrap();
        let files = materialize(temp.path(), &entries);
        let dirs = directories_on_disk(temp.path());

        let mut image = open_bytes(build_bytes(temp.path()));

        let decoded: BTreeSet<String> = image
            .root()
            .files()
            .into_iter()
            .map(|(path, _)| path.string(false))
            .collect();
        let expected: BTreeSet<String> = files.keys().cloned().collect();
        prop_assert_eq!(decoded, expected);

        for (path, content) in &files {
            let read = image.read(&ImagePath::parse(path)).unwrap();
            prop_assert_eq!(read.as_ref(), Some(content));
        }
        for dir in &dirs {
            prop_assert!(image.is_directory(&ImagePath::parse(dir)), "missing directory {}", dir);
        }
        let (dir_count, file_count) = image.root().count_entries();
        prop_assert_eq!(dir_count as usize, dirs.len());
        prop_assert_eq!(file_count as usize, files.len());
    }
}

#[test]
fn large_and_empty_files_survive_round_trip() {
    let temp = TempDir::new().unwrap();
    let big: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    fs::create_dir_all(temp.path().join("deep/er/still")).unwrap();
    fs::write(temp.path().join("deep/er/still/big.bin"), &big).unwrap();
    fs::write(temp.path().join("empty"), b"").unwrap();
    fs::create_dir_all(temp.path().join("hollow")).unwrap();

    let mut image = open_bytes(build_bytes(temp.path()));
    assert_eq!(
        image.read(&ImagePath::parse("/deep/er/still/big.bin")).unwrap(),
        Some(big)
    );
    assert_eq!(image.read(&ImagePath::parse("/empty")).unwrap(), Some(Vec::new()));
    assert!(image.find_directory(&ImagePath::parse("/hollow")).unwrap().is_empty());
}

#[test]
fn deep_nesting_round_trips() {
    let temp = TempDir::new().unwrap();
    let mut path = temp.path().to_path_buf();
    let mut image_path = ImagePath::new();
    for depth in 0..64 {
        let name = format!("d{depth}");
        path.push(&name);
        image_path.push(name);
    }
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("leaf"), "bottom").unwrap();
    image_path.push("leaf");

    let mut image = open_bytes(build_bytes(temp.path()));
    assert_eq!(image.read(&image_path).unwrap(), Some(b"bottom".to_vec()));
}
