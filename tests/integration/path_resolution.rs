use grid::ImagePath;
use tempfile::TempDir;

use crate::integration::support::{build_bytes, open_bytes, scenario_tree};

#[test]
fn every_file_offset_reads_back_its_content() {
    let temp = TempDir::new().unwrap();
    scenario_tree(temp.path());
    let mut image = open_bytes(build_bytes(temp.path()));

    for (path, content) in [("/a.txt", &b"hello"[..]), ("/sub/b.txt", &b"bye"[..])] {
        let path = ImagePath::parse(path);
        let offset = image.find_file(&path).expect("file should resolve");
        assert!(offset >= image.payload_offset());
        assert_eq!(image.read_at(offset).unwrap(), content);
    }
}

#[test]
fn missing_paths_are_not_found() {
    let temp = TempDir::new().unwrap();
    scenario_tree(temp.path());
    let mut image = open_bytes(build_bytes(temp.path()));

    for missing in ["/nope", "/sub/nope", "/nope/b.txt", "/a.txt/inner", "", "/"] {
        let path = ImagePath::parse(missing);
        assert!(!image.exists(&path), "{missing:?} should not exist");
        assert_eq!(image.find_file(&path), None);
        assert_eq!(image.read(&path).unwrap(), None);
    }
}

#[test]
fn kind_queries_distinguish_files_and_directories() {
    let temp = TempDir::new().unwrap();
    scenario_tree(temp.path());
    let image = open_bytes(build_bytes(temp.path()));

    assert!(image.is_directory(&ImagePath::parse("/sub")));
    assert!(!image.is_regular_file(&ImagePath::parse("/sub")));
    assert!(image.is_regular_file(&ImagePath::parse("/sub/b.txt")));
    assert!(!image.is_directory(&ImagePath::parse("/sub/b.txt")));
    assert_eq!(image.find_file(&ImagePath::parse("/sub")), None);
}

#[test]
fn detached_subtree_resolves_relative_paths() {
    let temp = TempDir::new().unwrap();
    scenario_tree(temp.path());
    let mut image = open_bytes(build_bytes(temp.path()));

    let sub = image.find_directory(&ImagePath::parse("/sub")).unwrap();
    let offset = sub.find_file(&ImagePath::parse("b.txt")).unwrap();
    assert_eq!(Some(offset), image.find_file(&ImagePath::parse("/sub/b.txt")));
    assert_eq!(image.read_at(offset).unwrap(), b"bye");
    assert!(!sub.exists(&ImagePath::parse("a.txt")));
}
