use grid::tooling::cli::{ExplorerCommand, ExplorerContext};
use grid::ApiError;

use crate::integration::support::scenario_image;

fn run(context: &mut ExplorerContext, command: ExplorerCommand) -> (Result<(), ApiError>, Vec<u8>) {
    let mut out = Vec::new();
    let result = context.execute(&command, &mut out);
    (result, out)
}

fn ls(path: &str) -> ExplorerCommand {
    ExplorerCommand::Ls {
        path: path.to_string(),
        format: "text".to_string(),
    }
}

fn cat(path: &str) -> ExplorerCommand {
    ExplorerCommand::Cat {
        path: path.to_string(),
    }
}

#[test]
fn ls_root_lists_directories_then_files() {
    let (_temp, image) = scenario_image();
    let mut context = ExplorerContext::open(&image).unwrap();

    let (result, out) = run(&mut context, ls(""));
    result.unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "\t'/':\nsub\na.txt\n\n");

    let (result, out) = run(&mut context, ls("/"));
    result.unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "\t'/':\nsub\na.txt\n\n");
}

#[test]
fn ls_subdirectory_lists_its_files() {
    let (_temp, image) = scenario_image();
    let mut context = ExplorerContext::open(&image).unwrap();

    let (result, out) = run(&mut context, ls("/sub"));
    result.unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "\t'/sub':\nb.txt\n\n");
}

#[test]
fn cat_emits_exact_bytes() {
    let (_temp, image) = scenario_image();
    let mut context = ExplorerContext::open(&image).unwrap();

    let (result, out) = run(&mut context, cat("/a.txt"));
    result.unwrap();
    assert_eq!(out, b"hello");

    let (result, out) = run(&mut context, cat("/sub/b.txt"));
    result.unwrap();
    assert_eq!(out, b"bye");
}

#[test]
fn misses_emit_nothing() {
    let (_temp, image) = scenario_image();
    let mut context = ExplorerContext::open(&image).unwrap();

    for command in [cat("/missing"), cat("/sub"), cat(""), ls("/a.txt"), ls("/nope")] {
        let (result, out) = run(&mut context, command.clone());
        assert!(result.is_err(), "{command:?} should fail");
        assert!(out.is_empty(), "{command:?} should emit nothing");
    }
}

#[test]
fn ls_json_and_info_outputs_parse() {
    let (_temp, image) = scenario_image();
    let mut context = ExplorerContext::open(&image).unwrap();

    let (result, out) = run(
        &mut context,
        ExplorerCommand::Ls {
            path: "/".to_string(),
            format: "json".to_string(),
        },
    );
    result.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed["directories"], serde_json::json!(["sub"]));
    assert_eq!(parsed["files"][0]["name"], "a.txt");

    let (result, out) = run(
        &mut context,
        ExplorerCommand::Info {
            format: "json".to_string(),
        },
    );
    result.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed["files"], 2);
    assert_eq!(parsed["directories"], 1);
    assert_eq!(parsed["table_size"], 59);

    let (result, _) = run(
        &mut context,
        ExplorerCommand::Info {
            format: "xml".to_string(),
        },
    );
    assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
}
