//! Integration tests for merging course files.

mod common;

use common::{read_marks, write_marked_pdf};
use lectsave::{merge, merge_files, remerge_course, MergeOutcome, OutputLayout};

#[test]
fn test_merge_in_given_order() {
    let tmp = tempfile::tempdir().unwrap();
    let inputs: Vec<_> = [5, 3, 4]
        .iter()
        .map(|mark| {
            let path = tmp.path().join(format!("part{}.pdf", mark));
            write_marked_pdf(&path, *mark).unwrap();
            path
        })
        .collect();
    let output = tmp.path().join("all.pdf");

    let outcome = merge(&inputs, &output);

    assert_eq!(outcome, MergeOutcome::Merged { inputs: 3, pages: 3 });
    assert_eq!(read_marks(&output), vec![5, 3, 4]);
}

#[test]
fn test_merge_replaces_previous_output() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("one.pdf");
    write_marked_pdf(&input, 7).unwrap();
    let output = tmp.path().join("all.pdf");
    std::fs::write(&output, b"stale").unwrap();

    assert!(merge_files(&[&input], &output).is_written());
    assert_eq!(read_marks(&output), vec![7]);
}

#[test]
fn test_merge_missing_input_fails_without_output() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("all.pdf");

    let outcome = merge(&[tmp.path().join("missing.pdf")], &output);

    assert!(matches!(outcome, MergeOutcome::Failed { .. }));
    assert!(!output.exists());
}

#[test]
fn test_remerge_course_uses_existing_lectures() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(tmp.path());
    write_marked_pdf(&layout.lecture_path("Информатика", 1), 1).unwrap();
    write_marked_pdf(&layout.lecture_path("Информатика", 3), 3).unwrap();

    let outcome = remerge_course(&layout, "Информатика", 4);

    assert_eq!(outcome, MergeOutcome::Merged { inputs: 2, pages: 2 });
    let merged = tmp.path().join("Информатика_ALL.pdf");
    assert_eq!(layout.merged_path("Информатика"), merged);
    assert_eq!(read_marks(&merged), vec![1, 3]);
}

#[test]
fn test_merge_outcome_serializes_with_status() {
    let json = serde_json::to_string(&MergeOutcome::Merged { inputs: 2, pages: 9 }).unwrap();
    assert_eq!(json, r#"{"status":"merged","inputs":2,"pages":9}"#);
}
